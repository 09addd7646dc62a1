// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::AppointmentError;
use crate::models::{
    Appointment, AppointmentFilter, AppointmentListQuery, AppointmentStatus, CallerContext,
    CreateAppointmentRequest, RescheduleAppointmentRequest, TimeInterval,
};
use crate::services::access::{authorize_access, authorize_booking, list_scope};
use crate::services::calendar::{ClinicCalendarGate, ClinicHours};
use crate::services::clock::Clock;
use crate::services::conflict::has_conflict;
use crate::services::consistency::SchedulingConsistencyService;
use crate::services::duration::compute_end_time;
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::services::pets::PetDirectory;
use crate::services::repository::AppointmentRepository;

/// The scheduling engine: creation, reschedule, status changes and reads.
///
/// Each write runs its checks in a fixed order and reports the first failure.
/// Clinic gate, conflict detection and the commit happen under the clinic lock.
pub struct AppointmentBookingService {
    repository: Arc<dyn AppointmentRepository>,
    pets: Arc<dyn PetDirectory>,
    gate: Arc<dyn ClinicCalendarGate>,
    clock: Arc<dyn Clock>,
    hours: ClinicHours,
    lifecycle: AppointmentLifecycleService,
    consistency: SchedulingConsistencyService,
}

impl AppointmentBookingService {
    pub fn new(
        repository: Arc<dyn AppointmentRepository>,
        pets: Arc<dyn PetDirectory>,
        gate: Arc<dyn ClinicCalendarGate>,
        clock: Arc<dyn Clock>,
        hours: ClinicHours,
    ) -> Self {
        Self {
            repository,
            pets,
            gate,
            clock,
            hours,
            lifecycle: AppointmentLifecycleService::new(),
            consistency: SchedulingConsistencyService::new(),
        }
    }

    #[instrument(skip(self, caller, request), fields(user_id = %caller.user_id, pet_id = %request.pet_id))]
    pub async fn create_appointment(
        &self,
        caller: &CallerContext,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        if self.pets.pet_owner(request.pet_id).await?.is_none() {
            return Err(AppointmentError::PetNotFound);
        }
        authorize_booking(caller, request.pet_id)?;

        let now = self.clock.now();
        ensure_future(request.start_time, now)?;

        let interval = TimeInterval {
            start: request.start_time,
            end: compute_end_time(request.start_time, request.service_type)
                .ok_or(AppointmentError::TimeOutOfRange)?,
        };
        debug!("Booking {} for {}", request.service_type, interval);

        let request = &request;
        let interval = &interval;
        let appointment = self
            .consistency
            .run_serialized("create appointment", move || {
                self.commit_new_appointment(caller, request, interval, now)
            })
            .await?;

        info!("Appointment {} booked for pet {}", appointment.id, appointment.pet_id);
        Ok(appointment)
    }

    async fn commit_new_appointment(
        &self,
        caller: &CallerContext,
        request: &CreateAppointmentRequest,
        interval: &TimeInterval,
        now: DateTime<Utc>,
    ) -> Result<Appointment, AppointmentError> {
        self.ensure_clinic_open(interval).await?;
        self.ensure_slot_free(interval, None).await?;

        let appointment = Appointment {
            id: Uuid::new_v4(),
            pet_id: request.pet_id,
            owner_user_id: caller.user_id,
            start_time: interval.start,
            end_time: interval.end,
            service_type: request.service_type,
            status: AppointmentStatus::Pending,
            notes: request.notes.clone(),
            created_at: now,
            updated_at: now,
        };

        Ok(self.repository.insert(appointment).await?)
    }

    /// Moves an active appointment. The caller's end time is kept as given.
    #[instrument(skip(self, caller, request), fields(user_id = %caller.user_id))]
    pub async fn reschedule_appointment(
        &self,
        caller: &CallerContext,
        appointment_id: Uuid,
        request: RescheduleAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let (Some(start), Some(end)) = (request.start_time, request.end_time) else {
            return Err(AppointmentError::IncompleteReschedule);
        };

        let appointment = self
            .consistency
            .run_serialized("reschedule appointment", move || {
                self.commit_reschedule(caller, appointment_id, start, end)
            })
            .await?;

        info!(
            "Appointment {} rescheduled to {}",
            appointment.id,
            appointment.interval()
        );
        Ok(appointment)
    }

    async fn commit_reschedule(
        &self,
        caller: &CallerContext,
        appointment_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Appointment, AppointmentError> {
        let mut appointment = self.load(appointment_id).await?;
        authorize_access(caller, &appointment)?;

        if !self.lifecycle.can_be_rescheduled(appointment.status) {
            warn!("Refusing to reschedule {} appointment {}", appointment.status, appointment.id);
            return Err(AppointmentError::NotReschedulable(appointment.status));
        }

        let interval = TimeInterval::new(start, end).ok_or(AppointmentError::InvalidInterval)?;
        let now = self.clock.now();
        ensure_future(interval.start, now)?;

        self.ensure_clinic_open(&interval).await?;
        self.ensure_slot_free(&interval, Some(appointment.id)).await?;

        appointment.start_time = interval.start;
        appointment.end_time = interval.end;
        appointment.updated_at = now;

        Ok(self.repository.update(appointment).await?)
    }

    #[instrument(skip(self, caller), fields(user_id = %caller.user_id))]
    pub async fn update_status(
        &self,
        caller: &CallerContext,
        appointment_id: Uuid,
        target: AppointmentStatus,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self
            .consistency
            .run_serialized("update appointment status", move || {
                self.commit_status(caller, appointment_id, target)
            })
            .await?;

        info!("Appointment {} is now {}", appointment.id, appointment.status);
        Ok(appointment)
    }

    async fn commit_status(
        &self,
        caller: &CallerContext,
        appointment_id: Uuid,
        target: AppointmentStatus,
    ) -> Result<Appointment, AppointmentError> {
        let mut appointment = self.load(appointment_id).await?;
        authorize_access(caller, &appointment)?;
        self.lifecycle
            .validate_status_transition(caller.role, appointment.status, target)?;

        appointment.status = target;
        appointment.updated_at = self.clock.now();

        Ok(self.repository.update(appointment).await?)
    }

    /// Cancellation is a status change; the record is kept.
    pub async fn cancel_appointment(
        &self,
        caller: &CallerContext,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        self.update_status(caller, appointment_id, AppointmentStatus::Cancelled)
            .await
    }

    pub async fn get_appointment(
        &self,
        caller: &CallerContext,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.load(appointment_id).await?;
        authorize_access(caller, &appointment)?;
        Ok(appointment)
    }

    pub async fn list_appointments(
        &self,
        caller: &CallerContext,
        query: &AppointmentListQuery,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let filter = AppointmentFilter {
            status: query.status,
            start_from: query
                .from_date
                .as_deref()
                .map(|raw| self.hours.parse_lower_bound(raw))
                .transpose()?,
            start_until: match query.to_date.as_deref() {
                Some(raw) => self.hours.parse_upper_bound(raw)?,
                None => std::ops::Bound::Unbounded,
            },
            pet_ids: list_scope(caller),
        };

        if filter.pet_ids.as_ref().is_some_and(|pets| pets.is_empty()) {
            debug!("Caller {} owns no pets; nothing to list", caller.user_id);
            return Ok(Vec::new());
        }

        Ok(self.repository.list(&filter).await?)
    }

    async fn load(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.repository
            .get(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound)
    }

    async fn ensure_clinic_open(&self, interval: &TimeInterval) -> Result<(), AppointmentError> {
        if self.gate.is_open_during(interval).await? {
            Ok(())
        } else {
            warn!("Clinic is not accepting bookings for {}", interval);
            Err(AppointmentError::ClinicClosed)
        }
    }

    async fn ensure_slot_free(&self, interval: &TimeInterval, exclude_id: Option<Uuid>) -> Result<(), AppointmentError> {
        let snapshot = self.repository.active_overlapping(interval, exclude_id).await?;
        if has_conflict(interval, &snapshot, exclude_id) {
            warn!("{} overlaps an active appointment", interval);
            Err(AppointmentError::SlotUnavailable)
        } else {
            Ok(())
        }
    }
}

fn ensure_future(start: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), AppointmentError> {
    if start > now {
        Ok(())
    } else {
        Err(AppointmentError::TimeInPast)
    }
}
