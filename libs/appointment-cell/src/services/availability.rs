// libs/appointment-cell/src/services/availability.rs
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::AppointmentError;
use crate::models::{AvailableSlot, ServiceType, TimeInterval};
use crate::services::calendar::{ClinicCalendarGate, ClinicHours};
use crate::services::clock::Clock;
use crate::services::conflict::has_conflict;
use crate::services::duration::duration;
use crate::services::repository::AppointmentRepository;

pub struct AvailabilityService {
    repository: Arc<dyn AppointmentRepository>,
    gate: Arc<dyn ClinicCalendarGate>,
    clock: Arc<dyn Clock>,
    hours: ClinicHours,
}

impl AvailabilityService {
    pub fn new(
        repository: Arc<dyn AppointmentRepository>,
        gate: Arc<dyn ClinicCalendarGate>,
        clock: Arc<dyn Clock>,
        hours: ClinicHours,
    ) -> Self {
        Self {
            repository,
            gate,
            clock,
            hours,
        }
    }

    /// Bookable slots on the slot grid for `date` in clinic time. Advisory only;
    /// booking re-validates under the clinic lock.
    pub async fn available_slots(
        &self,
        date: NaiveDate,
        service_type: ServiceType,
    ) -> Result<Vec<AvailableSlot>, AppointmentError> {
        let window = self.hours.opening_window(date)?;
        if !self.gate.is_open_during(&window).await? {
            debug!("Clinic closed, no slots for {}", date);
            return Ok(Vec::new());
        }

        let booked = self.repository.active_overlapping(&window, None).await?;
        let length = duration(service_type);
        let now = self.clock.now();

        let mut slots = Vec::new();
        let mut start = window.start;
        while let Some(end) = start.checked_add_signed(length).filter(|end| *end <= window.end) {
            let candidate = TimeInterval { start, end };
            if candidate.start > now && !has_conflict(&candidate, &booked, None) {
                slots.push(AvailableSlot {
                    start_time: candidate.start,
                    end_time: candidate.end,
                });
            }
            match start.checked_add_signed(self.hours.slot_step) {
                Some(next) => start = next,
                None => break,
            }
        }

        debug!("{} open {} slots on {}", slots.len(), service_type, date);
        Ok(slots)
    }
}
