// libs/appointment-cell/src/services/repository.rs
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::{Appointment, AppointmentFilter, TimeInterval};
use crate::services::conflict::{find_conflicts, intervals_overlap};

/// Appointment storage port.
///
/// Stores must refuse to persist an active appointment that overlaps another
/// active appointment, answering `RepositoryError::OverlapViolation`.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, RepositoryError>;

    /// Matching appointments ordered by start time.
    async fn list(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, RepositoryError>;

    /// Pending or confirmed appointments overlapping `interval`, minus `exclude_id`.
    async fn active_overlapping(
        &self,
        interval: &TimeInterval,
        exclude_id: Option<Uuid>,
    ) -> Result<Vec<Appointment>, RepositoryError>;

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, RepositoryError>;

    async fn update(&self, appointment: Appointment) -> Result<Appointment, RepositoryError>;
}

#[derive(Default)]
pub struct InMemoryAppointmentRepository {
    appointments: RwLock<HashMap<Uuid, Appointment>>,
}

impl InMemoryAppointmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_overlap(appointments: &HashMap<Uuid, Appointment>, candidate: &Appointment) -> Result<(), RepositoryError> {
        if !candidate.is_active() {
            return Ok(());
        }
        let clash = appointments.values().any(|existing| {
            existing.id != candidate.id
                && existing.is_active()
                && intervals_overlap(&existing.interval(), &candidate.interval())
        });
        if clash {
            warn!("Rejecting write of {}: overlaps an active appointment", candidate.id);
            return Err(RepositoryError::OverlapViolation);
        }
        Ok(())
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryAppointmentRepository {
    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, RepositoryError> {
        Ok(self.appointments.read().await.get(&id).cloned())
    }

    async fn list(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, RepositoryError> {
        let mut matching: Vec<Appointment> = self
            .appointments
            .read()
            .await
            .values()
            .filter(|appointment| filter.matches(appointment))
            .cloned()
            .collect();
        matching.sort_by_key(|appointment| (appointment.start_time, appointment.created_at));
        Ok(matching)
    }

    async fn active_overlapping(
        &self,
        interval: &TimeInterval,
        exclude_id: Option<Uuid>,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        let appointments = self.appointments.read().await;
        let snapshot: Vec<Appointment> = appointments.values().cloned().collect();
        Ok(find_conflicts(interval, &snapshot, exclude_id)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, RepositoryError> {
        let mut appointments = self.appointments.write().await;
        Self::check_overlap(&appointments, &appointment)?;
        debug!("Inserting appointment {}", appointment.id);
        appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn update(&self, appointment: Appointment) -> Result<Appointment, RepositoryError> {
        let mut appointments = self.appointments.write().await;
        if !appointments.contains_key(&appointment.id) {
            return Err(RepositoryError::NotFound);
        }
        Self::check_overlap(&appointments, &appointment)?;
        debug!("Updating appointment {}", appointment.id);
        appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppointmentStatus, ServiceType};
    use assert_matches::assert_matches;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, minute, 0).unwrap()
    }

    fn appointment(start: DateTime<Utc>, end: DateTime<Utc>, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            pet_id: Uuid::new_v4(),
            owner_user_id: Uuid::new_v4(),
            start_time: start,
            end_time: end,
            service_type: ServiceType::Routine,
            status,
            notes: None,
            created_at: at(0, 0),
            updated_at: at(0, 0),
        }
    }

    #[tokio::test]
    async fn test_insert_rejects_overlapping_active_rows() {
        let repo = InMemoryAppointmentRepository::new();
        repo.insert(appointment(at(10, 0), at(10, 15), AppointmentStatus::Pending))
            .await
            .unwrap();

        assert_matches!(
            repo.insert(appointment(at(10, 14), at(12, 14), AppointmentStatus::Pending)).await,
            Err(RepositoryError::OverlapViolation)
        );
        assert!(repo
            .insert(appointment(at(10, 15), at(12, 15), AppointmentStatus::Pending))
            .await
            .is_ok());
        // Cancelled rows never occupy the slot
        assert!(repo
            .insert(appointment(at(10, 0), at(10, 15), AppointmentStatus::Cancelled))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_update_may_overlap_its_own_previous_interval() {
        let repo = InMemoryAppointmentRepository::new();
        let mut stored = repo
            .insert(appointment(at(10, 0), at(10, 45), AppointmentStatus::Confirmed))
            .await
            .unwrap();

        stored.start_time = at(10, 15);
        stored.end_time = at(11, 0);
        let updated = repo.update(stored.clone()).await.unwrap();
        assert_eq!(updated.start_time, at(10, 15));

        let missing = appointment(at(13, 0), at(13, 30), AppointmentStatus::Pending);
        assert_matches!(repo.update(missing).await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_list_and_snapshot() {
        let repo = InMemoryAppointmentRepository::new();
        let late = repo
            .insert(appointment(at(15, 0), at(15, 30), AppointmentStatus::Pending))
            .await
            .unwrap();
        let early = repo
            .insert(appointment(at(9, 0), at(9, 30), AppointmentStatus::Confirmed))
            .await
            .unwrap();
        repo.insert(appointment(at(9, 0), at(9, 30), AppointmentStatus::Completed))
            .await
            .unwrap();

        let listed = repo
            .list(&AppointmentFilter {
                status: Some(AppointmentStatus::Pending),
                ..AppointmentFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(listed, vec![late.clone()]);

        let all = repo.list(&AppointmentFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all.last().map(|a| a.id), Some(late.id));

        let window = TimeInterval { start: at(8, 0), end: at(16, 0) };
        let active = repo.active_overlapping(&window, Some(late.id)).await.unwrap();
        assert_eq!(active, vec![early]);
    }
}
