// libs/appointment-cell/src/models.rs
use std::collections::HashSet;
use std::fmt;
use std::ops::Bound;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::auth::Role;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub pet_id: Uuid,
    /// The caller who booked the appointment.
    #[serde(alias = "user_id")]
    pub owner_user_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub service_type: ServiceType,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn interval(&self) -> TimeInterval {
        TimeInterval {
            start: self.start_time,
            end: self.end_time,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Vaccination,
    #[serde(alias = "checkup")]
    Routine,
    Surgery,
    Emergency,
}

impl ServiceType {
    pub const ALL: [ServiceType; 4] = [
        ServiceType::Vaccination,
        ServiceType::Routine,
        ServiceType::Surgery,
        ServiceType::Emergency,
    ];
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceType::Vaccination => write!(f, "vaccination"),
            ServiceType::Routine => write!(f, "routine"),
            ServiceType::Surgery => write!(f, "surgery"),
            ServiceType::Emergency => write!(f, "emergency"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 4] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
    ];

    /// Active appointments occupy the clinic and take part in conflict detection.
    pub fn is_active(&self) -> bool {
        matches!(self, AppointmentStatus::Pending | AppointmentStatus::Confirmed)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeInterval {
    /// Returns `None` unless `start < end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

// ==============================================================================
// CALLER CONTEXT
// ==============================================================================

/// Authenticated identity handed to every engine operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    pub user_id: Uuid,
    pub role: Role,
    pub owned_pet_ids: HashSet<Uuid>,
}

impl CallerContext {
    pub fn admin(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: Role::Admin,
            owned_pet_ids: HashSet::new(),
        }
    }

    pub fn owner(user_id: Uuid, owned_pet_ids: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            user_id,
            role: Role::Owner,
            owned_pet_ids: owned_pet_ids.into_iter().collect(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn owns_pet(&self, pet_id: Uuid) -> bool {
        self.owned_pet_ids.contains(&pet_id)
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    #[serde(alias = "petId")]
    pub pet_id: Uuid,
    #[serde(alias = "startTime")]
    pub start_time: DateTime<Utc>,
    #[serde(alias = "serviceType")]
    pub service_type: ServiceType,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Both times are required; a request carrying only one is rejected as incomplete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    #[serde(default, alias = "startTime")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, alias = "endTime")]
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
}

/// List filters. Dates accept RFC 3339 instants or `YYYY-MM-DD` in clinic time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentListQuery {
    pub status: Option<AppointmentStatus>,
    #[serde(alias = "fromDate")]
    pub from_date: Option<String>,
    #[serde(alias = "toDate")]
    pub to_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableSlotsQuery {
    pub date: NaiveDate,
    #[serde(alias = "serviceType")]
    pub service_type: Option<ServiceType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableSlot {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

// ==============================================================================
// REPOSITORY QUERY MODELS
// ==============================================================================

#[derive(Debug, Clone)]
pub struct AppointmentFilter {
    pub status: Option<AppointmentStatus>,
    pub start_from: Option<DateTime<Utc>>,
    pub start_until: Bound<DateTime<Utc>>,
    /// `None` means every pet; owners are scoped to their own pets.
    pub pet_ids: Option<HashSet<Uuid>>,
}

impl Default for AppointmentFilter {
    fn default() -> Self {
        Self {
            status: None,
            start_from: None,
            start_until: Bound::Unbounded,
            pet_ids: None,
        }
    }
}

impl AppointmentFilter {
    pub fn matches(&self, appointment: &Appointment) -> bool {
        if let Some(status) = self.status {
            if appointment.status != status {
                return false;
            }
        }
        if let Some(from) = self.start_from {
            if appointment.start_time < from {
                return false;
            }
        }
        let before_upper = match self.start_until {
            Bound::Included(until) => appointment.start_time <= until,
            Bound::Excluded(until) => appointment.start_time < until,
            Bound::Unbounded => true,
        };
        if !before_upper {
            return false;
        }
        match &self.pet_ids {
            Some(pets) => pets.contains(&appointment.pet_id),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_time_interval_requires_positive_length() {
        assert!(TimeInterval::new(at(10, 0), at(10, 0)).is_none());
        assert!(TimeInterval::new(at(10, 30), at(10, 0)).is_none());
        assert_eq!(
            TimeInterval::new(at(10, 0), at(10, 45)).unwrap().duration(),
            chrono::Duration::minutes(45)
        );
    }

    #[test]
    fn test_status_activity() {
        assert!(AppointmentStatus::Pending.is_active());
        assert!(AppointmentStatus::Confirmed.is_active());
        assert!(AppointmentStatus::Completed.is_terminal());
        assert!(AppointmentStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_create_request_accepts_camel_case() {
        let request: CreateAppointmentRequest = serde_json::from_value(serde_json::json!({
            "petId": "6f1f9c34-8d0e-4a0e-9a8f-3f6c1f0f5b11",
            "startTime": "2025-06-01T10:00:00Z",
            "serviceType": "routine"
        }))
        .unwrap();

        assert_eq!(request.service_type, ServiceType::Routine);
        assert_eq!(request.start_time, at(10, 0));
        assert!(request.notes.is_none());
    }

    #[test]
    fn test_appointment_reads_user_id_column() {
        let appointment: Appointment = serde_json::from_value(serde_json::json!({
            "id": "0d8f8c1e-65a4-4c55-9a55-2b1a9f3e7c01",
            "pet_id": "6f1f9c34-8d0e-4a0e-9a8f-3f6c1f0f5b11",
            "user_id": "4a3b7f2e-1c9d-4e8f-b7a6-5d4c3b2a1f00",
            "start_time": "2025-06-01T10:00:00Z",
            "end_time": "2025-06-01T10:45:00Z",
            "service_type": "routine",
            "status": "pending",
            "notes": null,
            "created_at": "2025-05-01T00:00:00Z",
            "updated_at": "2025-05-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(appointment.owner_user_id.to_string(), "4a3b7f2e-1c9d-4e8f-b7a6-5d4c3b2a1f00");
        assert!(appointment.is_active());
    }

    #[test]
    fn test_filter_bounds() {
        let appointment = Appointment {
            id: Uuid::new_v4(),
            pet_id: Uuid::new_v4(),
            owner_user_id: Uuid::new_v4(),
            start_time: at(10, 0),
            end_time: at(10, 45),
            service_type: ServiceType::Routine,
            status: AppointmentStatus::Pending,
            notes: None,
            created_at: at(0, 0),
            updated_at: at(0, 0),
        };

        let inclusive = AppointmentFilter {
            start_until: Bound::Included(at(10, 0)),
            ..AppointmentFilter::default()
        };
        let exclusive = AppointmentFilter {
            start_until: Bound::Excluded(at(10, 0)),
            ..AppointmentFilter::default()
        };
        let other_pets = AppointmentFilter {
            pet_ids: Some(HashSet::from([Uuid::new_v4()])),
            ..AppointmentFilter::default()
        };

        assert!(inclusive.matches(&appointment));
        assert!(!exclusive.matches(&appointment));
        assert!(!other_pets.matches(&appointment));
        assert!(AppointmentFilter::default().matches(&appointment));
    }
}
