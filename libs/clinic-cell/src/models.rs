use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Operational status of the clinic. Only `Open` accepts new bookings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClinicStatus {
    #[default]
    Open,
    ClosingSoon,
    #[serde(alias = "closed")]
    Close,
}

impl ClinicStatus {
    pub fn accepts_bookings(&self) -> bool {
        matches!(self, ClinicStatus::Open)
    }
}

impl fmt::Display for ClinicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClinicStatus::Open => write!(f, "open"),
            ClinicStatus::ClosingSoon => write!(f, "closing_soon"),
            ClinicStatus::Close => write!(f, "close"),
        }
    }
}

/// The single clinic status row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicStatusRecord {
    pub status: ClinicStatus,
    pub updated_at: DateTime<Utc>,
}

impl ClinicStatusRecord {
    pub fn new(status: ClinicStatus) -> Self {
        Self {
            status,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateClinicStatusRequest {
    pub status: ClinicStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_open_accepts_bookings() {
        assert!(ClinicStatus::Open.accepts_bookings());
        assert!(!ClinicStatus::ClosingSoon.accepts_bookings());
        assert!(!ClinicStatus::Close.accepts_bookings());
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&ClinicStatus::ClosingSoon).unwrap(), "\"closing_soon\"");
        let parsed: ClinicStatus = serde_json::from_str("\"close\"").unwrap();
        assert_eq!(parsed, ClinicStatus::Close);
    }
}
