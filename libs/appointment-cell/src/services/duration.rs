// libs/appointment-cell/src/services/duration.rs
use chrono::{DateTime, Duration, Utc};

use crate::models::ServiceType;

/// Fixed length of each service.
pub fn duration(service_type: ServiceType) -> Duration {
    match service_type {
        ServiceType::Vaccination => Duration::minutes(30),
        ServiceType::Routine => Duration::minutes(45),
        ServiceType::Surgery => Duration::minutes(120),
        ServiceType::Emergency => Duration::minutes(15),
    }
}

/// `None` when the end would fall past the last representable instant.
pub fn compute_end_time(start: DateTime<Utc>, service_type: ServiceType) -> Option<DateTime<Utc>> {
    start.checked_add_signed(duration(service_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDateTime, TimeZone};

    #[test]
    fn test_duration_table() {
        assert_eq!(duration(ServiceType::Vaccination), Duration::minutes(30));
        assert_eq!(duration(ServiceType::Routine), Duration::minutes(45));
        assert_eq!(duration(ServiceType::Surgery), Duration::minutes(120));
        assert_eq!(duration(ServiceType::Emergency), Duration::minutes(15));
    }

    #[test]
    fn test_end_time_is_deterministic() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();

        for service_type in ServiceType::ALL {
            let first = compute_end_time(start, service_type).unwrap();
            assert_eq!(first - start, duration(service_type));
            assert_eq!(Some(first), compute_end_time(start, service_type));
        }
    }

    #[test]
    fn test_routine_ends_at_quarter_to() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        assert_eq!(
            compute_end_time(start, ServiceType::Routine),
            Some(Utc.with_ymd_and_hms(2025, 6, 1, 10, 45, 0).unwrap())
        );
    }

    #[test]
    fn test_end_time_past_calendar_limit_is_none() {
        let start = Utc.from_utc_datetime(&NaiveDateTime::MAX) - Duration::minutes(1);
        assert_eq!(compute_end_time(start, ServiceType::Surgery), None);
        assert!(compute_end_time(start - Duration::minutes(15), ServiceType::Emergency).is_some());
    }
}
