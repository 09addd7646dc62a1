use std::fmt;

use serde::Serialize;
use thiserror::Error;

use clinic_cell::ClinicError;
use shared_models::error::AppError;

use crate::models::AppointmentStatus;

/// Stable, machine-readable classification of an engine failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    BadRequest,
    BusinessRuleViolation,
    Conflict,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::BusinessRuleViolation => "business_rule_violation",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Internal => "internal",
        };
        f.write_str(kind)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppointmentError {
    #[error("Pet not found")]
    PetNotFound,

    #[error("Appointment not found")]
    NotFound,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Appointment time must be in the future")]
    TimeInPast,

    #[error("Appointment time is outside the supported calendar range")]
    TimeOutOfRange,

    #[error("End time must be after start time")]
    InvalidInterval,

    #[error("Both start_time and end_time are required to reschedule")]
    IncompleteReschedule,

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Clinic is closed for the requested time")]
    ClinicClosed,

    #[error("Cannot change status from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Cannot reschedule a {0} appointment")]
    NotReschedulable(AppointmentStatus),

    #[error("Time slot is unavailable")]
    SlotUnavailable,

    #[error("Scheduling transaction was aborted by a concurrent update")]
    TransactionAborted,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl AppointmentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppointmentError::PetNotFound | AppointmentError::NotFound => ErrorKind::NotFound,
            AppointmentError::Forbidden(_) => ErrorKind::Forbidden,
            AppointmentError::TimeInPast
            | AppointmentError::TimeOutOfRange
            | AppointmentError::InvalidInterval
            | AppointmentError::IncompleteReschedule
            | AppointmentError::InvalidFilter(_) => ErrorKind::BadRequest,
            AppointmentError::ClinicClosed
            | AppointmentError::InvalidStatusTransition { .. }
            | AppointmentError::NotReschedulable(_) => ErrorKind::BusinessRuleViolation,
            // An abort that survived the retry is reported as a lost race for the slot
            AppointmentError::SlotUnavailable | AppointmentError::TransactionAborted => ErrorKind::Conflict,
            AppointmentError::DatabaseError(_) => ErrorKind::Internal,
        }
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::NotFound => AppError::NotFound(message),
            ErrorKind::Forbidden => AppError::Forbidden(message),
            ErrorKind::BadRequest => AppError::BadRequest(message),
            ErrorKind::BusinessRuleViolation => AppError::BusinessRule(message),
            ErrorKind::Conflict => AppError::Conflict(message),
            ErrorKind::Internal => AppError::Database(message),
        }
    }
}

impl From<ClinicError> for AppointmentError {
    fn from(err: ClinicError) -> Self {
        AppointmentError::DatabaseError(err.to_string())
    }
}

/// Failures reported by an appointment or pet store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Overlaps an existing active appointment")]
    OverlapViolation,

    #[error("Serialization failure")]
    SerializationFailure,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<RepositoryError> for AppointmentError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => AppointmentError::NotFound,
            RepositoryError::OverlapViolation => AppointmentError::SlotUnavailable,
            RepositoryError::SerializationFailure => AppointmentError::TransactionAborted,
            RepositoryError::Storage(msg) => AppointmentError::DatabaseError(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_kinds_map_to_http_status() {
        let cases = [
            (AppointmentError::PetNotFound, StatusCode::NOT_FOUND),
            (AppointmentError::Forbidden("nope".into()), StatusCode::FORBIDDEN),
            (AppointmentError::IncompleteReschedule, StatusCode::BAD_REQUEST),
            (AppointmentError::TimeOutOfRange, StatusCode::BAD_REQUEST),
            (AppointmentError::ClinicClosed, StatusCode::UNPROCESSABLE_ENTITY),
            (
                AppointmentError::InvalidStatusTransition {
                    from: AppointmentStatus::Completed,
                    to: AppointmentStatus::Cancelled,
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (AppointmentError::SlotUnavailable, StatusCode::CONFLICT),
            (AppointmentError::TransactionAborted, StatusCode::CONFLICT),
            (AppointmentError::DatabaseError("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_illegal_transition_names_both_states() {
        let err = AppointmentError::InvalidStatusTransition {
            from: AppointmentStatus::Cancelled,
            to: AppointmentStatus::Confirmed,
        };
        assert_eq!(err.to_string(), "Cannot change status from cancelled to confirmed");
        assert_eq!(err.kind().to_string(), "business_rule_violation");
    }

    #[test]
    fn test_repository_errors_translate() {
        assert_eq!(
            AppointmentError::from(RepositoryError::OverlapViolation),
            AppointmentError::SlotUnavailable
        );
        assert_eq!(
            AppointmentError::from(RepositoryError::SerializationFailure).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            AppointmentError::from(ClinicError::Store("offline".into())).kind(),
            ErrorKind::Internal
        );
    }
}
