use thiserror::Error;

use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum ClinicError {
    #[error("Only admin can change the clinic status")]
    Forbidden,

    #[error("Clinic status store error: {0}")]
    Store(String),
}

impl From<ClinicError> for AppError {
    fn from(err: ClinicError) -> Self {
        match err {
            ClinicError::Forbidden => AppError::Forbidden(err.to_string()),
            ClinicError::Store(msg) => AppError::Database(msg),
        }
    }
}
