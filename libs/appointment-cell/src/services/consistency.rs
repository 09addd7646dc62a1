// libs/appointment-cell/src/services/consistency.rs
//
// Serializes every scheduling write against the clinic's single calendar.
// The clinic-wide lock covers the window between reading the active
// appointments and committing the write; the store's overlap rejection
// covers writers in other processes.

use std::future::Future;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::AppointmentError;

const DEFAULT_MAX_ATTEMPTS: u32 = 2;

pub struct SchedulingConsistencyService {
    clinic_lock: Mutex<()>,
    max_attempts: u32,
}

impl SchedulingConsistencyService {
    pub fn new() -> Self {
        Self {
            clinic_lock: Mutex::new(()),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Runs `attempt` while holding the clinic lock. A transaction abort from
    /// the store re-runs the whole validation and commit, once.
    pub async fn run_serialized<T, F, Fut>(&self, operation: &str, mut attempt: F) -> Result<T, AppointmentError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AppointmentError>>,
    {
        let _guard = self.clinic_lock.lock().await;
        debug!("Acquired clinic scheduling lock for {}", operation);

        let mut attempt_number = 1;
        loop {
            match attempt().await {
                Err(AppointmentError::TransactionAborted) if attempt_number < self.max_attempts => {
                    warn!(
                        "{} aborted by a concurrent transaction, retrying ({}/{})",
                        operation, attempt_number, self.max_attempts
                    );
                    attempt_number += 1;
                }
                result => return result,
            }
        }
    }
}

impl Default for SchedulingConsistencyService {
    fn default() -> Self {
        Self::new()
    }
}
