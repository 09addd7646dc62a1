use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use shared_models::auth::User;

use crate::error::ClinicError;
use crate::models::{ClinicStatus, ClinicStatusRecord};

/// Storage for the single clinic status row.
#[async_trait]
pub trait ClinicStatusStore: Send + Sync {
    async fn current(&self) -> Result<ClinicStatusRecord, ClinicError>;

    async fn set(&self, status: ClinicStatus) -> Result<ClinicStatusRecord, ClinicError>;
}

pub struct InMemoryClinicStatusStore {
    record: RwLock<ClinicStatusRecord>,
}

impl InMemoryClinicStatusStore {
    pub fn new(status: ClinicStatus) -> Self {
        Self {
            record: RwLock::new(ClinicStatusRecord::new(status)),
        }
    }
}

impl Default for InMemoryClinicStatusStore {
    fn default() -> Self {
        Self::new(ClinicStatus::Open)
    }
}

#[async_trait]
impl ClinicStatusStore for InMemoryClinicStatusStore {
    async fn current(&self) -> Result<ClinicStatusRecord, ClinicError> {
        Ok(self.record.read().await.clone())
    }

    async fn set(&self, status: ClinicStatus) -> Result<ClinicStatusRecord, ClinicError> {
        let mut record = self.record.write().await;
        *record = ClinicStatusRecord::new(status);
        Ok(record.clone())
    }
}

pub struct ClinicStatusService {
    store: Arc<dyn ClinicStatusStore>,
}

impl ClinicStatusService {
    pub fn new(store: Arc<dyn ClinicStatusStore>) -> Self {
        Self { store }
    }

    pub async fn get_status(&self) -> Result<ClinicStatusRecord, ClinicError> {
        debug!("Fetching clinic status");
        self.store.current().await
    }

    /// Admin-only. Existing bookings are not touched by a status change.
    pub async fn update_status(&self, user: &User, status: ClinicStatus) -> Result<ClinicStatusRecord, ClinicError> {
        if !user.is_admin() {
            warn!("User {} attempted to set clinic status to {}", user.id, status);
            return Err(ClinicError::Forbidden);
        }

        let record = self.store.set(status).await?;
        info!("Clinic status set to {} by {}", record.status, user.id);
        Ok(record)
    }
}
