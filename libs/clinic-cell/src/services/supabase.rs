use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde_json::json;
use tracing::debug;

use shared_database::supabase::SupabaseClient;

use crate::error::ClinicError;
use crate::models::{ClinicStatus, ClinicStatusRecord};
use crate::services::status::ClinicStatusStore;

const STATUS_ROW: &str = "/rest/v1/clinic_status?id=eq.1";

/// Clinic status backed by the single-row `clinic_status` table.
pub struct SupabaseClinicStatusStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseClinicStatusStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl ClinicStatusStore for SupabaseClinicStatusStore {
    async fn current(&self) -> Result<ClinicStatusRecord, ClinicError> {
        let rows: Vec<ClinicStatusRecord> = self
            .supabase
            .request(Method::GET, STATUS_ROW, None)
            .await
            .map_err(|e| ClinicError::Store(e.to_string()))?;

        match rows.into_iter().next() {
            Some(record) => Ok(record),
            None => {
                debug!("No clinic status row yet, treating clinic as open");
                Ok(ClinicStatusRecord::new(ClinicStatus::Open))
            }
        }
    }

    async fn set(&self, status: ClinicStatus) -> Result<ClinicStatusRecord, ClinicError> {
        let body = json!({
            "status": status,
            "updated_at": Utc::now().to_rfc3339(),
        });

        let updated: Vec<ClinicStatusRecord> = self
            .supabase
            .request(Method::PATCH, STATUS_ROW, Some(body.clone()))
            .await
            .map_err(|e| ClinicError::Store(e.to_string()))?;

        if let Some(record) = updated.into_iter().next() {
            return Ok(record);
        }

        let mut row = body;
        row["id"] = json!(1);
        let created: Vec<ClinicStatusRecord> = self
            .supabase
            .request(Method::POST, "/rest/v1/clinic_status", Some(row))
            .await
            .map_err(|e| ClinicError::Store(e.to_string()))?;

        created
            .into_iter()
            .next()
            .ok_or_else(|| ClinicError::Store("Clinic status insert returned no rows".to_string()))
    }
}
