// libs/appointment-cell/src/services/supabase.rs
use std::collections::HashSet;
use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::supabase::{
    SupabaseClient, SupabaseError, PG_EXCLUSION_VIOLATION, PG_SERIALIZATION_FAILURE,
};

use crate::error::RepositoryError;
use crate::models::{Appointment, AppointmentFilter, AppointmentStatus, TimeInterval};
use crate::services::conflict::find_conflicts;
use crate::services::pets::PetDirectory;
use crate::services::repository::AppointmentRepository;

const APPOINTMENTS: &str = "/rest/v1/appointments";

impl From<SupabaseError> for RepositoryError {
    fn from(err: SupabaseError) -> Self {
        match err.postgres_code() {
            Some(PG_EXCLUSION_VIOLATION) => RepositoryError::OverlapViolation,
            Some(PG_SERIALIZATION_FAILURE) => RepositoryError::SerializationFailure,
            _ => RepositoryError::Storage(err.to_string()),
        }
    }
}

fn encode_time(time: &DateTime<Utc>) -> String {
    urlencoding::encode(&time.to_rfc3339()).into_owned()
}

/// Appointments in the PostgREST `appointments` table.
///
/// Overlap protection relies on an exclusion constraint over active rows
/// (`tstzrange(start_time, end_time)` with `&&`), reported as `23P01`.
pub struct SupabaseAppointmentRepository {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAppointmentRepository {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    fn build_list_path(filter: &AppointmentFilter) -> String {
        let mut query_parts = Vec::new();

        if let Some(status) = filter.status {
            query_parts.push(format!("status=eq.{}", status));
        }
        if let Some(from) = &filter.start_from {
            query_parts.push(format!("start_time=gte.{}", encode_time(from)));
        }
        match &filter.start_until {
            Bound::Included(until) => query_parts.push(format!("start_time=lte.{}", encode_time(until))),
            Bound::Excluded(until) => query_parts.push(format!("start_time=lt.{}", encode_time(until))),
            Bound::Unbounded => {}
        }
        if let Some(pets) = &filter.pet_ids {
            let mut ids: Vec<String> = pets.iter().map(Uuid::to_string).collect();
            ids.sort();
            query_parts.push(format!("pet_id=in.({})", ids.join(",")));
        }
        query_parts.push("order=start_time.asc".to_string());

        format!("{}?{}", APPOINTMENTS, query_parts.join("&"))
    }

    async fn first_row(&self, method: Method, path: &str, body: Option<Value>) -> Result<Option<Appointment>, RepositoryError> {
        let rows: Vec<Appointment> = self.supabase.request(method, path, body).await?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl AppointmentRepository for SupabaseAppointmentRepository {
    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, RepositoryError> {
        let path = format!("{}?id=eq.{}", APPOINTMENTS, id);
        self.first_row(Method::GET, &path, None).await
    }

    async fn list(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, RepositoryError> {
        let path = Self::build_list_path(filter);
        debug!("Listing appointments via {}", path);
        Ok(self.supabase.request(Method::GET, &path, None).await?)
    }

    async fn active_overlapping(
        &self,
        interval: &TimeInterval,
        exclude_id: Option<Uuid>,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        let mut path = format!(
            "{}?status=in.({},{})&start_time=lt.{}&end_time=gt.{}",
            APPOINTMENTS,
            AppointmentStatus::Pending,
            AppointmentStatus::Confirmed,
            encode_time(&interval.end),
            encode_time(&interval.start),
        );
        if let Some(id) = exclude_id {
            path.push_str(&format!("&id=neq.{}", id));
        }

        let rows: Vec<Appointment> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(find_conflicts(interval, &rows, exclude_id).into_iter().cloned().collect())
    }

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, RepositoryError> {
        let row = json!({
            "id": appointment.id,
            "pet_id": appointment.pet_id,
            "user_id": appointment.owner_user_id,
            "start_time": appointment.start_time.to_rfc3339(),
            "end_time": appointment.end_time.to_rfc3339(),
            "service_type": appointment.service_type,
            "status": appointment.status,
            "notes": appointment.notes,
            "created_at": appointment.created_at.to_rfc3339(),
            "updated_at": appointment.updated_at.to_rfc3339(),
        });

        self.first_row(Method::POST, APPOINTMENTS, Some(row))
            .await?
            .ok_or_else(|| {
                warn!("Insert of appointment {} returned no row", appointment.id);
                RepositoryError::Storage("insert returned no row".to_string())
            })
    }

    async fn update(&self, appointment: Appointment) -> Result<Appointment, RepositoryError> {
        let path = format!("{}?id=eq.{}", APPOINTMENTS, appointment.id);
        let changes = json!({
            "start_time": appointment.start_time.to_rfc3339(),
            "end_time": appointment.end_time.to_rfc3339(),
            "status": appointment.status,
            "updated_at": appointment.updated_at.to_rfc3339(),
        });

        self.first_row(Method::PATCH, &path, Some(changes))
            .await?
            .ok_or(RepositoryError::NotFound)
    }
}

#[derive(Debug, Deserialize)]
struct PetRow {
    id: Uuid,
    owner_id: Uuid,
}

/// Pet ownership read from the PostgREST `pets` table.
pub struct SupabasePetDirectory {
    supabase: Arc<SupabaseClient>,
}

impl SupabasePetDirectory {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl PetDirectory for SupabasePetDirectory {
    async fn pet_owner(&self, pet_id: Uuid) -> Result<Option<Uuid>, RepositoryError> {
        let path = format!("/rest/v1/pets?id=eq.{}&select=id,owner_id", pet_id);
        let rows: Vec<PetRow> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(rows.into_iter().next().map(|pet| pet.owner_id))
    }

    async fn pets_owned_by(&self, user_id: Uuid) -> Result<HashSet<Uuid>, RepositoryError> {
        let path = format!("/rest/v1/pets?owner_id=eq.{}&select=id,owner_id", user_id);
        let rows: Vec<PetRow> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(rows.into_iter().map(|pet| pet.id).collect())
    }
}
