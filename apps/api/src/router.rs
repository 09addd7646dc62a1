use std::sync::Arc;

use axum::{routing::get, Router};
use tracing::info;

use appointment_cell::{
    appointment_routes, AppointmentRepository, AppointmentState, ClinicHours, InMemoryAppointmentRepository,
    InMemoryPetDirectory, PetDirectory, SupabaseAppointmentRepository, SupabasePetDirectory, SystemClock,
};
use clinic_cell::{clinic_routes, ClinicStatusStore, InMemoryClinicStatusStore, SupabaseClinicStatusStore};
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

/// Storage behind the cells: Supabase when configured, in-memory otherwise.
pub struct Stores {
    pub appointments: Arc<dyn AppointmentRepository>,
    pub pets: Arc<dyn PetDirectory>,
    pub clinic_status: Arc<dyn ClinicStatusStore>,
}

impl Stores {
    pub fn from_config(config: &AppConfig) -> Self {
        if config.is_supabase_configured() {
            info!("Using Supabase at {}", config.supabase_url);
            let supabase = Arc::new(SupabaseClient::new(config));
            Self {
                appointments: Arc::new(SupabaseAppointmentRepository::new(supabase.clone())),
                pets: Arc::new(SupabasePetDirectory::new(supabase.clone())),
                clinic_status: Arc::new(SupabaseClinicStatusStore::new(supabase)),
            }
        } else {
            info!("Supabase is not configured, using in-memory stores");
            Self::in_memory()
        }
    }

    pub fn in_memory() -> Self {
        Self {
            appointments: Arc::new(InMemoryAppointmentRepository::new()),
            pets: Arc::new(InMemoryPetDirectory::new()),
            clinic_status: Arc::new(InMemoryClinicStatusStore::default()),
        }
    }
}

pub fn create_router(config: Arc<AppConfig>, stores: Stores) -> Router {
    let appointments = Arc::new(AppointmentState::new(
        stores.appointments,
        stores.pets,
        stores.clinic_status.clone(),
        Arc::new(SystemClock),
        ClinicHours::from_config(&config),
    ));

    Router::new()
        .route("/", get(|| async { "Vet clinic API is running!" }))
        .nest("/appointments", appointment_routes(config.clone(), appointments))
        .nest("/clinic", clinic_routes(config, stores.clinic_status))
}
