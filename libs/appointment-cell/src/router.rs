// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use clinic_cell::ClinicStatusStore;
use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::services::{
    AppointmentBookingService, AppointmentRepository, AvailabilityService, ClinicCalendarGate, ClinicHours,
    ClinicStatusGate, Clock, PetDirectory,
};

pub struct AppointmentState {
    pub booking: AppointmentBookingService,
    pub availability: AvailabilityService,
    pub pets: Arc<dyn PetDirectory>,
}

impl AppointmentState {
    pub fn new(
        repository: Arc<dyn AppointmentRepository>,
        pets: Arc<dyn PetDirectory>,
        clinic_status: Arc<dyn ClinicStatusStore>,
        clock: Arc<dyn Clock>,
        hours: ClinicHours,
    ) -> Self {
        let gate: Arc<dyn ClinicCalendarGate> = Arc::new(ClinicStatusGate::new(clinic_status));

        Self {
            booking: AppointmentBookingService::new(repository.clone(), pets.clone(), gate.clone(), clock.clone(), hours),
            availability: AvailabilityService::new(repository, gate, clock, hours),
            pets,
        }
    }
}

pub fn appointment_routes(config: Arc<AppConfig>, state: Arc<AppointmentState>) -> Router {
    let protected_routes = Router::new()
        .route("/", post(handlers::create_appointment).get(handlers::list_appointments))
        .route(
            "/{appointment_id}",
            get(handlers::get_appointment).delete(handlers::cancel_appointment),
        )
        .route("/{appointment_id}/reschedule", patch(handlers::reschedule_appointment))
        .route("/{appointment_id}/status", patch(handlers::update_appointment_status))
        .layer(middleware::from_fn_with_state(config, auth_middleware));

    // Slot lookup is public
    let public_routes = Router::new().route("/available-slots", get(handlers::get_available_slots));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
