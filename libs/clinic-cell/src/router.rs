use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::services::{ClinicStatusService, ClinicStatusStore};

pub struct ClinicState {
    pub service: ClinicStatusService,
}

pub fn clinic_routes(config: Arc<AppConfig>, store: Arc<dyn ClinicStatusStore>) -> Router {
    let state = Arc::new(ClinicState {
        service: ClinicStatusService::new(store),
    });

    // Reading the status is public; changing it needs an authenticated admin
    let update_status = put(handlers::update_clinic_status)
        .route_layer(middleware::from_fn_with_state(config, auth_middleware));

    Router::new()
        .route("/status", get(handlers::get_clinic_status).merge(update_status))
        .with_state(state)
}
