use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use serde_json::{json, Value};

use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::UpdateClinicStatusRequest;
use crate::router::ClinicState;

#[axum::debug_handler]
pub async fn get_clinic_status(
    State(state): State<Arc<ClinicState>>,
) -> Result<Json<Value>, AppError> {
    let record = state.service.get_status().await?;
    Ok(Json(json!(record)))
}

#[axum::debug_handler]
pub async fn update_clinic_status(
    State(state): State<Arc<ClinicState>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateClinicStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let record = state.service.update_status(&user, request.status).await?;
    Ok(Json(json!(record)))
}
