// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_models::auth::{Role, User};
use shared_models::error::AppError;

use crate::error::AppointmentError;
use crate::models::{
    AppointmentListQuery, AvailableSlotsQuery, CallerContext, CreateAppointmentRequest,
    RescheduleAppointmentRequest, ServiceType, UpdateStatusRequest,
};
use crate::router::AppointmentState;

/// Resolves the authenticated user into the context every engine call takes.
pub async fn caller_context(state: &AppointmentState, user: &User) -> Result<CallerContext, AppError> {
    let user_id = Uuid::parse_str(&user.id)
        .map_err(|_| AppError::Auth("Token subject is not a valid user id".to_string()))?;

    match user.role() {
        Role::Admin => Ok(CallerContext::admin(user_id)),
        Role::Owner => {
            let owned = state
                .pets
                .pets_owned_by(user_id)
                .await
                .map_err(AppointmentError::from)?;
            debug!("User {} owns {} pet(s)", user_id, owned.len());
            Ok(CallerContext::owner(user_id, owned))
        }
    }
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<AppointmentState>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let caller = caller_context(&state, &user).await?;
    let appointment = state.booking.create_appointment(&caller, request).await?;
    Ok((StatusCode::CREATED, Json(json!(appointment))))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppointmentState>>,
    Extension(user): Extension<User>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Json<Value>, AppError> {
    let caller = caller_context(&state, &user).await?;
    let appointments = state.booking.list_appointments(&caller, &query).await?;
    Ok(Json(json!(appointments)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let caller = caller_context(&state, &user).await?;
    let appointment = state.booking.get_appointment(&caller, appointment_id).await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let caller = caller_context(&state, &user).await?;
    let appointment = state
        .booking
        .reschedule_appointment(&caller, appointment_id, request)
        .await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn update_appointment_status(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let caller = caller_context(&state, &user).await?;
    let appointment = state
        .booking
        .update_status(&caller, appointment_id, request.status)
        .await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let caller = caller_context(&state, &user).await?;
    let appointment = state.booking.cancel_appointment(&caller, appointment_id).await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AppointmentState>>,
    Query(query): Query<AvailableSlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let service_type = query.service_type.unwrap_or(ServiceType::Routine);
    let slots = state
        .availability
        .available_slots(query.date, service_type)
        .await?;

    Ok(Json(json!({
        "date": query.date,
        "service_type": service_type,
        "slots": slots,
    })))
}
