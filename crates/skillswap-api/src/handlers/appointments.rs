use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use skillswap_core::api::appointment::{
    AppointmentListResponse, AppointmentResponse, CreateAppointmentRequest, FeedbackRequest,
    UpdateStatusRequest,
};
use skillswap_core::db::{
    create_appointment, fetch_appointment, list_appointments, submit_feedback, update_status,
    RoleFilter,
};
use skillswap_core::scheduling::AppointmentStatus;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::SharedState;

#[derive(Debug, Deserialize, Default)]
pub struct AppointmentQuery {
    pub status: Option<AppointmentStatus>,
    pub role: Option<RoleFilter>,
}

pub async fn list(
    State(state): State<SharedState>,
    auth: AuthUser,
    Query(query): Query<AppointmentQuery>,
) -> Result<Json<AppointmentListResponse>, ApiError> {
    let details = list_appointments(&state.pool, auth.user_id, query.status, query.role).await?;

    Ok(Json(AppointmentListResponse {
        appointments: details.into_iter().map(AppointmentResponse::from).collect(),
    }))
}

pub async fn get(
    State(state): State<SharedState>,
    Path(appointment_id): Path<i64>,
    auth: AuthUser,
) -> Result<Json<AppointmentResponse>, ApiError> {
    let detail = fetch_appointment(&state.pool, appointment_id).await?;

    // Listings are already scoped to the caller; direct fetches need the
    // same participant check.
    let appointment = &detail.appointment;
    if appointment.teacher_id != auth.user_id && appointment.learner_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "Not authorized to view this appointment".into(),
        ));
    }

    Ok(Json(AppointmentResponse::from(detail)))
}

/// Book a session; the caller is the learner.
pub async fn create(
    State(state): State<SharedState>,
    auth: AuthUser,
    Json(payload): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<AppointmentResponse>), ApiError> {
    payload.validate()?;

    let detail = create_appointment(&state.pool, auth.user_id, &payload).await?;

    Ok((StatusCode::CREATED, Json(AppointmentResponse::from(detail))))
}

pub async fn set_status(
    State(state): State<SharedState>,
    Path(appointment_id): Path<i64>,
    auth: AuthUser,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<AppointmentResponse>, ApiError> {
    payload.validate()?;

    let detail = update_status(&state.pool, appointment_id, auth.user_id, &payload).await?;

    Ok(Json(AppointmentResponse::from(detail)))
}

pub async fn leave_feedback(
    State(state): State<SharedState>,
    Path(appointment_id): Path<i64>,
    auth: AuthUser,
    Json(payload): Json<FeedbackRequest>,
) -> Result<Json<AppointmentResponse>, ApiError> {
    payload.validate()?;

    let detail = submit_feedback(&state.pool, appointment_id, auth.user_id, &payload).await?;

    Ok(Json(AppointmentResponse::from(detail)))
}
