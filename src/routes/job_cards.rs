//! Job card (work order) routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::routes::auth::AuthUser;
use crate::routes::faults::fault_error_to_status;
use crate::services::fault::{self, Fault};
use crate::services::job_card::{
    self, JobCard, JobCardError, JobCardPatch, JobCardPriority, JobCardStatus, NewJobCard,
};
use crate::state::AppState;

pub(crate) fn job_card_error_to_status(err: &JobCardError) -> StatusCode {
    match err {
        JobCardError::NotFound(_) | JobCardError::VehicleNotFound(_) => StatusCode::NOT_FOUND,
        JobCardError::Invalid(_) => StatusCode::BAD_REQUEST,
        JobCardError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Deserialize)]
pub struct JobCardListQuery {
    pub vehicle_id: Option<Uuid>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

/// `GET /api/job-cards?vehicle_id=&status=&priority=` — filtered listing.
pub async fn list_job_cards(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<JobCardListQuery>,
) -> Result<Json<Vec<JobCard>>, StatusCode> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(JobCardStatus::parse(raw).ok_or(StatusCode::BAD_REQUEST)?),
        None => None,
    };
    let priority = match query.priority.as_deref() {
        Some(raw) => Some(JobCardPriority::parse(raw).ok_or(StatusCode::BAD_REQUEST)?),
        None => None,
    };

    let rows = job_card::list_job_cards(&state.pool, query.vehicle_id, status, priority)
        .await
        .map_err(|e| job_card_error_to_status(&e))?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct CreateJobCardBody {
    pub vehicle_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<JobCardPriority>,
    pub assigned_to: Option<String>,
}

/// `POST /api/job-cards` — open a work order.
pub async fn create_job_card(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(body): Json<CreateJobCardBody>,
) -> Result<(StatusCode, Json<JobCard>), StatusCode> {
    let new = NewJobCard {
        vehicle_id: body.vehicle_id,
        title: body.title,
        description: body.description,
        priority: body.priority,
        assigned_to: body.assigned_to,
    };
    let row = job_card::create_job_card(&state, new)
        .await
        .map_err(|e| job_card_error_to_status(&e))?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// `GET /api/job-cards/:id` — fetch one card.
pub async fn get_job_card(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<JobCard>, StatusCode> {
    let row = job_card::get_job_card(&state.pool, id)
        .await
        .map_err(|e| job_card_error_to_status(&e))?;
    Ok(Json(row))
}

#[derive(Deserialize)]
pub struct UpdateJobCardBody {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<JobCardPriority>,
    pub status: Option<JobCardStatus>,
    pub assigned_to: Option<Option<String>>,
}

/// `PATCH /api/job-cards/:id` — partial update; transitions stamp `closed_on`.
pub async fn update_job_card(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateJobCardBody>,
) -> Result<Json<JobCard>, StatusCode> {
    let patch = JobCardPatch {
        title: body.title,
        description: body.description,
        priority: body.priority,
        status: body.status,
        assigned_to: body.assigned_to,
    };
    let row = job_card::update_job_card(&state, id, patch)
        .await
        .map_err(|e| job_card_error_to_status(&e))?;
    Ok(Json(row))
}

/// `DELETE /api/job-cards/:id` — delete a card; linked faults survive.
pub async fn delete_job_card(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    job_card::delete_job_card(&state, id)
        .await
        .map_err(|e| job_card_error_to_status(&e))?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// `GET /api/job-cards/:id/faults` — faults linked to the card.
pub async fn job_card_faults(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Fault>>, StatusCode> {
    // 404 for unknown cards rather than an empty list.
    job_card::get_job_card(&state.pool, id)
        .await
        .map_err(|e| job_card_error_to_status(&e))?;

    let rows = fault::list_for_job_card(&state.pool, id)
        .await
        .map_err(|e| fault_error_to_status(&e))?;
    Ok(Json(rows))
}
