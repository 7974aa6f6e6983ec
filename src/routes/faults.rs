//! Fault tracking routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::routes::auth::AuthUser;
use crate::services::fault::{self, Fault, FaultError, FaultPatch, FaultSeverity, FaultStatus, NewFault};
use crate::state::AppState;

pub(crate) fn fault_error_to_status(err: &FaultError) -> StatusCode {
    match err {
        FaultError::NotFound(_)
        | FaultError::VehicleNotFound(_)
        | FaultError::InspectionNotFound(_)
        | FaultError::JobCardNotFound(_) => StatusCode::NOT_FOUND,
        FaultError::Invalid(_) => StatusCode::BAD_REQUEST,
        FaultError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Deserialize)]
pub struct FaultListQuery {
    pub vehicle_id: Option<Uuid>,
    pub status: Option<String>,
    pub severity: Option<String>,
}

/// `GET /api/faults?vehicle_id=&status=&severity=` — filtered listing.
pub async fn list_faults(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<FaultListQuery>,
) -> Result<Json<Vec<Fault>>, StatusCode> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(FaultStatus::parse(raw).ok_or(StatusCode::BAD_REQUEST)?),
        None => None,
    };
    let severity = match query.severity.as_deref() {
        Some(raw) => Some(FaultSeverity::parse(raw).ok_or(StatusCode::BAD_REQUEST)?),
        None => None,
    };

    let rows = fault::list_faults(&state.pool, query.vehicle_id, status, severity)
        .await
        .map_err(|e| fault_error_to_status(&e))?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct CreateFaultBody {
    pub vehicle_id: Uuid,
    pub inspection_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub severity: Option<FaultSeverity>,
}

/// `POST /api/faults` — report a fault. The reporter is the session user.
pub async fn create_fault(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateFaultBody>,
) -> Result<(StatusCode, Json<Fault>), StatusCode> {
    let new = NewFault {
        vehicle_id: body.vehicle_id,
        inspection_id: body.inspection_id,
        title: body.title,
        description: body.description,
        severity: body.severity,
        reported_by: auth.user.name,
    };
    let row = fault::create_fault(&state, new)
        .await
        .map_err(|e| fault_error_to_status(&e))?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// `GET /api/faults/:id` — fetch one fault.
pub async fn get_fault(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Fault>, StatusCode> {
    let row = fault::get_fault(&state.pool, id)
        .await
        .map_err(|e| fault_error_to_status(&e))?;
    Ok(Json(row))
}

#[derive(Deserialize)]
pub struct UpdateFaultBody {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub severity: Option<FaultSeverity>,
    pub status: Option<FaultStatus>,
    pub job_card_id: Option<Option<Uuid>>,
}

/// `PATCH /api/faults/:id` — partial update; links/unlinks a job card.
pub async fn update_fault(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateFaultBody>,
) -> Result<Json<Fault>, StatusCode> {
    let patch = FaultPatch {
        title: body.title,
        description: body.description,
        severity: body.severity,
        status: body.status,
        job_card_id: body.job_card_id,
    };
    let row = fault::update_fault(&state, id, patch)
        .await
        .map_err(|e| fault_error_to_status(&e))?;
    Ok(Json(row))
}

/// `DELETE /api/faults/:id` — delete a fault.
pub async fn delete_fault(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    fault::delete_fault(&state, id)
        .await
        .map_err(|e| fault_error_to_status(&e))?;
    Ok(Json(serde_json::json!({ "ok": true })))
}
