//! Inspection routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::routes::auth::AuthUser;
use crate::services::inspection::{
    self, Inspection, InspectionError, InspectionPatch, InspectionStatus, NewInspection,
};
use crate::state::AppState;

pub(crate) fn inspection_error_to_status(err: &InspectionError) -> StatusCode {
    match err {
        InspectionError::NotFound(_) | InspectionError::VehicleNotFound(_) => StatusCode::NOT_FOUND,
        InspectionError::Invalid(_) => StatusCode::BAD_REQUEST,
        InspectionError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Deserialize)]
pub struct InspectionListQuery {
    pub vehicle_id: Option<Uuid>,
    pub status: Option<String>,
}

/// `GET /api/inspections?vehicle_id=&status=` — filtered listing, newest first.
pub async fn list_inspections(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<InspectionListQuery>,
) -> Result<Json<Vec<Inspection>>, StatusCode> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(InspectionStatus::parse(raw).ok_or(StatusCode::BAD_REQUEST)?),
        None => None,
    };

    let rows = inspection::list_inspections(&state.pool, query.vehicle_id, status)
        .await
        .map_err(|e| inspection_error_to_status(&e))?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct CreateInspectionBody {
    pub vehicle_id: Uuid,
    pub inspector: String,
    pub inspected_on: String,
    pub odometer_km: Option<i64>,
    pub status: Option<InspectionStatus>,
    pub notes: Option<String>,
}

/// `POST /api/inspections` — record an inspection.
pub async fn create_inspection(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(body): Json<CreateInspectionBody>,
) -> Result<(StatusCode, Json<Inspection>), StatusCode> {
    let new = NewInspection {
        vehicle_id: body.vehicle_id,
        inspector: body.inspector,
        inspected_on: body.inspected_on,
        odometer_km: body.odometer_km,
        status: body.status,
        notes: body.notes,
    };
    let row = inspection::create_inspection(&state, new)
        .await
        .map_err(|e| inspection_error_to_status(&e))?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// `GET /api/inspections/:id` — fetch one inspection.
pub async fn get_inspection(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Inspection>, StatusCode> {
    let row = inspection::get_inspection(&state.pool, id)
        .await
        .map_err(|e| inspection_error_to_status(&e))?;
    Ok(Json(row))
}

#[derive(Deserialize)]
pub struct UpdateInspectionBody {
    pub inspector: Option<String>,
    pub inspected_on: Option<String>,
    pub odometer_km: Option<i64>,
    pub status: Option<InspectionStatus>,
    pub notes: Option<Option<String>>,
}

/// `PATCH /api/inspections/:id` — partial update.
pub async fn update_inspection(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateInspectionBody>,
) -> Result<Json<Inspection>, StatusCode> {
    let patch = InspectionPatch {
        inspector: body.inspector,
        inspected_on: body.inspected_on,
        odometer_km: body.odometer_km,
        status: body.status,
        notes: body.notes,
    };
    let row = inspection::update_inspection(&state, id, patch)
        .await
        .map_err(|e| inspection_error_to_status(&e))?;
    Ok(Json(row))
}

/// `DELETE /api/inspections/:id` — delete an inspection.
pub async fn delete_inspection(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    inspection::delete_inspection(&state, id)
        .await
        .map_err(|e| inspection_error_to_status(&e))?;
    Ok(Json(serde_json::json!({ "ok": true })))
}
