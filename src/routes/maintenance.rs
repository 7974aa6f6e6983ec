//! Scheduled maintenance routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::routes::auth::AuthUser;
use crate::services::maintenance::{
    self, MaintenanceError, MaintenancePatch, MaintenanceStatus, NewMaintenance, ScheduledMaintenance,
};
use crate::state::AppState;

pub(crate) fn maintenance_error_to_status(err: &MaintenanceError) -> StatusCode {
    match err {
        MaintenanceError::NotFound(_) | MaintenanceError::VehicleNotFound(_) => StatusCode::NOT_FOUND,
        MaintenanceError::Invalid(_) => StatusCode::BAD_REQUEST,
        MaintenanceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Deserialize)]
pub struct MaintenanceListQuery {
    pub vehicle_id: Option<Uuid>,
    pub status: Option<String>,
}

/// `GET /api/maintenance?vehicle_id=&status=` — soonest due first.
pub async fn list_maintenance(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<MaintenanceListQuery>,
) -> Result<Json<Vec<ScheduledMaintenance>>, StatusCode> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(MaintenanceStatus::parse(raw).ok_or(StatusCode::BAD_REQUEST)?),
        None => None,
    };

    let rows = maintenance::list_maintenance(&state.pool, query.vehicle_id, status)
        .await
        .map_err(|e| maintenance_error_to_status(&e))?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct CreateMaintenanceBody {
    pub vehicle_id: Uuid,
    pub task: String,
    pub due_on: Option<String>,
    pub due_odometer_km: Option<i64>,
}

/// `POST /api/maintenance` — schedule a task.
pub async fn create_maintenance(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(body): Json<CreateMaintenanceBody>,
) -> Result<(StatusCode, Json<ScheduledMaintenance>), StatusCode> {
    let new = NewMaintenance {
        vehicle_id: body.vehicle_id,
        task: body.task,
        due_on: body.due_on,
        due_odometer_km: body.due_odometer_km,
    };
    let row = maintenance::create_maintenance(&state, new)
        .await
        .map_err(|e| maintenance_error_to_status(&e))?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// `GET /api/maintenance/:id` — fetch one entry.
pub async fn get_maintenance(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ScheduledMaintenance>, StatusCode> {
    let row = maintenance::get_maintenance(&state.pool, id)
        .await
        .map_err(|e| maintenance_error_to_status(&e))?;
    Ok(Json(row))
}

#[derive(Deserialize)]
pub struct UpdateMaintenanceBody {
    pub task: Option<String>,
    pub due_on: Option<Option<String>>,
    pub due_odometer_km: Option<Option<i64>>,
    pub status: Option<MaintenanceStatus>,
}

/// `PATCH /api/maintenance/:id` — partial update; completion stamps the date.
pub async fn update_maintenance(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateMaintenanceBody>,
) -> Result<Json<ScheduledMaintenance>, StatusCode> {
    let patch = MaintenancePatch {
        task: body.task,
        due_on: body.due_on,
        due_odometer_km: body.due_odometer_km,
        status: body.status,
    };
    let row = maintenance::update_maintenance(&state, id, patch)
        .await
        .map_err(|e| maintenance_error_to_status(&e))?;
    Ok(Json(row))
}

/// `DELETE /api/maintenance/:id` — delete an entry.
pub async fn delete_maintenance(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    maintenance::delete_maintenance(&state, id)
        .await
        .map_err(|e| maintenance_error_to_status(&e))?;
    Ok(Json(serde_json::json!({ "ok": true })))
}
