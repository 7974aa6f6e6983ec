//! Tyre registry, allocation, and history routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::routes::auth::AuthUser;
use crate::services::tyre::{
    self, NewTyre, Tyre, TyreAllocation, TyreError, TyreHistoryEntry, TyrePatch, TyreStatus,
};
use crate::state::AppState;

pub(crate) fn tyre_error_to_status(err: &TyreError) -> StatusCode {
    match err {
        TyreError::NotFound(_) | TyreError::VehicleNotFound(_) => StatusCode::NOT_FOUND,
        TyreError::AlreadyFitted
        | TyreError::PositionOccupied(_)
        | TyreError::NotFitted
        | TyreError::Scrapped
        | TyreError::Conflict(_) => StatusCode::CONFLICT,
        TyreError::Invalid(_) => StatusCode::BAD_REQUEST,
        TyreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Deserialize)]
pub struct TyreListQuery {
    pub status: Option<String>,
}

/// `GET /api/tyres?status=` — tyre registry listing.
pub async fn list_tyres(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<TyreListQuery>,
) -> Result<Json<Vec<Tyre>>, StatusCode> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(TyreStatus::parse(raw).ok_or(StatusCode::BAD_REQUEST)?),
        None => None,
    };

    let rows = tyre::list_tyres(&state.pool, status)
        .await
        .map_err(|e| tyre_error_to_status(&e))?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct CreateTyreBody {
    pub serial: String,
    pub brand: String,
    pub size: String,
    pub tread_depth_mm: Option<f64>,
}

/// `POST /api/tyres` — register a tyre.
pub async fn create_tyre(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(body): Json<CreateTyreBody>,
) -> Result<(StatusCode, Json<Tyre>), StatusCode> {
    let new = NewTyre {
        serial: body.serial,
        brand: body.brand,
        size: body.size,
        tread_depth_mm: body.tread_depth_mm,
    };
    let row = tyre::create_tyre(&state, new)
        .await
        .map_err(|e| tyre_error_to_status(&e))?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// `GET /api/tyres/:id` — fetch one tyre.
pub async fn get_tyre(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Tyre>, StatusCode> {
    let row = tyre::get_tyre(&state.pool, id)
        .await
        .map_err(|e| tyre_error_to_status(&e))?;
    Ok(Json(row))
}

#[derive(Deserialize)]
pub struct UpdateTyreBody {
    pub serial: Option<String>,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub tread_depth_mm: Option<Option<f64>>,
}

/// `PATCH /api/tyres/:id` — update registry fields.
pub async fn update_tyre(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTyreBody>,
) -> Result<Json<Tyre>, StatusCode> {
    let patch = TyrePatch {
        serial: body.serial,
        brand: body.brand,
        size: body.size,
        tread_depth_mm: body.tread_depth_mm,
    };
    let row = tyre::update_tyre(&state, id, patch)
        .await
        .map_err(|e| tyre_error_to_status(&e))?;
    Ok(Json(row))
}

/// `DELETE /api/tyres/:id` — remove from registry (must not be fitted).
pub async fn delete_tyre(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    tyre::delete_tyre(&state, id)
        .await
        .map_err(|e| tyre_error_to_status(&e))?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

#[derive(Deserialize)]
pub struct FitTyreBody {
    pub vehicle_id: Uuid,
    pub position: String,
    pub odometer_km: Option<i64>,
}

/// `POST /api/tyres/:id/fit` — fit the tyre to a vehicle position.
pub async fn fit_tyre(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<FitTyreBody>,
) -> Result<(StatusCode, Json<TyreAllocation>), StatusCode> {
    let allocation = tyre::fit_tyre(&state, id, body.vehicle_id, &body.position, body.odometer_km)
        .await
        .map_err(|e| tyre_error_to_status(&e))?;
    Ok((StatusCode::CREATED, Json(allocation)))
}

#[derive(Deserialize, Default)]
pub struct RemoveTyreBody {
    pub odometer_km: Option<i64>,
    #[serde(default)]
    pub scrap: bool,
}

/// `POST /api/tyres/:id/remove` — take the tyre off its vehicle.
pub async fn remove_tyre(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<RemoveTyreBody>,
) -> Result<Json<Tyre>, StatusCode> {
    let row = tyre::remove_tyre(&state, id, body.odometer_km, body.scrap)
        .await
        .map_err(|e| tyre_error_to_status(&e))?;
    Ok(Json(row))
}

/// `GET /api/tyres/:id/history` — fitment history, newest first.
pub async fn tyre_history(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TyreHistoryEntry>>, StatusCode> {
    let rows = tyre::tyre_history(&state.pool, id)
        .await
        .map_err(|e| tyre_error_to_status(&e))?;
    Ok(Json(rows))
}

#[cfg(test)]
#[path = "tyres_test.rs"]
mod tests;
