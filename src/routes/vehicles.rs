//! Vehicle registry routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::routes::auth::AuthUser;
use crate::services::tyre::{self, TyreAllocation};
use crate::services::vehicle::{self, NewVehicle, Vehicle, VehicleCategory, VehicleError, VehiclePatch, VehicleStatus};
use crate::state::AppState;

pub(crate) fn vehicle_error_to_status(err: &VehicleError) -> StatusCode {
    match err {
        VehicleError::NotFound(_) => StatusCode::NOT_FOUND,
        VehicleError::Invalid(_) => StatusCode::BAD_REQUEST,
        VehicleError::Conflict(_) => StatusCode::CONFLICT,
        VehicleError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Deserialize)]
pub struct VehicleListQuery {
    pub category: Option<String>,
    pub status: Option<String>,
}

/// `GET /api/vehicles?category=&status=` — filtered registry listing.
pub async fn list_vehicles(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<VehicleListQuery>,
) -> Result<Json<Vec<Vehicle>>, StatusCode> {
    let category = match query.category.as_deref() {
        Some(raw) => Some(VehicleCategory::parse(raw).ok_or(StatusCode::BAD_REQUEST)?),
        None => None,
    };
    let status = match query.status.as_deref() {
        Some(raw) => Some(VehicleStatus::parse(raw).ok_or(StatusCode::BAD_REQUEST)?),
        None => None,
    };

    let rows = vehicle::list_vehicles(&state.pool, category, status)
        .await
        .map_err(|e| vehicle_error_to_status(&e))?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct CreateVehicleBody {
    pub fleet_number: String,
    pub registration: String,
    pub make: String,
    pub model: String,
    pub year: Option<i32>,
    pub category: VehicleCategory,
    pub status: Option<VehicleStatus>,
    pub odometer_km: Option<i64>,
}

/// `POST /api/vehicles` — register a vehicle.
pub async fn create_vehicle(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(body): Json<CreateVehicleBody>,
) -> Result<(StatusCode, Json<Vehicle>), StatusCode> {
    let new = NewVehicle {
        fleet_number: body.fleet_number,
        registration: body.registration,
        make: body.make,
        model: body.model,
        year: body.year,
        category: body.category,
        status: body.status,
        odometer_km: body.odometer_km,
    };
    let row = vehicle::create_vehicle(&state, new)
        .await
        .map_err(|e| vehicle_error_to_status(&e))?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// `GET /api/vehicles/:id` — fetch one vehicle.
pub async fn get_vehicle(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vehicle>, StatusCode> {
    let row = vehicle::get_vehicle(&state.pool, id)
        .await
        .map_err(|e| vehicle_error_to_status(&e))?;
    Ok(Json(row))
}

#[derive(Deserialize)]
pub struct UpdateVehicleBody {
    pub fleet_number: Option<String>,
    pub registration: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub category: Option<VehicleCategory>,
    pub status: Option<VehicleStatus>,
    pub odometer_km: Option<i64>,
}

/// `PATCH /api/vehicles/:id` — partial update.
pub async fn update_vehicle(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateVehicleBody>,
) -> Result<Json<Vehicle>, StatusCode> {
    let patch = VehiclePatch {
        fleet_number: body.fleet_number,
        registration: body.registration,
        make: body.make,
        model: body.model,
        year: body.year,
        category: body.category,
        status: body.status,
        odometer_km: body.odometer_km,
    };
    let row = vehicle::update_vehicle(&state, id, patch)
        .await
        .map_err(|e| vehicle_error_to_status(&e))?;
    Ok(Json(row))
}

/// `DELETE /api/vehicles/:id` — delete with child cascade.
pub async fn delete_vehicle(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    vehicle::delete_vehicle(&state, id)
        .await
        .map_err(|e| vehicle_error_to_status(&e))?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// `GET /api/vehicles/:id/tyres` — current tyre allocation per position.
pub async fn vehicle_tyres(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TyreAllocation>>, StatusCode> {
    // 404 for unknown vehicles rather than an empty list.
    vehicle::get_vehicle(&state.pool, id)
        .await
        .map_err(|e| vehicle_error_to_status(&e))?;

    let rows = tyre::list_vehicle_allocations(&state.pool, id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(rows))
}

#[cfg(test)]
#[path = "vehicles_test.rs"]
mod tests;
