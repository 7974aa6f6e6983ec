//! Vehicle service — fleet registry CRUD.
//!
//! DESIGN
//! ======
//! Vehicles are the root of the fleet graph; inspections, faults, job cards,
//! allocations, and maintenance rows all hang off them with FK cascades.
//! Deleting a vehicle first releases any fitted tyres so the tyre registry
//! never shows `fitted` without a live allocation.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::services::{changefeed, tyre};
use crate::services::changefeed::ChangeOp;
use crate::state::AppState;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum VehicleError {
    #[error("vehicle not found: {0}")]
    NotFound(Uuid),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("{0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::frame::ErrorCode for VehicleError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_VEHICLE_NOT_FOUND",
            Self::Invalid(_) => "E_INVALID_INPUT",
            Self::Conflict(_) => "E_CONFLICT",
            Self::Database(_) => "E_DATABASE",
        }
    }
}

/// Fleet grouping. Horses are tractor units, reefers refrigerated trailers,
/// ridgets rigid trucks, bakkies light vehicles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "vehicle_category", rename_all = "snake_case")]
pub enum VehicleCategory {
    Horse,
    Reefer,
    Interlink,
    Ridget,
    Bakkie,
}

impl VehicleCategory {
    pub const ALL: [Self; 5] = [Self::Horse, Self::Reefer, Self::Interlink, Self::Ridget, Self::Bakkie];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Horse => "horse",
            Self::Reefer => "reefer",
            Self::Interlink => "interlink",
            Self::Ridget => "ridget",
            Self::Bakkie => "bakkie",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "vehicle_status", rename_all = "snake_case")]
pub enum VehicleStatus {
    Active,
    InWorkshop,
    Decommissioned,
}

impl VehicleStatus {
    pub const ALL: [Self; 3] = [Self::Active, Self::InWorkshop, Self::Decommissioned];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::InWorkshop => "in_workshop",
            Self::Decommissioned => "decommissioned",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

/// Row mirrored from the `vehicles` table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub fleet_number: String,
    pub registration: String,
    pub make: String,
    pub model: String,
    pub year: Option<i32>,
    pub category: VehicleCategory,
    pub status: VehicleStatus,
    pub odometer_km: i64,
    pub created_at: String,
}

const VEHICLE_COLUMNS: &str = "id, fleet_number, registration, make, model, year, category, status, odometer_km, \
     to_char(created_at, 'YYYY-MM-DD HH24:MI:SS') AS created_at";

pub struct NewVehicle {
    pub fleet_number: String,
    pub registration: String,
    pub make: String,
    pub model: String,
    pub year: Option<i32>,
    pub category: VehicleCategory,
    pub status: Option<VehicleStatus>,
    pub odometer_km: Option<i64>,
}

#[derive(Default)]
pub struct VehiclePatch {
    pub fleet_number: Option<String>,
    pub registration: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub category: Option<VehicleCategory>,
    pub status: Option<VehicleStatus>,
    pub odometer_km: Option<i64>,
}

// =============================================================================
// VALIDATION
// =============================================================================

fn required(field: &'static str, value: &str) -> Result<String, VehicleError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(VehicleError::Invalid(format!("{field} required")));
    }
    Ok(trimmed.to_owned())
}

/// Odometer readings only move forward.
pub(crate) fn check_odometer(current: i64, incoming: i64) -> Result<(), VehicleError> {
    if incoming < current {
        return Err(VehicleError::Invalid(format!(
            "odometer cannot decrease ({incoming} < {current})"
        )));
    }
    Ok(())
}

async fn ensure_identifiers_free(
    pool: &PgPool,
    fleet_number: &str,
    registration: &str,
    exclude: Option<Uuid>,
) -> Result<(), VehicleError> {
    let taken: Option<String> = sqlx::query_scalar(
        "SELECT CASE WHEN fleet_number = $1 THEN 'fleet_number' ELSE 'registration' END
         FROM vehicles
         WHERE (fleet_number = $1 OR registration = $2) AND ($3::uuid IS NULL OR id <> $3)
         LIMIT 1",
    )
    .bind(fleet_number)
    .bind(registration)
    .bind(exclude)
    .fetch_optional(pool)
    .await?;

    match taken {
        Some(field) => Err(VehicleError::Conflict(format!("{field} already in use"))),
        None => Ok(()),
    }
}

// =============================================================================
// CRUD
// =============================================================================

/// List vehicles with optional equality filters, ordered by fleet number.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_vehicles(
    pool: &PgPool,
    category: Option<VehicleCategory>,
    status: Option<VehicleStatus>,
) -> Result<Vec<Vehicle>, VehicleError> {
    let rows = sqlx::query_as::<_, Vehicle>(&format!(
        "SELECT {VEHICLE_COLUMNS} FROM vehicles
         WHERE ($1::vehicle_category IS NULL OR category = $1)
           AND ($2::vehicle_status IS NULL OR status = $2)
         ORDER BY fleet_number ASC"
    ))
    .bind(category)
    .bind(status)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch one vehicle.
///
/// # Errors
///
/// Returns `NotFound` when the id does not exist.
pub async fn get_vehicle(pool: &PgPool, id: Uuid) -> Result<Vehicle, VehicleError> {
    sqlx::query_as::<_, Vehicle>(&format!("SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(VehicleError::NotFound(id))
}

/// Register a new vehicle.
///
/// # Errors
///
/// Returns `Invalid` on empty identifiers and `Conflict` when the fleet
/// number or registration is already in use.
pub async fn create_vehicle(state: &AppState, new: NewVehicle) -> Result<Vehicle, VehicleError> {
    let fleet_number = required("fleet_number", &new.fleet_number)?;
    let registration = required("registration", &new.registration)?;
    let make = required("make", &new.make)?;
    let model = required("model", &new.model)?;
    let odometer_km = new.odometer_km.unwrap_or(0);
    if odometer_km < 0 {
        return Err(VehicleError::Invalid("odometer_km cannot be negative".into()));
    }

    ensure_identifiers_free(&state.pool, &fleet_number, &registration, None).await?;

    let id = Uuid::new_v4();
    let status = new.status.unwrap_or(VehicleStatus::Active);
    let created_at: String = sqlx::query_scalar(
        "INSERT INTO vehicles (id, fleet_number, registration, make, model, year, category, status, odometer_km)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING to_char(created_at, 'YYYY-MM-DD HH24:MI:SS')",
    )
    .bind(id)
    .bind(&fleet_number)
    .bind(&registration)
    .bind(&make)
    .bind(&model)
    .bind(new.year)
    .bind(new.category)
    .bind(status)
    .bind(odometer_km)
    .fetch_one(&state.pool)
    .await?;

    let vehicle = Vehicle {
        id,
        fleet_number,
        registration,
        make,
        model,
        year: new.year,
        category: new.category,
        status,
        odometer_km,
        created_at,
    };

    changefeed::publish_row(state, "vehicles", ChangeOp::Insert, &vehicle).await;
    tracing::info!(%id, fleet_number = %vehicle.fleet_number, "vehicle registered");
    Ok(vehicle)
}

/// Apply a partial update.
///
/// # Errors
///
/// Returns `NotFound` for unknown ids, `Invalid` for empty identifiers or a
/// decreasing odometer, `Conflict` for identifier collisions.
pub async fn update_vehicle(state: &AppState, id: Uuid, patch: VehiclePatch) -> Result<Vehicle, VehicleError> {
    let mut vehicle = get_vehicle(&state.pool, id).await?;

    if let Some(fleet_number) = patch.fleet_number {
        vehicle.fleet_number = required("fleet_number", &fleet_number)?;
    }
    if let Some(registration) = patch.registration {
        vehicle.registration = required("registration", &registration)?;
    }
    if let Some(make) = patch.make {
        vehicle.make = required("make", &make)?;
    }
    if let Some(model) = patch.model {
        vehicle.model = required("model", &model)?;
    }
    if let Some(year) = patch.year {
        vehicle.year = Some(year);
    }
    if let Some(category) = patch.category {
        vehicle.category = category;
    }
    if let Some(status) = patch.status {
        vehicle.status = status;
    }
    if let Some(odometer_km) = patch.odometer_km {
        check_odometer(vehicle.odometer_km, odometer_km)?;
        vehicle.odometer_km = odometer_km;
    }

    ensure_identifiers_free(&state.pool, &vehicle.fleet_number, &vehicle.registration, Some(id)).await?;

    sqlx::query(
        "UPDATE vehicles
         SET fleet_number = $2, registration = $3, make = $4, model = $5,
             year = $6, category = $7, status = $8, odometer_km = $9
         WHERE id = $1",
    )
    .bind(id)
    .bind(&vehicle.fleet_number)
    .bind(&vehicle.registration)
    .bind(&vehicle.make)
    .bind(&vehicle.model)
    .bind(vehicle.year)
    .bind(vehicle.category)
    .bind(vehicle.status)
    .bind(vehicle.odometer_km)
    .execute(&state.pool)
    .await?;

    changefeed::publish_row(state, "vehicles", ChangeOp::Update, &vehicle).await;
    Ok(vehicle)
}

/// Delete a vehicle. Fitted tyres are released back to store first so the
/// registry and the allocation table stay consistent; child rows cascade.
///
/// # Errors
///
/// Returns `NotFound` when the id does not exist.
pub async fn delete_vehicle(state: &AppState, id: Uuid) -> Result<(), VehicleError> {
    let vehicle = get_vehicle(&state.pool, id).await?;

    tyre::release_all_for_vehicle(state, &vehicle).await?;

    let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(VehicleError::NotFound(id));
    }

    changefeed::publish_delete(state, "vehicles", id).await;
    tracing::info!(%id, "vehicle deleted");
    Ok(())
}

#[cfg(test)]
#[path = "vehicle_test.rs"]
mod tests;
