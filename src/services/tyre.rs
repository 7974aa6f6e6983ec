//! Tyre service — registry, wheel-position allocation, and fitment history.
//!
//! DESIGN
//! ======
//! A tyre is identified by serial for humans and UUID for the schema. The
//! allocation table enforces both invariants with uniques (one position per
//! tyre, one tyre per vehicle position); the service checks them first to
//! return typed conflicts instead of raw constraint errors. Every fit and
//! removal appends a history row with the fleet number denormalized, so the
//! audit trail survives vehicle deletion.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::services::changefeed::{self, ChangeOp};
use crate::services::vehicle::Vehicle;
use crate::state::AppState;

pub const EVENT_FITTED: &str = "fitted";
pub const EVENT_REMOVED: &str = "removed";

#[derive(Debug, thiserror::Error)]
pub enum TyreError {
    #[error("tyre not found: {0}")]
    NotFound(Uuid),
    #[error("vehicle not found: {0}")]
    VehicleNotFound(Uuid),
    #[error("tyre is already fitted")]
    AlreadyFitted,
    #[error("position {0} is already occupied")]
    PositionOccupied(String),
    #[error("tyre is not fitted")]
    NotFitted,
    #[error("tyre has been scrapped")]
    Scrapped,
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("{0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::frame::ErrorCode for TyreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_TYRE_NOT_FOUND",
            Self::VehicleNotFound(_) => "E_VEHICLE_NOT_FOUND",
            Self::AlreadyFitted => "E_TYRE_ALREADY_FITTED",
            Self::PositionOccupied(_) => "E_POSITION_OCCUPIED",
            Self::NotFitted => "E_TYRE_NOT_FITTED",
            Self::Scrapped => "E_TYRE_SCRAPPED",
            Self::Invalid(_) => "E_INVALID_INPUT",
            Self::Conflict(_) => "E_CONFLICT",
            Self::Database(_) => "E_DATABASE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "tyre_status", rename_all = "snake_case")]
pub enum TyreStatus {
    InStore,
    Fitted,
    Scrapped,
}

impl TyreStatus {
    pub const ALL: [Self; 3] = [Self::InStore, Self::Fitted, Self::Scrapped];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InStore => "in_store",
            Self::Fitted => "fitted",
            Self::Scrapped => "scrapped",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

/// Row mirrored from the `tyres` table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tyre {
    pub id: Uuid,
    pub serial: String,
    pub brand: String,
    pub size: String,
    pub tread_depth_mm: Option<f64>,
    pub status: TyreStatus,
    pub created_at: String,
}

const TYRE_COLUMNS: &str =
    "id, serial, brand, size, tread_depth_mm, status, to_char(created_at, 'YYYY-MM-DD HH24:MI:SS') AS created_at";

/// Current fitment of one tyre, joined with its registry row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TyreAllocation {
    pub tyre_id: Uuid,
    pub vehicle_id: Uuid,
    pub position: String,
    pub serial: String,
    pub brand: String,
    pub size: String,
    pub fitted_at: String,
}

/// Append-only fitment audit row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TyreHistoryEntry {
    pub id: Uuid,
    pub tyre_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub fleet_number: String,
    pub position: String,
    pub event: String,
    pub odometer_km: Option<i64>,
    pub recorded_at: String,
}

pub struct NewTyre {
    pub serial: String,
    pub brand: String,
    pub size: String,
    pub tread_depth_mm: Option<f64>,
}

#[derive(Default)]
pub struct TyrePatch {
    pub serial: Option<String>,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub tread_depth_mm: Option<Option<f64>>,
}

// =============================================================================
// PRECONDITIONS
// =============================================================================

/// Only tyres on the shelf can go onto a vehicle.
pub(crate) fn fit_precondition(status: TyreStatus) -> Result<(), TyreError> {
    match status {
        TyreStatus::InStore => Ok(()),
        TyreStatus::Fitted => Err(TyreError::AlreadyFitted),
        TyreStatus::Scrapped => Err(TyreError::Scrapped),
    }
}

/// Only fitted tyres can come off one.
pub(crate) fn remove_precondition(status: TyreStatus) -> Result<(), TyreError> {
    match status {
        TyreStatus::Fitted => Ok(()),
        TyreStatus::InStore | TyreStatus::Scrapped => Err(TyreError::NotFitted),
    }
}

fn required(field: &'static str, value: &str) -> Result<String, TyreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TyreError::Invalid(format!("{field} required")));
    }
    Ok(trimmed.to_owned())
}

// =============================================================================
// CRUD
// =============================================================================

/// List tyres, optionally filtered by status, ordered by serial.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_tyres(pool: &PgPool, status: Option<TyreStatus>) -> Result<Vec<Tyre>, TyreError> {
    let rows = sqlx::query_as::<_, Tyre>(&format!(
        "SELECT {TYRE_COLUMNS} FROM tyres
         WHERE ($1::tyre_status IS NULL OR status = $1)
         ORDER BY serial ASC"
    ))
    .bind(status)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch one tyre.
///
/// # Errors
///
/// Returns `NotFound` when the id does not exist.
pub async fn get_tyre(pool: &PgPool, id: Uuid) -> Result<Tyre, TyreError> {
    sqlx::query_as::<_, Tyre>(&format!("SELECT {TYRE_COLUMNS} FROM tyres WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(TyreError::NotFound(id))
}

async fn ensure_serial_free(pool: &PgPool, serial: &str, exclude: Option<Uuid>) -> Result<(), TyreError> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM tyres WHERE serial = $1 AND ($2::uuid IS NULL OR id <> $2))",
    )
    .bind(serial)
    .bind(exclude)
    .fetch_one(pool)
    .await?;
    if exists {
        return Err(TyreError::Conflict(format!("serial {serial} already registered")));
    }
    Ok(())
}

/// Register a new tyre (starts in store).
///
/// # Errors
///
/// Returns `Invalid` on empty fields and `Conflict` on a duplicate serial.
pub async fn create_tyre(state: &AppState, new: NewTyre) -> Result<Tyre, TyreError> {
    let serial = required("serial", &new.serial)?;
    let brand = required("brand", &new.brand)?;
    let size = required("size", &new.size)?;

    ensure_serial_free(&state.pool, &serial, None).await?;

    let id = Uuid::new_v4();
    let created_at: String = sqlx::query_scalar(
        "INSERT INTO tyres (id, serial, brand, size, tread_depth_mm, status)
         VALUES ($1, $2, $3, $4, $5, 'in_store')
         RETURNING to_char(created_at, 'YYYY-MM-DD HH24:MI:SS')",
    )
    .bind(id)
    .bind(&serial)
    .bind(&brand)
    .bind(&size)
    .bind(new.tread_depth_mm)
    .fetch_one(&state.pool)
    .await?;

    let tyre = Tyre {
        id,
        serial,
        brand,
        size,
        tread_depth_mm: new.tread_depth_mm,
        status: TyreStatus::InStore,
        created_at,
    };

    changefeed::publish_row(state, "tyres", ChangeOp::Insert, &tyre).await;
    Ok(tyre)
}

/// Apply a partial update to registry fields. Status changes go through
/// fit/remove, never through PATCH.
///
/// # Errors
///
/// Returns `NotFound` for unknown ids, `Invalid` / `Conflict` on bad fields.
pub async fn update_tyre(state: &AppState, id: Uuid, patch: TyrePatch) -> Result<Tyre, TyreError> {
    let mut tyre = get_tyre(&state.pool, id).await?;

    if let Some(serial) = patch.serial {
        let serial = required("serial", &serial)?;
        ensure_serial_free(&state.pool, &serial, Some(id)).await?;
        tyre.serial = serial;
    }
    if let Some(brand) = patch.brand {
        tyre.brand = required("brand", &brand)?;
    }
    if let Some(size) = patch.size {
        tyre.size = required("size", &size)?;
    }
    if let Some(tread_depth_mm) = patch.tread_depth_mm {
        tyre.tread_depth_mm = tread_depth_mm;
    }

    sqlx::query("UPDATE tyres SET serial = $2, brand = $3, size = $4, tread_depth_mm = $5 WHERE id = $1")
        .bind(id)
        .bind(&tyre.serial)
        .bind(&tyre.brand)
        .bind(&tyre.size)
        .bind(tyre.tread_depth_mm)
        .execute(&state.pool)
        .await?;

    changefeed::publish_row(state, "tyres", ChangeOp::Update, &tyre).await;
    Ok(tyre)
}

/// Delete a tyre from the registry. Fitted tyres must be removed first.
///
/// # Errors
///
/// Returns `NotFound` for unknown ids and `AlreadyFitted` while allocated.
pub async fn delete_tyre(state: &AppState, id: Uuid) -> Result<(), TyreError> {
    let tyre = get_tyre(&state.pool, id).await?;
    if tyre.status == TyreStatus::Fitted {
        return Err(TyreError::AlreadyFitted);
    }

    sqlx::query("DELETE FROM tyres WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    changefeed::publish_delete(state, "tyres", id).await;
    Ok(())
}

// =============================================================================
// FIT / REMOVE
// =============================================================================

async fn record_history(
    state: &AppState,
    tyre_id: Uuid,
    vehicle_id: Option<Uuid>,
    fleet_number: &str,
    position: &str,
    event: &str,
    odometer_km: Option<i64>,
) -> Result<(), sqlx::Error> {
    let id = Uuid::new_v4();
    let recorded_at: String = sqlx::query_scalar(
        "INSERT INTO tyre_history (id, tyre_id, vehicle_id, fleet_number, position, event, odometer_km)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING to_char(recorded_at, 'YYYY-MM-DD HH24:MI:SS')",
    )
    .bind(id)
    .bind(tyre_id)
    .bind(vehicle_id)
    .bind(fleet_number)
    .bind(position)
    .bind(event)
    .bind(odometer_km)
    .fetch_one(&state.pool)
    .await?;

    let entry = TyreHistoryEntry {
        id,
        tyre_id,
        vehicle_id,
        fleet_number: fleet_number.to_owned(),
        position: position.to_owned(),
        event: event.to_owned(),
        odometer_km,
        recorded_at,
    };
    changefeed::publish_row(state, "tyre_history", ChangeOp::Insert, &entry).await;
    Ok(())
}

/// Fit a tyre to a named wheel position on a vehicle.
///
/// # Errors
///
/// Returns `AlreadyFitted` / `Scrapped` for tyres off the shelf,
/// `VehicleNotFound` for dangling vehicles, and `PositionOccupied` when the
/// position already holds a tyre.
pub async fn fit_tyre(
    state: &AppState,
    tyre_id: Uuid,
    vehicle_id: Uuid,
    position: &str,
    odometer_km: Option<i64>,
) -> Result<TyreAllocation, TyreError> {
    let tyre = get_tyre(&state.pool, tyre_id).await?;
    fit_precondition(tyre.status)?;
    let position = required("position", position)?;

    let fleet_number: Option<String> = sqlx::query_scalar("SELECT fleet_number FROM vehicles WHERE id = $1")
        .bind(vehicle_id)
        .fetch_optional(&state.pool)
        .await?;
    let Some(fleet_number) = fleet_number else {
        return Err(TyreError::VehicleNotFound(vehicle_id));
    };

    let occupied: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tyre_allocations WHERE vehicle_id = $1 AND position = $2)")
            .bind(vehicle_id)
            .bind(&position)
            .fetch_one(&state.pool)
            .await?;
    if occupied {
        return Err(TyreError::PositionOccupied(position));
    }

    let fitted_at: String = sqlx::query_scalar(
        "INSERT INTO tyre_allocations (tyre_id, vehicle_id, position)
         VALUES ($1, $2, $3)
         RETURNING to_char(fitted_at, 'YYYY-MM-DD HH24:MI:SS')",
    )
    .bind(tyre_id)
    .bind(vehicle_id)
    .bind(&position)
    .fetch_one(&state.pool)
    .await?;

    sqlx::query("UPDATE tyres SET status = 'fitted' WHERE id = $1")
        .bind(tyre_id)
        .execute(&state.pool)
        .await?;

    record_history(state, tyre_id, Some(vehicle_id), &fleet_number, &position, EVENT_FITTED, odometer_km).await?;

    let allocation = TyreAllocation {
        tyre_id,
        vehicle_id,
        position,
        serial: tyre.serial.clone(),
        brand: tyre.brand.clone(),
        size: tyre.size.clone(),
        fitted_at,
    };

    changefeed::publish_row(state, "tyre_allocations", ChangeOp::Insert, &allocation).await;
    let fitted = Tyre { status: TyreStatus::Fitted, ..tyre };
    changefeed::publish_row(state, "tyres", ChangeOp::Update, &fitted).await;

    tracing::info!(%tyre_id, %vehicle_id, position = %allocation.position, "tyre fitted");
    Ok(allocation)
}

/// Take a fitted tyre off its vehicle, back to store or straight to scrap.
///
/// # Errors
///
/// Returns `NotFitted` when the tyre has no allocation.
pub async fn remove_tyre(
    state: &AppState,
    tyre_id: Uuid,
    odometer_km: Option<i64>,
    scrap: bool,
) -> Result<Tyre, TyreError> {
    let tyre = get_tyre(&state.pool, tyre_id).await?;
    remove_precondition(tyre.status)?;

    let row: Option<(Uuid, String)> =
        sqlx::query_as("DELETE FROM tyre_allocations WHERE tyre_id = $1 RETURNING vehicle_id, position")
            .bind(tyre_id)
            .fetch_optional(&state.pool)
            .await?;
    let Some((vehicle_id, position)) = row else {
        return Err(TyreError::NotFitted);
    };

    let fleet_number: String = sqlx::query_scalar("SELECT fleet_number FROM vehicles WHERE id = $1")
        .bind(vehicle_id)
        .fetch_one(&state.pool)
        .await?;

    let status = if scrap { TyreStatus::Scrapped } else { TyreStatus::InStore };
    sqlx::query("UPDATE tyres SET status = $2 WHERE id = $1")
        .bind(tyre_id)
        .bind(status)
        .execute(&state.pool)
        .await?;

    record_history(state, tyre_id, Some(vehicle_id), &fleet_number, &position, EVENT_REMOVED, odometer_km).await?;

    changefeed::publish_delete(state, "tyre_allocations", tyre_id).await;
    let removed = Tyre { status, ..tyre };
    changefeed::publish_row(state, "tyres", ChangeOp::Update, &removed).await;

    tracing::info!(%tyre_id, %vehicle_id, position = %position, scrap, "tyre removed");
    Ok(removed)
}

/// Release every tyre on a vehicle back to store. Called before vehicle
/// deletion so no tyre is left `fitted` without an allocation.
pub(crate) async fn release_all_for_vehicle(state: &AppState, vehicle: &Vehicle) -> Result<(), sqlx::Error> {
    let rows: Vec<(Uuid, String)> =
        sqlx::query_as("DELETE FROM tyre_allocations WHERE vehicle_id = $1 RETURNING tyre_id, position")
            .bind(vehicle.id)
            .fetch_all(&state.pool)
            .await?;

    for (tyre_id, position) in rows {
        sqlx::query("UPDATE tyres SET status = 'in_store' WHERE id = $1 AND status = 'fitted'")
            .bind(tyre_id)
            .execute(&state.pool)
            .await?;
        record_history(
            state,
            tyre_id,
            Some(vehicle.id),
            &vehicle.fleet_number,
            &position,
            EVENT_REMOVED,
            Some(vehicle.odometer_km),
        )
        .await?;
        changefeed::publish_delete(state, "tyre_allocations", tyre_id).await;
    }
    Ok(())
}

// =============================================================================
// QUERIES
// =============================================================================

/// Current allocations for one vehicle, ordered by position name.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_vehicle_allocations(pool: &PgPool, vehicle_id: Uuid) -> Result<Vec<TyreAllocation>, TyreError> {
    let rows = sqlx::query_as::<_, TyreAllocation>(
        "SELECT a.tyre_id, a.vehicle_id, a.position, t.serial, t.brand, t.size,
                to_char(a.fitted_at, 'YYYY-MM-DD HH24:MI:SS') AS fitted_at
         FROM tyre_allocations a
         JOIN tyres t ON t.id = a.tyre_id
         WHERE a.vehicle_id = $1
         ORDER BY a.position ASC",
    )
    .bind(vehicle_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Every current allocation across the fleet, grouped by caller.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_all_allocations(pool: &PgPool) -> Result<Vec<TyreAllocation>, TyreError> {
    let rows = sqlx::query_as::<_, TyreAllocation>(
        "SELECT a.tyre_id, a.vehicle_id, a.position, t.serial, t.brand, t.size,
                to_char(a.fitted_at, 'YYYY-MM-DD HH24:MI:SS') AS fitted_at
         FROM tyre_allocations a
         JOIN tyres t ON t.id = a.tyre_id
         ORDER BY a.vehicle_id ASC, a.position ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fitment history for one tyre, newest first.
///
/// # Errors
///
/// Returns `NotFound` for unknown tyres.
pub async fn tyre_history(pool: &PgPool, tyre_id: Uuid) -> Result<Vec<TyreHistoryEntry>, TyreError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tyres WHERE id = $1)")
        .bind(tyre_id)
        .fetch_one(pool)
        .await?;
    if !exists {
        return Err(TyreError::NotFound(tyre_id));
    }

    let rows = sqlx::query_as::<_, TyreHistoryEntry>(
        "SELECT id, tyre_id, vehicle_id, fleet_number, position, event, odometer_km,
                to_char(recorded_at, 'YYYY-MM-DD HH24:MI:SS') AS recorded_at
         FROM tyre_history
         WHERE tyre_id = $1
         ORDER BY recorded_at DESC, id DESC",
    )
    .bind(tyre_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
#[path = "tyre_test.rs"]
mod tests;
