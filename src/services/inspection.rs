//! Inspection service — per-vehicle inspection records.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::services::changefeed::{self, ChangeOp};
use crate::services::dates::valid_iso_date;
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum InspectionError {
    #[error("inspection not found: {0}")]
    NotFound(Uuid),
    #[error("vehicle not found: {0}")]
    VehicleNotFound(Uuid),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::frame::ErrorCode for InspectionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_INSPECTION_NOT_FOUND",
            Self::VehicleNotFound(_) => "E_VEHICLE_NOT_FOUND",
            Self::Invalid(_) => "E_INVALID_INPUT",
            Self::Database(_) => "E_DATABASE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "inspection_status", rename_all = "snake_case")]
pub enum InspectionStatus {
    Pending,
    Passed,
    Failed,
}

impl InspectionStatus {
    pub const ALL: [Self; 3] = [Self::Pending, Self::Passed, Self::Failed];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

/// Row mirrored from the `inspections` table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Inspection {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub inspector: String,
    pub inspected_on: String,
    pub odometer_km: Option<i64>,
    pub status: InspectionStatus,
    pub notes: Option<String>,
}

const INSPECTION_COLUMNS: &str = "id, vehicle_id, inspector, to_char(inspected_on, 'YYYY-MM-DD') AS inspected_on, \
     odometer_km, status, notes";

pub struct NewInspection {
    pub vehicle_id: Uuid,
    pub inspector: String,
    pub inspected_on: String,
    pub odometer_km: Option<i64>,
    pub status: Option<InspectionStatus>,
    pub notes: Option<String>,
}

#[derive(Default)]
pub struct InspectionPatch {
    pub inspector: Option<String>,
    pub inspected_on: Option<String>,
    pub odometer_km: Option<i64>,
    pub status: Option<InspectionStatus>,
    pub notes: Option<Option<String>>,
}

pub(crate) async fn vehicle_exists(pool: &PgPool, vehicle_id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM vehicles WHERE id = $1)")
        .bind(vehicle_id)
        .fetch_one(pool)
        .await
}

/// List inspections with optional equality filters, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_inspections(
    pool: &PgPool,
    vehicle_id: Option<Uuid>,
    status: Option<InspectionStatus>,
) -> Result<Vec<Inspection>, InspectionError> {
    let rows = sqlx::query_as::<_, Inspection>(&format!(
        "SELECT {INSPECTION_COLUMNS} FROM inspections
         WHERE ($1::uuid IS NULL OR vehicle_id = $1)
           AND ($2::inspection_status IS NULL OR status = $2)
         ORDER BY inspected_on DESC, id DESC"
    ))
    .bind(vehicle_id)
    .bind(status)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch one inspection.
///
/// # Errors
///
/// Returns `NotFound` when the id does not exist.
pub async fn get_inspection(pool: &PgPool, id: Uuid) -> Result<Inspection, InspectionError> {
    sqlx::query_as::<_, Inspection>(&format!("SELECT {INSPECTION_COLUMNS} FROM inspections WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(InspectionError::NotFound(id))
}

/// Record a new inspection.
///
/// # Errors
///
/// Returns `Invalid` on empty inspector or a malformed date and
/// `VehicleNotFound` when the vehicle does not exist.
pub async fn create_inspection(state: &AppState, new: NewInspection) -> Result<Inspection, InspectionError> {
    let inspector = new.inspector.trim().to_owned();
    if inspector.is_empty() {
        return Err(InspectionError::Invalid("inspector required".into()));
    }
    if !valid_iso_date(&new.inspected_on) {
        return Err(InspectionError::Invalid("inspected_on must be YYYY-MM-DD".into()));
    }

    if !vehicle_exists(&state.pool, new.vehicle_id).await? {
        return Err(InspectionError::VehicleNotFound(new.vehicle_id));
    }

    let id = Uuid::new_v4();
    let status = new.status.unwrap_or(InspectionStatus::Pending);
    sqlx::query(
        "INSERT INTO inspections (id, vehicle_id, inspector, inspected_on, odometer_km, status, notes)
         VALUES ($1, $2, $3, $4::date, $5, $6, $7)",
    )
    .bind(id)
    .bind(new.vehicle_id)
    .bind(&inspector)
    .bind(&new.inspected_on)
    .bind(new.odometer_km)
    .bind(status)
    .bind(&new.notes)
    .execute(&state.pool)
    .await?;

    let inspection = Inspection {
        id,
        vehicle_id: new.vehicle_id,
        inspector,
        inspected_on: new.inspected_on,
        odometer_km: new.odometer_km,
        status,
        notes: new.notes,
    };

    changefeed::publish_row(state, "inspections", ChangeOp::Insert, &inspection).await;
    Ok(inspection)
}

/// Apply a partial update.
///
/// # Errors
///
/// Returns `NotFound` for unknown ids and `Invalid` for bad field values.
pub async fn update_inspection(
    state: &AppState,
    id: Uuid,
    patch: InspectionPatch,
) -> Result<Inspection, InspectionError> {
    let mut inspection = get_inspection(&state.pool, id).await?;

    if let Some(inspector) = patch.inspector {
        let inspector = inspector.trim().to_owned();
        if inspector.is_empty() {
            return Err(InspectionError::Invalid("inspector required".into()));
        }
        inspection.inspector = inspector;
    }
    if let Some(inspected_on) = patch.inspected_on {
        if !valid_iso_date(&inspected_on) {
            return Err(InspectionError::Invalid("inspected_on must be YYYY-MM-DD".into()));
        }
        inspection.inspected_on = inspected_on;
    }
    if let Some(odometer_km) = patch.odometer_km {
        inspection.odometer_km = Some(odometer_km);
    }
    if let Some(status) = patch.status {
        inspection.status = status;
    }
    if let Some(notes) = patch.notes {
        inspection.notes = notes;
    }

    sqlx::query(
        "UPDATE inspections
         SET inspector = $2, inspected_on = $3::date, odometer_km = $4, status = $5, notes = $6
         WHERE id = $1",
    )
    .bind(id)
    .bind(&inspection.inspector)
    .bind(&inspection.inspected_on)
    .bind(inspection.odometer_km)
    .bind(inspection.status)
    .bind(&inspection.notes)
    .execute(&state.pool)
    .await?;

    changefeed::publish_row(state, "inspections", ChangeOp::Update, &inspection).await;
    Ok(inspection)
}

/// Delete an inspection. Linked faults keep their rows (`inspection_id` nulls).
///
/// # Errors
///
/// Returns `NotFound` when the id does not exist.
pub async fn delete_inspection(state: &AppState, id: Uuid) -> Result<(), InspectionError> {
    let result = sqlx::query("DELETE FROM inspections WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(InspectionError::NotFound(id));
    }
    changefeed::publish_delete(state, "inspections", id).await;
    Ok(())
}

#[cfg(test)]
#[path = "inspection_test.rs"]
mod tests;
