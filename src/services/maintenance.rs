//! Scheduled maintenance service.
//!
//! Entries are due by calendar date, odometer reading, or both; whichever
//! trips first. The due check is a pure predicate so the dashboard can
//! evaluate it over fetched arrays.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::services::changefeed::{self, ChangeOp};
use crate::services::dates::valid_iso_date;
use crate::services::inspection::vehicle_exists;
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum MaintenanceError {
    #[error("maintenance entry not found: {0}")]
    NotFound(Uuid),
    #[error("vehicle not found: {0}")]
    VehicleNotFound(Uuid),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::frame::ErrorCode for MaintenanceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_MAINTENANCE_NOT_FOUND",
            Self::VehicleNotFound(_) => "E_VEHICLE_NOT_FOUND",
            Self::Invalid(_) => "E_INVALID_INPUT",
            Self::Database(_) => "E_DATABASE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "maintenance_status", rename_all = "snake_case")]
pub enum MaintenanceStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl MaintenanceStatus {
    pub const ALL: [Self; 3] = [Self::Scheduled, Self::Completed, Self::Cancelled];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

/// Row mirrored from the `scheduled_maintenance` table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScheduledMaintenance {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub task: String,
    pub due_on: Option<String>,
    pub due_odometer_km: Option<i64>,
    pub status: MaintenanceStatus,
    pub completed_on: Option<String>,
}

impl ScheduledMaintenance {
    /// A scheduled entry is due once its date has arrived or the vehicle's
    /// odometer has reached the threshold.
    #[must_use]
    pub fn is_due(&self, today: &str, vehicle_odometer_km: Option<i64>) -> bool {
        if self.status != MaintenanceStatus::Scheduled {
            return false;
        }
        let date_due = self.due_on.as_deref().is_some_and(|due| due <= today);
        let odometer_due = match (self.due_odometer_km, vehicle_odometer_km) {
            (Some(due), Some(current)) => current >= due,
            _ => false,
        };
        date_due || odometer_due
    }
}

const MAINTENANCE_COLUMNS: &str = "id, vehicle_id, task, to_char(due_on, 'YYYY-MM-DD') AS due_on, due_odometer_km, \
     status, to_char(completed_on, 'YYYY-MM-DD') AS completed_on";

pub struct NewMaintenance {
    pub vehicle_id: Uuid,
    pub task: String,
    pub due_on: Option<String>,
    pub due_odometer_km: Option<i64>,
}

#[derive(Default)]
pub struct MaintenancePatch {
    pub task: Option<String>,
    pub due_on: Option<Option<String>>,
    pub due_odometer_km: Option<Option<i64>>,
    pub status: Option<MaintenanceStatus>,
}

/// List entries with optional equality filters, soonest due first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_maintenance(
    pool: &PgPool,
    vehicle_id: Option<Uuid>,
    status: Option<MaintenanceStatus>,
) -> Result<Vec<ScheduledMaintenance>, MaintenanceError> {
    let rows = sqlx::query_as::<_, ScheduledMaintenance>(&format!(
        "SELECT {MAINTENANCE_COLUMNS} FROM scheduled_maintenance
         WHERE ($1::uuid IS NULL OR vehicle_id = $1)
           AND ($2::maintenance_status IS NULL OR status = $2)
         ORDER BY due_on ASC NULLS LAST, due_odometer_km ASC NULLS LAST"
    ))
    .bind(vehicle_id)
    .bind(status)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch one entry.
///
/// # Errors
///
/// Returns `NotFound` when the id does not exist.
pub async fn get_maintenance(pool: &PgPool, id: Uuid) -> Result<ScheduledMaintenance, MaintenanceError> {
    sqlx::query_as::<_, ScheduledMaintenance>(&format!(
        "SELECT {MAINTENANCE_COLUMNS} FROM scheduled_maintenance WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(MaintenanceError::NotFound(id))
}

fn check_due_fields(due_on: Option<&str>, due_odometer_km: Option<i64>) -> Result<(), MaintenanceError> {
    if due_on.is_none() && due_odometer_km.is_none() {
        return Err(MaintenanceError::Invalid("either due_on or due_odometer_km required".into()));
    }
    if let Some(due_on) = due_on {
        if !valid_iso_date(due_on) {
            return Err(MaintenanceError::Invalid("due_on must be YYYY-MM-DD".into()));
        }
    }
    if let Some(due) = due_odometer_km {
        if due < 0 {
            return Err(MaintenanceError::Invalid("due_odometer_km cannot be negative".into()));
        }
    }
    Ok(())
}

/// Schedule a maintenance task.
///
/// # Errors
///
/// Returns `Invalid` when neither trigger is set or fields are malformed,
/// and `VehicleNotFound` for dangling vehicles.
pub async fn create_maintenance(state: &AppState, new: NewMaintenance) -> Result<ScheduledMaintenance, MaintenanceError> {
    let task = new.task.trim().to_owned();
    if task.is_empty() {
        return Err(MaintenanceError::Invalid("task required".into()));
    }
    check_due_fields(new.due_on.as_deref(), new.due_odometer_km)?;

    if !vehicle_exists(&state.pool, new.vehicle_id).await? {
        return Err(MaintenanceError::VehicleNotFound(new.vehicle_id));
    }

    let entry = ScheduledMaintenance {
        id: Uuid::new_v4(),
        vehicle_id: new.vehicle_id,
        task,
        due_on: new.due_on,
        due_odometer_km: new.due_odometer_km,
        status: MaintenanceStatus::Scheduled,
        completed_on: None,
    };

    sqlx::query(
        "INSERT INTO scheduled_maintenance (id, vehicle_id, task, due_on, due_odometer_km, status)
         VALUES ($1, $2, $3, $4::date, $5, 'scheduled')",
    )
    .bind(entry.id)
    .bind(entry.vehicle_id)
    .bind(&entry.task)
    .bind(&entry.due_on)
    .bind(entry.due_odometer_km)
    .execute(&state.pool)
    .await?;

    changefeed::publish_row(state, "scheduled_maintenance", ChangeOp::Insert, &entry).await;
    Ok(entry)
}

/// Apply a partial update; completing stamps `completed_on`.
///
/// # Errors
///
/// Returns `NotFound` for unknown ids and `Invalid` for bad field values.
pub async fn update_maintenance(
    state: &AppState,
    id: Uuid,
    patch: MaintenancePatch,
) -> Result<ScheduledMaintenance, MaintenanceError> {
    let mut entry = get_maintenance(&state.pool, id).await?;

    if let Some(task) = patch.task {
        let task = task.trim().to_owned();
        if task.is_empty() {
            return Err(MaintenanceError::Invalid("task required".into()));
        }
        entry.task = task;
    }
    if let Some(due_on) = patch.due_on {
        entry.due_on = due_on;
    }
    if let Some(due_odometer_km) = patch.due_odometer_km {
        entry.due_odometer_km = due_odometer_km;
    }
    check_due_fields(entry.due_on.as_deref(), entry.due_odometer_km)?;

    if let Some(status) = patch.status {
        if status == MaintenanceStatus::Completed && entry.status != MaintenanceStatus::Completed {
            let today: String = sqlx::query_scalar("SELECT to_char(CURRENT_DATE, 'YYYY-MM-DD')")
                .fetch_one(&state.pool)
                .await?;
            entry.completed_on = Some(today);
        } else if status != MaintenanceStatus::Completed {
            entry.completed_on = None;
        }
        entry.status = status;
    }

    sqlx::query(
        "UPDATE scheduled_maintenance
         SET task = $2, due_on = $3::date, due_odometer_km = $4, status = $5, completed_on = $6::date
         WHERE id = $1",
    )
    .bind(id)
    .bind(&entry.task)
    .bind(&entry.due_on)
    .bind(entry.due_odometer_km)
    .bind(entry.status)
    .bind(&entry.completed_on)
    .execute(&state.pool)
    .await?;

    changefeed::publish_row(state, "scheduled_maintenance", ChangeOp::Update, &entry).await;
    Ok(entry)
}

/// Delete an entry.
///
/// # Errors
///
/// Returns `NotFound` when the id does not exist.
pub async fn delete_maintenance(state: &AppState, id: Uuid) -> Result<(), MaintenanceError> {
    let result = sqlx::query("DELETE FROM scheduled_maintenance WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(MaintenanceError::NotFound(id));
    }
    changefeed::publish_delete(state, "scheduled_maintenance", id).await;
    Ok(())
}

#[cfg(test)]
#[path = "maintenance_test.rs"]
mod tests;
