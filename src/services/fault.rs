//! Fault service — defect reports linked to vehicles, inspections, job cards.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::services::changefeed::{self, ChangeOp};
use crate::services::inspection::vehicle_exists;
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum FaultError {
    #[error("fault not found: {0}")]
    NotFound(Uuid),
    #[error("vehicle not found: {0}")]
    VehicleNotFound(Uuid),
    #[error("inspection not found: {0}")]
    InspectionNotFound(Uuid),
    #[error("job card not found: {0}")]
    JobCardNotFound(Uuid),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::frame::ErrorCode for FaultError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_FAULT_NOT_FOUND",
            Self::VehicleNotFound(_) => "E_VEHICLE_NOT_FOUND",
            Self::InspectionNotFound(_) => "E_INSPECTION_NOT_FOUND",
            Self::JobCardNotFound(_) => "E_JOB_CARD_NOT_FOUND",
            Self::Invalid(_) => "E_INVALID_INPUT",
            Self::Database(_) => "E_DATABASE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "fault_severity", rename_all = "snake_case")]
pub enum FaultSeverity {
    Minor,
    Major,
    Critical,
}

impl FaultSeverity {
    pub const ALL: [Self; 3] = [Self::Minor, Self::Major, Self::Critical];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minor => "minor",
            Self::Major => "major",
            Self::Critical => "critical",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "fault_status", rename_all = "snake_case")]
pub enum FaultStatus {
    Open,
    InProgress,
    Resolved,
}

impl FaultStatus {
    pub const ALL: [Self; 3] = [Self::Open, Self::InProgress, Self::Resolved];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }

    /// Open and in-progress faults count toward the dashboard's active total.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Open | Self::InProgress)
    }
}

/// Row mirrored from the `faults` table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Fault {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub inspection_id: Option<Uuid>,
    pub job_card_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub severity: FaultSeverity,
    pub status: FaultStatus,
    pub reported_by: String,
    pub created_at: String,
}

const FAULT_COLUMNS: &str = "id, vehicle_id, inspection_id, job_card_id, title, description, severity, status, \
     reported_by, to_char(created_at, 'YYYY-MM-DD HH24:MI:SS') AS created_at";

pub struct NewFault {
    pub vehicle_id: Uuid,
    pub inspection_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub severity: Option<FaultSeverity>,
    pub reported_by: String,
}

#[derive(Default)]
pub struct FaultPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub severity: Option<FaultSeverity>,
    pub status: Option<FaultStatus>,
    /// `Some(None)` unlinks the fault from its job card.
    pub job_card_id: Option<Option<Uuid>>,
}

/// List faults with optional equality filters, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_faults(
    pool: &PgPool,
    vehicle_id: Option<Uuid>,
    status: Option<FaultStatus>,
    severity: Option<FaultSeverity>,
) -> Result<Vec<Fault>, FaultError> {
    let rows = sqlx::query_as::<_, Fault>(&format!(
        "SELECT {FAULT_COLUMNS} FROM faults
         WHERE ($1::uuid IS NULL OR vehicle_id = $1)
           AND ($2::fault_status IS NULL OR status = $2)
           AND ($3::fault_severity IS NULL OR severity = $3)
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(vehicle_id)
    .bind(status)
    .bind(severity)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// List faults linked to one job card.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_for_job_card(pool: &PgPool, job_card_id: Uuid) -> Result<Vec<Fault>, FaultError> {
    let rows = sqlx::query_as::<_, Fault>(&format!(
        "SELECT {FAULT_COLUMNS} FROM faults WHERE job_card_id = $1 ORDER BY created_at DESC, id DESC"
    ))
    .bind(job_card_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch one fault.
///
/// # Errors
///
/// Returns `NotFound` when the id does not exist.
pub async fn get_fault(pool: &PgPool, id: Uuid) -> Result<Fault, FaultError> {
    sqlx::query_as::<_, Fault>(&format!("SELECT {FAULT_COLUMNS} FROM faults WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(FaultError::NotFound(id))
}

/// Report a new fault.
///
/// # Errors
///
/// Returns `Invalid` on an empty title and `VehicleNotFound` /
/// `InspectionNotFound` for dangling references.
pub async fn create_fault(state: &AppState, new: NewFault) -> Result<Fault, FaultError> {
    let title = new.title.trim().to_owned();
    if title.is_empty() {
        return Err(FaultError::Invalid("title required".into()));
    }

    if !vehicle_exists(&state.pool, new.vehicle_id).await? {
        return Err(FaultError::VehicleNotFound(new.vehicle_id));
    }
    if let Some(inspection_id) = new.inspection_id {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM inspections WHERE id = $1)")
            .bind(inspection_id)
            .fetch_one(&state.pool)
            .await?;
        if !exists {
            return Err(FaultError::InspectionNotFound(inspection_id));
        }
    }

    let id = Uuid::new_v4();
    let severity = new.severity.unwrap_or(FaultSeverity::Minor);
    let created_at: String = sqlx::query_scalar(
        "INSERT INTO faults (id, vehicle_id, inspection_id, title, description, severity, status, reported_by)
         VALUES ($1, $2, $3, $4, $5, $6, 'open', $7)
         RETURNING to_char(created_at, 'YYYY-MM-DD HH24:MI:SS')",
    )
    .bind(id)
    .bind(new.vehicle_id)
    .bind(new.inspection_id)
    .bind(&title)
    .bind(&new.description)
    .bind(severity)
    .bind(&new.reported_by)
    .fetch_one(&state.pool)
    .await?;

    let fault = Fault {
        id,
        vehicle_id: new.vehicle_id,
        inspection_id: new.inspection_id,
        job_card_id: None,
        title,
        description: new.description,
        severity,
        status: FaultStatus::Open,
        reported_by: new.reported_by,
        created_at,
    };

    changefeed::publish_row(state, "faults", ChangeOp::Insert, &fault).await;
    Ok(fault)
}

/// Apply a partial update; can link or unlink a job card.
///
/// # Errors
///
/// Returns `NotFound` for unknown ids, `JobCardNotFound` for a dangling
/// link, `Invalid` for an empty title.
pub async fn update_fault(state: &AppState, id: Uuid, patch: FaultPatch) -> Result<Fault, FaultError> {
    let mut fault = get_fault(&state.pool, id).await?;

    if let Some(title) = patch.title {
        let title = title.trim().to_owned();
        if title.is_empty() {
            return Err(FaultError::Invalid("title required".into()));
        }
        fault.title = title;
    }
    if let Some(description) = patch.description {
        fault.description = description;
    }
    if let Some(severity) = patch.severity {
        fault.severity = severity;
    }
    if let Some(status) = patch.status {
        fault.status = status;
    }
    if let Some(job_card_id) = patch.job_card_id {
        if let Some(job_card_id) = job_card_id {
            let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM job_cards WHERE id = $1)")
                .bind(job_card_id)
                .fetch_one(&state.pool)
                .await?;
            if !exists {
                return Err(FaultError::JobCardNotFound(job_card_id));
            }
        }
        fault.job_card_id = job_card_id;
    }

    sqlx::query(
        "UPDATE faults
         SET title = $2, description = $3, severity = $4, status = $5, job_card_id = $6
         WHERE id = $1",
    )
    .bind(id)
    .bind(&fault.title)
    .bind(&fault.description)
    .bind(fault.severity)
    .bind(fault.status)
    .bind(fault.job_card_id)
    .execute(&state.pool)
    .await?;

    changefeed::publish_row(state, "faults", ChangeOp::Update, &fault).await;
    Ok(fault)
}

/// Delete a fault.
///
/// # Errors
///
/// Returns `NotFound` when the id does not exist.
pub async fn delete_fault(state: &AppState, id: Uuid) -> Result<(), FaultError> {
    let result = sqlx::query("DELETE FROM faults WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(FaultError::NotFound(id));
    }
    changefeed::publish_delete(state, "faults", id).await;
    Ok(())
}

#[cfg(test)]
#[path = "fault_test.rs"]
mod tests;
