//! Job card service — work orders with sequential card numbers.
//!
//! DESIGN
//! ======
//! Card numbers come from a Postgres sequence so they stay gap-tolerant but
//! strictly increasing across concurrent writers. Completing or cancelling a
//! card stamps `closed_on`; reopening clears it.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::services::changefeed::{self, ChangeOp};
use crate::services::inspection::vehicle_exists;
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum JobCardError {
    #[error("job card not found: {0}")]
    NotFound(Uuid),
    #[error("vehicle not found: {0}")]
    VehicleNotFound(Uuid),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::frame::ErrorCode for JobCardError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_JOB_CARD_NOT_FOUND",
            Self::VehicleNotFound(_) => "E_VEHICLE_NOT_FOUND",
            Self::Invalid(_) => "E_INVALID_INPUT",
            Self::Database(_) => "E_DATABASE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "job_card_priority", rename_all = "snake_case")]
pub enum JobCardPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl JobCardPriority {
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Urgent];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "job_card_status", rename_all = "snake_case")]
pub enum JobCardStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl JobCardStatus {
    pub const ALL: [Self; 4] = [Self::Open, Self::InProgress, Self::Completed, Self::Cancelled];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }

    /// Open and in-progress cards count toward the dashboard's open total.
    #[must_use]
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open | Self::InProgress)
    }

    /// Terminal statuses stamp `closed_on`.
    #[must_use]
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Row mirrored from the `job_cards` table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobCard {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub number: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: JobCardPriority,
    pub status: JobCardStatus,
    pub assigned_to: Option<String>,
    pub opened_on: String,
    pub closed_on: Option<String>,
}

const JOB_CARD_COLUMNS: &str = "id, vehicle_id, number, title, description, priority, status, assigned_to, \
     to_char(opened_on, 'YYYY-MM-DD') AS opened_on, to_char(closed_on, 'YYYY-MM-DD') AS closed_on";

pub struct NewJobCard {
    pub vehicle_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<JobCardPriority>,
    pub assigned_to: Option<String>,
}

#[derive(Default)]
pub struct JobCardPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<JobCardPriority>,
    pub status: Option<JobCardStatus>,
    pub assigned_to: Option<Option<String>>,
}

/// List job cards with optional equality filters, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_job_cards(
    pool: &PgPool,
    vehicle_id: Option<Uuid>,
    status: Option<JobCardStatus>,
    priority: Option<JobCardPriority>,
) -> Result<Vec<JobCard>, JobCardError> {
    let rows = sqlx::query_as::<_, JobCard>(&format!(
        "SELECT {JOB_CARD_COLUMNS} FROM job_cards
         WHERE ($1::uuid IS NULL OR vehicle_id = $1)
           AND ($2::job_card_status IS NULL OR status = $2)
           AND ($3::job_card_priority IS NULL OR priority = $3)
         ORDER BY opened_on DESC, number DESC"
    ))
    .bind(vehicle_id)
    .bind(status)
    .bind(priority)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch one job card.
///
/// # Errors
///
/// Returns `NotFound` when the id does not exist.
pub async fn get_job_card(pool: &PgPool, id: Uuid) -> Result<JobCard, JobCardError> {
    sqlx::query_as::<_, JobCard>(&format!("SELECT {JOB_CARD_COLUMNS} FROM job_cards WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(JobCardError::NotFound(id))
}

/// Open a new job card with the next sequential number.
///
/// # Errors
///
/// Returns `Invalid` on an empty title and `VehicleNotFound` for a dangling
/// vehicle reference.
pub async fn create_job_card(state: &AppState, new: NewJobCard) -> Result<JobCard, JobCardError> {
    let title = new.title.trim().to_owned();
    if title.is_empty() {
        return Err(JobCardError::Invalid("title required".into()));
    }

    if !vehicle_exists(&state.pool, new.vehicle_id).await? {
        return Err(JobCardError::VehicleNotFound(new.vehicle_id));
    }

    let seq: i64 = sqlx::query_scalar("SELECT nextval('job_card_number_seq')")
        .fetch_one(&state.pool)
        .await?;
    let number = format!("JC-{seq}");

    let id = Uuid::new_v4();
    let priority = new.priority.unwrap_or(JobCardPriority::Medium);
    let opened_on: String = sqlx::query_scalar(
        "INSERT INTO job_cards (id, vehicle_id, number, title, description, priority, status, assigned_to)
         VALUES ($1, $2, $3, $4, $5, $6, 'open', $7)
         RETURNING to_char(opened_on, 'YYYY-MM-DD')",
    )
    .bind(id)
    .bind(new.vehicle_id)
    .bind(&number)
    .bind(&title)
    .bind(&new.description)
    .bind(priority)
    .bind(&new.assigned_to)
    .fetch_one(&state.pool)
    .await?;

    let card = JobCard {
        id,
        vehicle_id: new.vehicle_id,
        number,
        title,
        description: new.description,
        priority,
        status: JobCardStatus::Open,
        assigned_to: new.assigned_to,
        opened_on,
        closed_on: None,
    };

    changefeed::publish_row(state, "job_cards", ChangeOp::Insert, &card).await;
    tracing::info!(%id, number = %card.number, "job card opened");
    Ok(card)
}

/// Apply a partial update; status transitions maintain `closed_on`.
///
/// # Errors
///
/// Returns `NotFound` for unknown ids and `Invalid` for an empty title.
pub async fn update_job_card(state: &AppState, id: Uuid, patch: JobCardPatch) -> Result<JobCard, JobCardError> {
    let mut card = get_job_card(&state.pool, id).await?;

    if let Some(title) = patch.title {
        let title = title.trim().to_owned();
        if title.is_empty() {
            return Err(JobCardError::Invalid("title required".into()));
        }
        card.title = title;
    }
    if let Some(description) = patch.description {
        card.description = description;
    }
    if let Some(priority) = patch.priority {
        card.priority = priority;
    }
    if let Some(assigned_to) = patch.assigned_to {
        card.assigned_to = assigned_to;
    }
    if let Some(status) = patch.status {
        if status.is_closed() && !card.status.is_closed() {
            let today: String = sqlx::query_scalar("SELECT to_char(CURRENT_DATE, 'YYYY-MM-DD')")
                .fetch_one(&state.pool)
                .await?;
            card.closed_on = Some(today);
        } else if !status.is_closed() {
            card.closed_on = None;
        }
        card.status = status;
    }

    sqlx::query(
        "UPDATE job_cards
         SET title = $2, description = $3, priority = $4, status = $5, assigned_to = $6, closed_on = $7::date
         WHERE id = $1",
    )
    .bind(id)
    .bind(&card.title)
    .bind(&card.description)
    .bind(card.priority)
    .bind(card.status)
    .bind(&card.assigned_to)
    .bind(&card.closed_on)
    .execute(&state.pool)
    .await?;

    changefeed::publish_row(state, "job_cards", ChangeOp::Update, &card).await;
    Ok(card)
}

/// Delete a job card. Linked faults survive with `job_card_id` nulled.
///
/// # Errors
///
/// Returns `NotFound` when the id does not exist.
pub async fn delete_job_card(state: &AppState, id: Uuid) -> Result<(), JobCardError> {
    let result = sqlx::query("DELETE FROM job_cards WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(JobCardError::NotFound(id));
    }
    changefeed::publish_delete(state, "job_cards", id).await;
    Ok(())
}

#[cfg(test)]
#[path = "job_card_test.rs"]
mod tests;
