//! Report service — dashboard statistics derived from fetched row arrays.
//!
//! DESIGN
//! ======
//! Counts are computed in Rust over the same lists the entity endpoints
//! serve, with pure functions that take fixture arrays in tests. Every
//! category/status bucket appears in the output, zeroes included, so the
//! dashboard renders a stable shape.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::services::fault::{self, Fault};
use crate::services::inventory::{self, InventoryItem};
use crate::services::job_card::{self, JobCard, JobCardPriority};
use crate::services::maintenance::{self, ScheduledMaintenance};
use crate::services::tyre::{self, Tyre, TyreStatus};
use crate::services::vehicle::{self, Vehicle, VehicleCategory, VehicleStatus};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("database error: {0}")]
    Database(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct VehicleCounts {
    pub total: usize,
    pub by_category: BTreeMap<String, usize>,
    pub by_status: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FaultCounts {
    pub active: usize,
    pub active_by_severity: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobCardCounts {
    pub open: usize,
    pub open_by_priority: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TyreCounts {
    pub fitted: usize,
    pub in_store: usize,
    pub scrapped: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub vehicles: VehicleCounts,
    pub faults: FaultCounts,
    pub job_cards: JobCardCounts,
    pub low_stock_items: usize,
    pub maintenance_due: usize,
    pub tyres: TyreCounts,
}

// =============================================================================
// COUNTERS
// =============================================================================

#[must_use]
pub fn vehicle_counts(vehicles: &[Vehicle]) -> VehicleCounts {
    let mut by_category: BTreeMap<String, usize> = VehicleCategory::ALL
        .into_iter()
        .map(|c| (c.as_str().to_owned(), 0))
        .collect();
    let mut by_status: BTreeMap<String, usize> = VehicleStatus::ALL
        .into_iter()
        .map(|s| (s.as_str().to_owned(), 0))
        .collect();

    for vehicle in vehicles {
        *by_category.entry(vehicle.category.as_str().to_owned()).or_default() += 1;
        *by_status.entry(vehicle.status.as_str().to_owned()).or_default() += 1;
    }

    VehicleCounts { total: vehicles.len(), by_category, by_status }
}

#[must_use]
pub fn fault_counts(faults: &[Fault]) -> FaultCounts {
    let mut active = 0;
    let mut active_by_severity: BTreeMap<String, usize> = fault::FaultSeverity::ALL
        .into_iter()
        .map(|s| (s.as_str().to_owned(), 0))
        .collect();

    for f in faults {
        if f.status.is_active() {
            active += 1;
            *active_by_severity.entry(f.severity.as_str().to_owned()).or_default() += 1;
        }
    }

    FaultCounts { active, active_by_severity }
}

#[must_use]
pub fn job_card_counts(cards: &[JobCard]) -> JobCardCounts {
    let mut open = 0;
    let mut open_by_priority: BTreeMap<String, usize> = JobCardPriority::ALL
        .into_iter()
        .map(|p| (p.as_str().to_owned(), 0))
        .collect();

    for card in cards {
        if card.status.is_open() {
            open += 1;
            *open_by_priority.entry(card.priority.as_str().to_owned()).or_default() += 1;
        }
    }

    JobCardCounts { open, open_by_priority }
}

#[must_use]
pub fn low_stock_count(items: &[InventoryItem]) -> usize {
    items.iter().filter(|i| i.is_low_stock()).count()
}

/// Count scheduled entries that are due today, given the current odometer
/// per vehicle.
#[must_use]
pub fn due_maintenance_count(
    entries: &[ScheduledMaintenance],
    odometers: &HashMap<Uuid, i64>,
    today: &str,
) -> usize {
    entries
        .iter()
        .filter(|e| e.is_due(today, odometers.get(&e.vehicle_id).copied()))
        .count()
}

#[must_use]
pub fn tyre_counts(tyres: &[Tyre]) -> TyreCounts {
    let mut counts = TyreCounts { fitted: 0, in_store: 0, scrapped: 0 };
    for t in tyres {
        match t.status {
            TyreStatus::Fitted => counts.fitted += 1,
            TyreStatus::InStore => counts.in_store += 1,
            TyreStatus::Scrapped => counts.scrapped += 1,
        }
    }
    counts
}

// =============================================================================
// ASSEMBLY
// =============================================================================

/// Build the dashboard summary from fresh reads of every entity list.
///
/// # Errors
///
/// Returns `Database` if any of the underlying reads fail.
pub async fn dashboard(pool: &PgPool) -> Result<DashboardSummary, ReportError> {
    let db = |e: &dyn std::fmt::Display| ReportError::Database(e.to_string());

    let vehicles = vehicle::list_vehicles(pool, None, None).await.map_err(|e| db(&e))?;
    let faults = fault::list_faults(pool, None, None, None).await.map_err(|e| db(&e))?;
    let cards = job_card::list_job_cards(pool, None, None, None).await.map_err(|e| db(&e))?;
    let items = inventory::list_items(pool, false).await.map_err(|e| db(&e))?;
    let entries = maintenance::list_maintenance(pool, None, None).await.map_err(|e| db(&e))?;
    let tyres = tyre::list_tyres(pool, None).await.map_err(|e| db(&e))?;

    let today: String = sqlx::query_scalar("SELECT to_char(CURRENT_DATE, 'YYYY-MM-DD')")
        .fetch_one(pool)
        .await
        .map_err(|e| db(&e))?;

    let odometers: HashMap<Uuid, i64> = vehicles.iter().map(|v| (v.id, v.odometer_km)).collect();

    Ok(DashboardSummary {
        vehicles: vehicle_counts(&vehicles),
        faults: fault_counts(&faults),
        job_cards: job_card_counts(&cards),
        low_stock_items: low_stock_count(&items),
        maintenance_due: due_maintenance_count(&entries, &odometers, &today),
        tyres: tyre_counts(&tyres),
    })
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
