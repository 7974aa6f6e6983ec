//! Inventory service — workshop parts stock.
//!
//! Stock adjustments go through a single guarded UPDATE so concurrent
//! adjustments can never drive quantity below zero.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::services::changefeed::{self, ChangeOp};
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("inventory item not found: {0}")]
    NotFound(Uuid),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("{0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::frame::ErrorCode for InventoryError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_ITEM_NOT_FOUND",
            Self::Invalid(_) => "E_INVALID_INPUT",
            Self::Conflict(_) => "E_CONFLICT",
            Self::Database(_) => "E_DATABASE",
        }
    }
}

/// Row mirrored from the `inventory_items` table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct InventoryItem {
    pub id: Uuid,
    pub name: String,
    pub part_number: String,
    pub quantity: i64,
    pub min_quantity: i64,
    pub unit_cost_cents: i64,
    pub location: Option<String>,
}

impl InventoryItem {
    /// An item needs reordering once quantity reaches its minimum.
    #[must_use]
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_quantity
    }
}

const ITEM_COLUMNS: &str = "id, name, part_number, quantity, min_quantity, unit_cost_cents, location";

pub struct NewInventoryItem {
    pub name: String,
    pub part_number: String,
    pub quantity: Option<i64>,
    pub min_quantity: Option<i64>,
    pub unit_cost_cents: Option<i64>,
    pub location: Option<String>,
}

#[derive(Default)]
pub struct InventoryItemPatch {
    pub name: Option<String>,
    pub min_quantity: Option<i64>,
    pub unit_cost_cents: Option<i64>,
    pub location: Option<Option<String>>,
}

fn required(field: &'static str, value: &str) -> Result<String, InventoryError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(InventoryError::Invalid(format!("{field} required")));
    }
    Ok(trimmed.to_owned())
}

/// List items ordered by name. `low_stock` restricts to items at or below
/// their minimum.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_items(pool: &PgPool, low_stock: bool) -> Result<Vec<InventoryItem>, InventoryError> {
    let rows = sqlx::query_as::<_, InventoryItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM inventory_items
         WHERE ($1 = false OR quantity <= min_quantity)
         ORDER BY name ASC"
    ))
    .bind(low_stock)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch one item.
///
/// # Errors
///
/// Returns `NotFound` when the id does not exist.
pub async fn get_item(pool: &PgPool, id: Uuid) -> Result<InventoryItem, InventoryError> {
    sqlx::query_as::<_, InventoryItem>(&format!("SELECT {ITEM_COLUMNS} FROM inventory_items WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(InventoryError::NotFound(id))
}

/// Add a new item to stock.
///
/// # Errors
///
/// Returns `Invalid` on empty fields or negative quantities and `Conflict`
/// on a duplicate part number.
pub async fn create_item(state: &AppState, new: NewInventoryItem) -> Result<InventoryItem, InventoryError> {
    let name = required("name", &new.name)?;
    let part_number = required("part_number", &new.part_number)?;
    let quantity = new.quantity.unwrap_or(0);
    if quantity < 0 {
        return Err(InventoryError::Invalid("quantity cannot be negative".into()));
    }
    let min_quantity = new.min_quantity.unwrap_or(0);
    if min_quantity < 0 {
        return Err(InventoryError::Invalid("min_quantity cannot be negative".into()));
    }

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM inventory_items WHERE part_number = $1)")
        .bind(&part_number)
        .fetch_one(&state.pool)
        .await?;
    if exists {
        return Err(InventoryError::Conflict(format!("part number {part_number} already exists")));
    }

    let item = InventoryItem {
        id: Uuid::new_v4(),
        name,
        part_number,
        quantity,
        min_quantity,
        unit_cost_cents: new.unit_cost_cents.unwrap_or(0),
        location: new.location,
    };

    sqlx::query(
        "INSERT INTO inventory_items (id, name, part_number, quantity, min_quantity, unit_cost_cents, location)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(item.id)
    .bind(&item.name)
    .bind(&item.part_number)
    .bind(item.quantity)
    .bind(item.min_quantity)
    .bind(item.unit_cost_cents)
    .bind(&item.location)
    .execute(&state.pool)
    .await?;

    changefeed::publish_row(state, "inventory_items", ChangeOp::Insert, &item).await;
    Ok(item)
}

/// Apply a partial update to descriptive fields. Quantity moves only via
/// [`adjust_stock`].
///
/// # Errors
///
/// Returns `NotFound` for unknown ids and `Invalid` on bad fields.
pub async fn update_item(state: &AppState, id: Uuid, patch: InventoryItemPatch) -> Result<InventoryItem, InventoryError> {
    let mut item = get_item(&state.pool, id).await?;

    if let Some(name) = patch.name {
        item.name = required("name", &name)?;
    }
    if let Some(min_quantity) = patch.min_quantity {
        if min_quantity < 0 {
            return Err(InventoryError::Invalid("min_quantity cannot be negative".into()));
        }
        item.min_quantity = min_quantity;
    }
    if let Some(unit_cost_cents) = patch.unit_cost_cents {
        item.unit_cost_cents = unit_cost_cents;
    }
    if let Some(location) = patch.location {
        item.location = location;
    }

    sqlx::query(
        "UPDATE inventory_items SET name = $2, min_quantity = $3, unit_cost_cents = $4, location = $5 WHERE id = $1",
    )
    .bind(id)
    .bind(&item.name)
    .bind(item.min_quantity)
    .bind(item.unit_cost_cents)
    .bind(&item.location)
    .execute(&state.pool)
    .await?;

    changefeed::publish_row(state, "inventory_items", ChangeOp::Update, &item).await;
    Ok(item)
}

/// Atomically adjust stock by a signed delta.
///
/// # Errors
///
/// Returns `Conflict` when the adjustment would take quantity below zero and
/// `NotFound` for unknown ids.
pub async fn adjust_stock(state: &AppState, id: Uuid, delta: i64) -> Result<InventoryItem, InventoryError> {
    let row = sqlx::query_as::<_, InventoryItem>(&format!(
        "UPDATE inventory_items SET quantity = quantity + $2
         WHERE id = $1 AND quantity + $2 >= 0
         RETURNING {ITEM_COLUMNS}"
    ))
    .bind(id)
    .bind(delta)
    .fetch_optional(&state.pool)
    .await?;

    let Some(item) = row else {
        // Guard failed: distinguish missing item from insufficient stock.
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM inventory_items WHERE id = $1)")
            .bind(id)
            .fetch_one(&state.pool)
            .await?;
        if exists {
            return Err(InventoryError::Conflict("insufficient stock for adjustment".into()));
        }
        return Err(InventoryError::NotFound(id));
    };

    changefeed::publish_row(state, "inventory_items", ChangeOp::Update, &item).await;
    Ok(item)
}

/// Delete an item.
///
/// # Errors
///
/// Returns `NotFound` when the id does not exist.
pub async fn delete_item(state: &AppState, id: Uuid) -> Result<(), InventoryError> {
    let result = sqlx::query("DELETE FROM inventory_items WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(InventoryError::NotFound(id));
    }
    changefeed::publish_delete(state, "inventory_items", id).await;
    Ok(())
}

#[cfg(test)]
#[path = "inventory_test.rs"]
mod tests;
