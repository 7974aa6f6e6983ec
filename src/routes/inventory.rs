//! Parts inventory routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::routes::auth::AuthUser;
use crate::services::inventory::{self, InventoryError, InventoryItem, InventoryItemPatch, NewInventoryItem};
use crate::state::AppState;

pub(crate) fn inventory_error_to_status(err: &InventoryError) -> StatusCode {
    match err {
        InventoryError::NotFound(_) => StatusCode::NOT_FOUND,
        InventoryError::Invalid(_) => StatusCode::BAD_REQUEST,
        InventoryError::Conflict(_) => StatusCode::CONFLICT,
        InventoryError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Deserialize)]
pub struct InventoryListQuery {
    #[serde(default)]
    pub low_stock: bool,
}

/// `GET /api/inventory?low_stock=true` — stock listing.
pub async fn list_items(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<InventoryListQuery>,
) -> Result<Json<Vec<InventoryItem>>, StatusCode> {
    let rows = inventory::list_items(&state.pool, query.low_stock)
        .await
        .map_err(|e| inventory_error_to_status(&e))?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct CreateItemBody {
    pub name: String,
    pub part_number: String,
    pub quantity: Option<i64>,
    pub min_quantity: Option<i64>,
    pub unit_cost_cents: Option<i64>,
    pub location: Option<String>,
}

/// `POST /api/inventory` — add an item.
pub async fn create_item(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(body): Json<CreateItemBody>,
) -> Result<(StatusCode, Json<InventoryItem>), StatusCode> {
    let new = NewInventoryItem {
        name: body.name,
        part_number: body.part_number,
        quantity: body.quantity,
        min_quantity: body.min_quantity,
        unit_cost_cents: body.unit_cost_cents,
        location: body.location,
    };
    let row = inventory::create_item(&state, new)
        .await
        .map_err(|e| inventory_error_to_status(&e))?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// `GET /api/inventory/:id` — fetch one item.
pub async fn get_item(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<InventoryItem>, StatusCode> {
    let row = inventory::get_item(&state.pool, id)
        .await
        .map_err(|e| inventory_error_to_status(&e))?;
    Ok(Json(row))
}

#[derive(Deserialize)]
pub struct UpdateItemBody {
    pub name: Option<String>,
    pub min_quantity: Option<i64>,
    pub unit_cost_cents: Option<i64>,
    pub location: Option<Option<String>>,
}

/// `PATCH /api/inventory/:id` — update descriptive fields.
pub async fn update_item(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateItemBody>,
) -> Result<Json<InventoryItem>, StatusCode> {
    let patch = InventoryItemPatch {
        name: body.name,
        min_quantity: body.min_quantity,
        unit_cost_cents: body.unit_cost_cents,
        location: body.location,
    };
    let row = inventory::update_item(&state, id, patch)
        .await
        .map_err(|e| inventory_error_to_status(&e))?;
    Ok(Json(row))
}

#[derive(Deserialize)]
pub struct AdjustStockBody {
    pub delta: i64,
}

/// `POST /api/inventory/:id/adjust` — atomic signed stock adjustment.
pub async fn adjust_stock(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<AdjustStockBody>,
) -> Result<Json<InventoryItem>, StatusCode> {
    let row = inventory::adjust_stock(&state, id, body.delta)
        .await
        .map_err(|e| inventory_error_to_status(&e))?;
    Ok(Json(row))
}

/// `DELETE /api/inventory/:id` — delete an item.
pub async fn delete_item(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    inventory::delete_item(&state, id)
        .await
        .map_err(|e| inventory_error_to_status(&e))?;
    Ok(Json(serde_json::json!({ "ok": true })))
}
