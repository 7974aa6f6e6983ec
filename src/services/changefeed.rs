//! Change feed service — subscriber registry and row-level event publishing.
//!
//! DESIGN
//! ======
//! Websocket clients register a bounded frame channel, then subscribe to
//! named tables with an optional single-column equality filter. Every
//! mutating service publishes the affected row here; publishing fans the
//! event out to matching subscribers only.
//!
//! ERROR HANDLING
//! ==============
//! Delivery is best-effort: a slow client's full channel drops frames rather
//! than blocking the publisher. Consistency is owned by the database; clients
//! refetch on reconnect.

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

use crate::frame::{Data, Frame};
use crate::state::{AppState, ColumnFilter, FeedSubscriber};

/// Tables exposed on the change feed.
pub const TABLES: &[&str] = &[
    "vehicles",
    "inspections",
    "faults",
    "job_cards",
    "tyres",
    "tyre_allocations",
    "tyre_history",
    "inventory_items",
    "scheduled_maintenance",
];

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("unknown table: {0}")]
    UnknownTable(String),
    #[error("client not connected")]
    NotConnected,
}

impl crate::frame::ErrorCode for FeedError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownTable(_) => "E_UNKNOWN_TABLE",
            Self::NotConnected => "E_NOT_CONNECTED",
        }
    }
}

/// Kind of row change carried by an event frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

impl ChangeOp {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Register a connected client with its outgoing frame sender.
pub async fn register(state: &AppState, client_id: Uuid, user_id: Uuid, tx: mpsc::Sender<Frame>) {
    let mut subscribers = state.subscribers.write().await;
    subscribers.insert(client_id, FeedSubscriber::new(user_id, tx));
    info!(%client_id, %user_id, total = subscribers.len(), "feed: client registered");
}

/// Remove a client and all of its subscriptions.
pub async fn unregister(state: &AppState, client_id: Uuid) {
    let mut subscribers = state.subscribers.write().await;
    subscribers.remove(&client_id);
    info!(%client_id, remaining = subscribers.len(), "feed: client unregistered");
}

/// Subscribe a client to a table. Re-subscribing replaces the filter.
///
/// # Errors
///
/// Returns `UnknownTable` for table names not on the feed and
/// `NotConnected` if the client has no registry entry.
pub async fn subscribe(
    state: &AppState,
    client_id: Uuid,
    table: &str,
    filter: Option<ColumnFilter>,
) -> Result<(), FeedError> {
    if !TABLES.contains(&table) {
        return Err(FeedError::UnknownTable(table.to_owned()));
    }

    let mut subscribers = state.subscribers.write().await;
    let subscriber = subscribers
        .get_mut(&client_id)
        .ok_or(FeedError::NotConnected)?;
    subscriber.subscriptions.insert(table.to_owned(), filter);
    info!(%client_id, table, "feed: subscribed");
    Ok(())
}

/// Drop a client's subscription to a table. Unsubscribing from a table that
/// was never subscribed is a no-op.
///
/// # Errors
///
/// Returns `NotConnected` if the client has no registry entry.
pub async fn unsubscribe(state: &AppState, client_id: Uuid, table: &str) -> Result<(), FeedError> {
    let mut subscribers = state.subscribers.write().await;
    let subscriber = subscribers
        .get_mut(&client_id)
        .ok_or(FeedError::NotConnected)?;
    subscriber.subscriptions.remove(table);
    Ok(())
}

// =============================================================================
// MATCHING
// =============================================================================

/// Does a row pass a subscription filter? No filter matches everything.
#[must_use]
pub fn subscription_matches(filter: Option<&ColumnFilter>, row: &Data) -> bool {
    let Some(filter) = filter else {
        return true;
    };
    let Some(value) = row.get(&filter.column) else {
        return false;
    };
    values_equal(value, &filter.value)
}

/// Loose equality: exact JSON equality, with string forms compared as a
/// fallback so `"42"` matches `42` and UUIDs match their string form.
fn values_equal(a: &serde_json::Value, b: &serde_json::Value) -> bool {
    if a == b {
        return true;
    }
    scalar_string(a)
        .zip(scalar_string(b))
        .is_some_and(|(a, b)| a == b)
}

fn scalar_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// =============================================================================
// PUBLISHING
// =============================================================================

/// Serialize a row struct into a flat frame payload.
pub fn row_data<T: Serialize>(row: &T) -> Data {
    match serde_json::to_value(row) {
        Ok(serde_json::Value::Object(map)) => map.into_iter().collect(),
        _ => Data::new(),
    }
}

/// Publish a change event for a full row to all matching subscribers.
pub async fn publish_row<T: Serialize>(state: &AppState, table: &str, op: ChangeOp, row: &T) {
    publish(state, table, op, row_data(row)).await;
}

/// Publish a delete event carrying only the row id.
pub async fn publish_delete(state: &AppState, table: &str, id: Uuid) {
    let mut data = Data::new();
    data.insert("id".into(), serde_json::json!(id));
    publish(state, table, ChangeOp::Delete, data).await;
}

/// Fan an event out to every subscriber whose filter matches the row.
pub async fn publish(state: &AppState, table: &str, op: ChangeOp, row: Data) {
    let frame = Frame::request(format!("{table}:{}", op.as_str()), row).with_table(table);

    let subscribers = state.subscribers.read().await;
    for subscriber in subscribers.values() {
        let Some(filter) = subscriber.subscriptions.get(table) else {
            continue;
        };
        if !subscription_matches(filter.as_ref(), &frame.data) {
            continue;
        }
        // Best-effort: if a client's channel is full, skip it.
        let _ = subscriber.tx.try_send(frame.clone());
    }
}

#[cfg(test)]
#[path = "changefeed_test.rs"]
mod tests;
