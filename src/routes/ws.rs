//! WebSocket handler — change-feed subscription endpoint.
//!
//! DESIGN
//! ======
//! On upgrade, generates a client ID, registers the client's frame channel
//! with the feed, and enters a `select!` loop:
//! - Incoming client frames → parse + dispatch by syscall prefix
//! - Change events published by services → forward to client
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → send `session:connected` with `client_id`
//! 2. Client sends `feed:*` frames → dispatch → done/error reply
//! 3. Services publish row events → matching subscribers receive them
//! 4. Close → unregister → subscriptions dropped

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::frame::{Data, Frame};
use crate::services::changefeed;
use crate::services::session;
use crate::state::{AppState, ColumnFilter};

// =============================================================================
// OUTCOME
// =============================================================================

/// Result returned by handler functions. The dispatch layer turns this into
/// the reply frame — handlers never send frames directly.
enum Outcome {
    /// Send done+data to sender.
    Reply(Data),
    /// Send empty done to sender.
    Done,
}

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    ws: WebSocketUpgrade,
) -> Response {
    let Some(ticket) = params.get("ticket") else {
        return (StatusCode::UNAUTHORIZED, "ticket required").into_response();
    };

    let user_id = match session::consume_ws_ticket(&state.pool, ticket).await {
        Ok(Some(uid)) => uid,
        Ok(None) => return (StatusCode::UNAUTHORIZED, "invalid or expired ticket").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "ws ticket validation failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "ticket validation error").into_response();
        }
    };

    ws.on_upgrade(move |socket| run_ws(socket, state, user_id))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState, user_id: Uuid) {
    let client_id = Uuid::new_v4();

    // Per-connection channel for receiving published change events.
    let (client_tx, mut client_rx) = mpsc::channel::<Frame>(256);
    changefeed::register(&state, client_id, user_id, client_tx).await;

    // Send session:connected with user_id.
    let welcome = Frame::request("session:connected", Data::new())
        .with_data("client_id", client_id.to_string())
        .with_data("user_id", user_id.to_string());
    if send_frame(&mut socket, &welcome).await.is_err() {
        changefeed::unregister(&state, client_id).await;
        return;
    }

    info!(%client_id, %user_id, "ws: client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(msg) = msg else { break };
                let Ok(msg) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        let replies = process_inbound_text(&state, client_id, user_id, &text).await;
                        for frame in replies {
                            let _ = send_frame(&mut socket, &frame).await;
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(frame) = client_rx.recv() => {
                if send_frame(&mut socket, &frame).await.is_err() {
                    break;
                }
            }
        }
    }

    changefeed::unregister(&state, client_id).await;
    info!(%client_id, "ws: client disconnected");
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

/// Parse and process one inbound text frame and return frames for the sender.
///
/// This keeps the websocket transport concerns separate from frame handling,
/// so tests can exercise subscription dispatch end-to-end.
pub(crate) async fn process_inbound_text(
    state: &AppState,
    client_id: Uuid,
    user_id: Uuid,
    text: &str,
) -> Vec<Frame> {
    let mut req: Frame = match serde_json::from_str(text) {
        Ok(r) => r,
        Err(e) => {
            warn!(%client_id, error = %e, "ws: invalid inbound frame");
            let err = Frame::request("gateway:error", Data::new()).with_data("message", format!("invalid json: {e}"));
            return vec![err];
        }
    };

    // Stamp the authenticated user_id as `from`.
    req.from = Some(user_id.to_string());

    info!(%client_id, id = %req.id, syscall = %req.syscall, "ws: recv frame");

    let result = match req.prefix() {
        "feed" => handle_feed(state, client_id, &req).await,
        prefix => Err(req.error(format!("unknown prefix: {prefix}"))),
    };

    match result {
        Ok(Outcome::Reply(data)) => vec![req.done_with(data)],
        Ok(Outcome::Done) => vec![req.done()],
        Err(err_frame) => vec![err_frame],
    }
}

// =============================================================================
// FEED HANDLERS
// =============================================================================

async fn handle_feed(state: &AppState, client_id: Uuid, req: &Frame) -> Result<Outcome, Frame> {
    let op = req.syscall.split_once(':').map_or("", |(_, op)| op);

    match op {
        "subscribe" => {
            let Some(table) = req.data.get("table").and_then(|v| v.as_str()) else {
                return Err(req.error("table required"));
            };

            let filter = match parse_filter(&req.data) {
                Ok(filter) => filter,
                Err(message) => return Err(req.error(message)),
            };

            match changefeed::subscribe(state, client_id, table, filter).await {
                Ok(()) => {
                    let mut data = Data::new();
                    data.insert("table".into(), serde_json::json!(table));
                    Ok(Outcome::Reply(data))
                }
                Err(e) => Err(req.error_from(&e)),
            }
        }
        "unsubscribe" => {
            let Some(table) = req.data.get("table").and_then(|v| v.as_str()) else {
                return Err(req.error("table required"));
            };
            match changefeed::unsubscribe(state, client_id, table).await {
                Ok(()) => Ok(Outcome::Done),
                Err(e) => Err(req.error_from(&e)),
            }
        }
        "tables" => {
            let mut data = Data::new();
            data.insert("tables".into(), serde_json::json!(changefeed::TABLES));
            Ok(Outcome::Reply(data))
        }
        _ => Err(req.error(format!("unknown feed op: {op}"))),
    }
}

/// Extract an optional `column`/`value` pair. Both must appear together.
fn parse_filter(data: &Data) -> Result<Option<ColumnFilter>, &'static str> {
    let column = data.get("column").and_then(|v| v.as_str());
    let value = data.get("value");
    match (column, value) {
        (Some(column), Some(value)) => {
            Ok(Some(ColumnFilter { column: column.to_owned(), value: value.clone() }))
        }
        (None, None) => Ok(None),
        _ => Err("column and value must be provided together"),
    }
}

// =============================================================================
// HELPERS
// =============================================================================

async fn send_frame(socket: &mut WebSocket, frame: &Frame) -> Result<(), ()> {
    let json = match serde_json::to_string(frame) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "ws: failed to serialize frame");
            return Err(());
        }
    };
    if frame.status == crate::frame::Status::Error {
        let code = frame
            .data
            .get("code")
            .and_then(|v| v.as_str())
            .unwrap_or("-");
        let message = frame
            .data
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("-");
        warn!(id = %frame.id, syscall = %frame.syscall, code, message, "ws: send frame status=Error");
    } else {
        info!(id = %frame.id, syscall = %frame.syscall, status = ?frame.status, "ws: send frame");
    }
    socket
        .send(Message::Text(json.into()))
        .await
        .map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
