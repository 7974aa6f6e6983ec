//! Reporting routes — dashboard summary and fleet snapshot export.

use std::collections::HashMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use uuid::Uuid;

use crate::frame::now_ms;
use crate::routes::auth::AuthUser;
use crate::services::report::{self, DashboardSummary};
use crate::services::tyre::{self, TyreAllocation};
use crate::services::vehicle::{self, Vehicle};
use crate::state::AppState;

/// `GET /api/reports/dashboard` — derived fleet statistics.
pub async fn dashboard(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<DashboardSummary>, StatusCode> {
    let summary = report::dashboard(&state.pool).await.map_err(|e| {
        tracing::error!(error = %e, "dashboard assembly failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(summary))
}

#[derive(Serialize)]
struct FleetExportMetaLine {
    #[serde(rename = "type")]
    line_type: &'static str,
    version: u8,
    exported_at_ms: i64,
    vehicle_count: usize,
}

#[derive(Serialize)]
struct FleetExportVehicleLine<'a> {
    #[serde(rename = "type")]
    line_type: &'static str,
    #[serde(flatten)]
    vehicle: &'a Vehicle,
    tyres: Vec<&'a TyreAllocation>,
}

/// `GET /api/reports/fleet.jsonl` — download a fleet snapshot as NDJSON.
pub async fn export_fleet_jsonl(State(state): State<AppState>, _auth: AuthUser) -> Result<Response, StatusCode> {
    let vehicles = vehicle::list_vehicles(&state.pool, None, None)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let allocations = tyre::list_all_allocations(&state.pool)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let mut by_vehicle: HashMap<Uuid, Vec<&TyreAllocation>> = HashMap::new();
    for allocation in &allocations {
        by_vehicle.entry(allocation.vehicle_id).or_default().push(allocation);
    }

    let mut lines = Vec::with_capacity(vehicles.len() + 1);
    let meta = FleetExportMetaLine {
        line_type: "fleet_export_meta",
        version: 1,
        exported_at_ms: now_ms(),
        vehicle_count: vehicles.len(),
    };
    let meta_line = serde_json::to_string(&meta).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    lines.push(format!("{meta_line}\n"));

    for vehicle in &vehicles {
        let line = FleetExportVehicleLine {
            line_type: "vehicle",
            vehicle,
            tyres: by_vehicle.remove(&vehicle.id).unwrap_or_default(),
        };
        let serialized = serde_json::to_string(&line).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        lines.push(format!("{serialized}\n"));
    }

    let stream = futures::stream::iter(
        lines
            .into_iter()
            .map(|line| Ok::<axum::body::Bytes, std::convert::Infallible>(axum::body::Bytes::from(line))),
    );
    let body = axum::body::Body::from_stream(stream);

    Ok((
        [
            (CONTENT_TYPE, "application/x-ndjson; charset=utf-8"),
            (CONTENT_DISPOSITION, "attachment; filename=\"fleet.jsonl\""),
        ],
        body,
    )
        .into_response())
}
