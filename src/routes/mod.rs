//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds every HTTP + websocket endpoint under a single Axum
//! router: cookie-session auth, per-entity CRUD, reporting, and the
//! change-feed websocket.

pub mod auth;
pub mod faults;
pub mod inspections;
pub mod inventory;
pub mod job_cards;
pub mod maintenance;
pub mod reports;
pub mod tyres;
pub mod vehicles;
pub mod ws;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/ws-ticket", post(auth::ws_ticket))
        .route("/api/vehicles", get(vehicles::list_vehicles).post(vehicles::create_vehicle))
        .route(
            "/api/vehicles/{id}",
            get(vehicles::get_vehicle)
                .patch(vehicles::update_vehicle)
                .delete(vehicles::delete_vehicle),
        )
        .route("/api/vehicles/{id}/tyres", get(vehicles::vehicle_tyres))
        .route(
            "/api/inspections",
            get(inspections::list_inspections).post(inspections::create_inspection),
        )
        .route(
            "/api/inspections/{id}",
            get(inspections::get_inspection)
                .patch(inspections::update_inspection)
                .delete(inspections::delete_inspection),
        )
        .route("/api/faults", get(faults::list_faults).post(faults::create_fault))
        .route(
            "/api/faults/{id}",
            get(faults::get_fault)
                .patch(faults::update_fault)
                .delete(faults::delete_fault),
        )
        .route("/api/job-cards", get(job_cards::list_job_cards).post(job_cards::create_job_card))
        .route(
            "/api/job-cards/{id}",
            get(job_cards::get_job_card)
                .patch(job_cards::update_job_card)
                .delete(job_cards::delete_job_card),
        )
        .route("/api/job-cards/{id}/faults", get(job_cards::job_card_faults))
        .route("/api/tyres", get(tyres::list_tyres).post(tyres::create_tyre))
        .route(
            "/api/tyres/{id}",
            get(tyres::get_tyre).patch(tyres::update_tyre).delete(tyres::delete_tyre),
        )
        .route("/api/tyres/{id}/fit", post(tyres::fit_tyre))
        .route("/api/tyres/{id}/remove", post(tyres::remove_tyre))
        .route("/api/tyres/{id}/history", get(tyres::tyre_history))
        .route("/api/inventory", get(inventory::list_items).post(inventory::create_item))
        .route(
            "/api/inventory/{id}",
            get(inventory::get_item)
                .patch(inventory::update_item)
                .delete(inventory::delete_item),
        )
        .route("/api/inventory/{id}/adjust", post(inventory::adjust_stock))
        .route(
            "/api/maintenance",
            get(maintenance::list_maintenance).post(maintenance::create_maintenance),
        )
        .route(
            "/api/maintenance/{id}",
            get(maintenance::get_maintenance)
                .patch(maintenance::update_maintenance)
                .delete(maintenance::delete_maintenance),
        )
        .route("/api/reports/dashboard", get(reports::dashboard))
        .route("/api/reports/fleet.jsonl", get(reports::export_fleet_jsonl))
        .route("/api/ws", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
