//! Domain services used by websocket and HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and persistence concerns so route
//! handlers can stay focused on protocol translation and auth plumbing.
//! Mutating services publish row change events through [`changefeed`].

pub mod auth;
pub mod changefeed;
pub mod dates;
pub mod fault;
pub mod inspection;
pub mod inventory;
pub mod job_card;
pub mod maintenance;
pub mod report;
pub mod session;
pub mod sweeper;
pub mod tyre;
pub mod vehicle;
