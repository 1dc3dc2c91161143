//! Observer API server for the Reefwatch coastal monitor.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/updates`) streaming a
//!   [`DataChangedBroadcast`] after every refresh cycle via
//!   [`tokio::sync::broadcast`]
//! - **REST endpoints** for the catalog, zone selection, zone snapshots,
//!   index series, species composition, and environmental series
//! - **Operator REST endpoints** for runtime control (pause, resume,
//!   speed, status, stop)
//! - **Minimal HTML status page** (`GET /`)
//!
//! # Architecture
//!
//! Zone data is read straight from the shared
//! [`ObservationStore`](reefwatch_core::store::ObservationStore), whose
//! read guards never block each other. Per-cycle metadata lives in a
//! [`MonitorSnapshot`] the engine updates after each cycle. The observer
//! only reads; it never appends.

pub mod error;
pub mod handlers;
pub mod operator;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::{AppState, DataChangedBroadcast, MonitorSnapshot};
