//! Shared application state for the Observer API server.
//!
//! [`AppState`] holds the broadcast channel for cycle updates, handles to
//! the shared store and catalog, the currently selected zone, and a small
//! [`MonitorSnapshot`] of per-cycle metadata.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, Utc};
use reefwatch_core::catalog::Catalog;
use reefwatch_core::operator::OperatorState;
use reefwatch_core::store::ObservationStore;
pub use reefwatch_types::DataChangedBroadcast;
use reefwatch_types::{Zone, ZoneId};
use tokio::sync::{RwLock, broadcast};

use crate::error::ObserverError;

/// Capacity of the broadcast channel for cycle updates.
///
/// A subscriber that falls behind by more than this many messages gets
/// [`broadcast::error::RecvError::Lagged`] and skips to the newest one.
const BROADCAST_CAPACITY: usize = 256;

/// Per-cycle metadata served by the status endpoints.
///
/// Updated after each cycle by the engine.
#[derive(Debug, Clone, Default)]
pub struct MonitorSnapshot {
    /// Cycles completed.
    pub current_tick: u64,
    /// Timestamp of the last cycle, if one has run.
    pub last_cycle_at: Option<DateTime<Utc>>,
    /// The last update broadcast to clients.
    pub last_update: Option<DataChangedBroadcast>,
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
pub struct AppState {
    /// Station name shown on the status page.
    pub station_name: String,
    /// Broadcast sender for cycle updates.
    pub tx: broadcast::Sender<DataChangedBroadcast>,
    /// The rolling observation store, shared with the monitor loop.
    pub store: Arc<ObservationStore>,
    /// The validated catalog.
    pub catalog: Arc<Catalog>,
    /// Per-cycle metadata (updated each cycle).
    pub snapshot: Arc<RwLock<MonitorSnapshot>>,
    /// Shared operator control state (present when the monitor is running).
    pub operator_state: Option<Arc<OperatorState>>,
    /// Catalog position of the selected zone.
    selected_zone: AtomicU32,
}

impl AppState {
    /// Create application state with the first zone selected.
    pub fn new(
        station_name: impl Into<String>,
        store: Arc<ObservationStore>,
        catalog: Arc<Catalog>,
    ) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            station_name: station_name.into(),
            tx,
            store,
            catalog,
            snapshot: Arc::new(RwLock::new(MonitorSnapshot::default())),
            operator_state: None,
            selected_zone: AtomicU32::new(0),
        }
    }

    /// Attach operator control state.
    #[must_use]
    pub fn with_operator(mut self, operator: Arc<OperatorState>) -> Self {
        self.operator_state = Some(operator);
        self
    }

    /// The currently selected zone.
    pub fn selected_zone(&self) -> ZoneId {
        ZoneId::new(self.selected_zone.load(Ordering::Acquire))
    }

    /// Select a zone. Takes effect from the next cycle.
    ///
    /// # Errors
    ///
    /// Returns [`ObserverError::NotFound`] if the zone is not in the
    /// catalog.
    pub fn select_zone(&self, zone: ZoneId) -> Result<&Zone, ObserverError> {
        let entry = self
            .catalog
            .zone(zone)
            .ok_or_else(|| ObserverError::NotFound(format!("zone {}", zone.0)))?;
        self.selected_zone.store(zone.0, Ordering::Release);
        Ok(entry)
    }

    /// Look up a zone by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ObserverError::NotFound`] if the zone is not in the
    /// catalog.
    pub fn zone(&self, zone: ZoneId) -> Result<&Zone, ObserverError> {
        self.catalog
            .zone(zone)
            .ok_or_else(|| ObserverError::NotFound(format!("zone {}", zone.0)))
    }

    /// Subscribe to the update broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<DataChangedBroadcast> {
        self.tx.subscribe()
    }

    /// Publish a cycle update to all connected clients.
    ///
    /// Returns the number of receivers. Zero connected clients is not an
    /// error.
    pub fn broadcast(&self, update: &DataChangedBroadcast) -> usize {
        // `send` fails only when there are no receivers.
        self.tx.send(update.clone()).unwrap_or(0)
    }
}
