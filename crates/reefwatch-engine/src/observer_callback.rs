//! Cycle callback that feeds the Observer API.
//!
//! After each cycle, [`ObserverCallback`] runs the presentation bridge for
//! the zone selected through the API, broadcasts a
//! [`DataChangedBroadcast`] to connected `WebSocket` clients, and updates
//! the [`MonitorSnapshot`](reefwatch_observer::MonitorSnapshot).

use std::sync::Arc;

use reefwatch_core::diversity::IndexSeries;
use reefwatch_core::presentation::{PresentationAdapter, PresentationBridge};
use reefwatch_core::scheduler::{CycleCallback, CycleSummary, MonitorState};
use reefwatch_observer::state::{AppState, DataChangedBroadcast};
use reefwatch_types::{DiversityIndices, Observation, Zone, ZoneId};
use tracing::debug;

/// What the adapter was last asked to present.
#[derive(Debug, Clone, Copy)]
struct RenderedZone {
    zone: ZoneId,
    latest_indices: Option<DiversityIndices>,
}

/// [`PresentationAdapter`] backed by the observer's zone selection.
pub struct ObserverAdapter {
    state: Arc<AppState>,
    rendered: Option<RenderedZone>,
}

impl PresentationAdapter for ObserverAdapter {
    fn on_data_changed(&mut self, zone: &Zone, snapshot: &[Observation], indices: &IndexSeries) {
        debug!(
            zone = %zone.id,
            zone_name = zone.name,
            observations = snapshot.len(),
            index_points = indices.points.len(),
            skipped = indices.skipped,
            "Zone data changed"
        );
        self.rendered = Some(RenderedZone {
            zone: zone.id,
            latest_indices: indices.latest().map(|point| point.indices),
        });
    }

    fn selected_zone(&self) -> ZoneId {
        self.state.selected_zone()
    }
}

/// Callback that bridges the refresh loop to the Observer API.
pub struct ObserverCallback {
    state: Arc<AppState>,
    bridge: PresentationBridge<ObserverAdapter>,
}

impl ObserverCallback {
    /// Create a callback backed by the given app state.
    pub fn new(state: Arc<AppState>) -> Self {
        let adapter = ObserverAdapter {
            state: Arc::clone(&state),
            rendered: None,
        };
        Self {
            state,
            bridge: PresentationBridge::new(adapter),
        }
    }
}

impl CycleCallback for ObserverCallback {
    fn on_cycle(&mut self, summary: &CycleSummary, monitor: &MonitorState) {
        self.bridge.on_cycle(summary, monitor);
        let rendered = self.bridge.adapter_mut().rendered.take();

        let update = DataChangedBroadcast {
            tick: summary.tick,
            timestamp: summary.timestamp,
            zone: rendered.map_or_else(|| self.state.selected_zone(), |r| r.zone),
            observations_appended: summary.appended,
            failed_zones: summary.failures.iter().map(|f| f.zone).collect(),
            store_len: summary.store_len,
            latest_indices: rendered.and_then(|r| r.latest_indices),
        };

        let receivers = self.state.broadcast(&update);
        debug!(tick = summary.tick, receivers, "Update broadcast sent");

        // A REST handler holding the read lock skips this update; the next
        // cycle catches up.
        if let Ok(mut snap) = self.state.snapshot.try_write() {
            snap.current_tick = summary.tick;
            snap.last_cycle_at = Some(summary.timestamp);
            snap.last_update = Some(update);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{DateTime, TimeDelta};
    use reefwatch_core::catalog::Catalog;
    use reefwatch_core::clock::SteppingClock;
    use reefwatch_core::config::CatalogConfig;
    use reefwatch_core::generator::ObservationGenerator;
    use reefwatch_core::random::RngSource;
    use reefwatch_core::scheduler::run_cycle;
    use reefwatch_core::store::ObservationStore;

    use super::*;

    fn setup() -> (Arc<AppState>, MonitorState) {
        let catalog = Arc::new(Catalog::from_config(&CatalogConfig::default()).unwrap());
        let store = Arc::new(ObservationStore::new(70).unwrap());
        let app = Arc::new(AppState::new("Test", Arc::clone(&store), Arc::clone(&catalog)));
        let monitor = MonitorState::new(
            store,
            ObservationGenerator::new(catalog, 100),
            Box::new(SteppingClock::new(
                DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
                TimeDelta::seconds(3),
            )),
            Box::new(RngSource::seeded(17)),
        );
        (app, monitor)
    }

    #[tokio::test]
    async fn cycle_broadcasts_selected_zone_update() {
        let (app, mut monitor) = setup();
        app.select_zone(ZoneId::new(2)).unwrap();
        let mut rx = app.subscribe();
        let mut callback = ObserverCallback::new(Arc::clone(&app));

        let summary = run_cycle(&mut monitor).unwrap();
        callback.on_cycle(&summary, &monitor);

        let update = rx.recv().await.unwrap();
        assert_eq!(update.tick, 1);
        assert_eq!(update.zone, ZoneId::new(2));
        assert_eq!(update.observations_appended, 7);
        assert_eq!(update.store_len, 7);
        assert!(update.failed_zones.is_empty());

        let snap = app.snapshot.read().await;
        assert_eq!(snap.current_tick, 1);
        assert_eq!(snap.last_update.as_ref(), Some(&update));
    }

    #[tokio::test]
    async fn selection_change_applies_next_cycle() {
        let (app, mut monitor) = setup();
        let mut rx = app.subscribe();
        let mut callback = ObserverCallback::new(Arc::clone(&app));

        let summary = run_cycle(&mut monitor).unwrap();
        callback.on_cycle(&summary, &monitor);
        assert_eq!(rx.recv().await.unwrap().zone, ZoneId::new(0));

        app.select_zone(ZoneId::new(6)).unwrap();
        let summary = run_cycle(&mut monitor).unwrap();
        callback.on_cycle(&summary, &monitor);
        assert_eq!(rx.recv().await.unwrap().zone, ZoneId::new(6));
    }
}
