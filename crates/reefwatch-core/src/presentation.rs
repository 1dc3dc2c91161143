//! Boundary between the monitor loop and whatever renders its data.
//!
//! The loop never renders. After every cycle a [`PresentationBridge`]
//! asks its [`PresentationAdapter`] which zone is selected, snapshots that
//! zone, derives the index series and hands all three to the adapter.

use reefwatch_types::{Observation, Zone, ZoneId};
use tracing::{debug, warn};

use crate::diversity::{IndexSeries, index_series};
use crate::scheduler::{CycleCallback, CycleSummary, MonitorState};

/// A presentation layer fed with fresh zone data after every cycle.
pub trait PresentationAdapter: Send {
    /// The store changed; `snapshot` holds every stored observation for
    /// `zone` in timestamp order and `indices` its non-degenerate points.
    fn on_data_changed(&mut self, zone: &Zone, snapshot: &[Observation], indices: &IndexSeries);

    /// The zone the user is currently looking at.
    fn selected_zone(&self) -> ZoneId;
}

/// [`CycleCallback`] that forwards the selected zone to an adapter.
///
/// A cycle whose selected zone is unknown or has no data yet is skipped
/// without calling the adapter.
#[derive(Debug)]
pub struct PresentationBridge<A> {
    adapter: A,
}

impl<A: PresentationAdapter> PresentationBridge<A> {
    /// Wrap an adapter.
    pub const fn new(adapter: A) -> Self {
        Self { adapter }
    }

    /// The wrapped adapter.
    pub const fn adapter(&self) -> &A {
        &self.adapter
    }

    /// The wrapped adapter, mutably.
    pub const fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    /// Push the selected zone's current data to the adapter.
    ///
    /// Returns `true` if the adapter was called.
    pub fn refresh(&mut self, state: &MonitorState) -> bool {
        let zone_id = self.adapter.selected_zone();
        let Some(zone) = state.generator.catalog().zone(zone_id) else {
            warn!(zone = %zone_id, "Selected zone is not in the catalog, skipping render");
            return false;
        };

        let snapshot = match state.store.snapshot(zone_id) {
            Ok(snapshot) if snapshot.is_empty() => {
                debug!(zone = %zone_id, "Selected zone has no observations yet, skipping render");
                return false;
            }
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(zone = %zone_id, error = %error, "Snapshot failed, skipping render");
                return false;
            }
        };

        let indices = index_series(&snapshot);
        if indices.skipped > 0 {
            debug!(zone = %zone_id, skipped = indices.skipped, "Degenerate samples omitted from index series");
        }
        self.adapter.on_data_changed(zone, &snapshot, &indices);
        true
    }
}

impl<A: PresentationAdapter> CycleCallback for PresentationBridge<A> {
    fn on_cycle(&mut self, _summary: &CycleSummary, state: &MonitorState) {
        self.refresh(state);
    }
}
