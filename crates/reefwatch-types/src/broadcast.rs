//! Messages pushed to live dashboard clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::ZoneId;
use crate::observation::DiversityIndices;

/// Sent to every `WebSocket` client after each refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DataChangedBroadcast {
    /// Cycle number.
    pub tick: u64,
    /// Timestamp shared by the cycle's observations.
    pub timestamp: DateTime<Utc>,
    /// The zone selected when the cycle was presented.
    pub zone: ZoneId,
    /// Observations appended this cycle.
    #[ts(type = "number")]
    pub observations_appended: usize,
    /// Zones whose generation failed this cycle.
    pub failed_zones: Vec<ZoneId>,
    /// Store size after the cycle.
    #[ts(type = "number")]
    pub store_len: usize,
    /// Newest non-degenerate indices for the selected zone, if any.
    pub latest_indices: Option<DiversityIndices>,
}
