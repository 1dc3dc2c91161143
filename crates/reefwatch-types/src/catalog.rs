//! Catalog entries for the monitoring registry.
//!
//! The catalogs themselves are assembled and validated by
//! `reefwatch-core`; these are the plain records they hold.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::ZoneId;

/// A fixed coastal monitoring region.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Zone {
    /// Position of the zone in the zone catalog.
    pub id: ZoneId,
    /// Display name, e.g. `Zone 2 - Dubai`.
    pub name: String,
}

/// A monitored fish species and the color it is drawn with.
///
/// The species' position in the catalog is the index of its count in
/// every [`Observation::species_counts`](crate::Observation::species_counts).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Species {
    /// Common name.
    pub name: String,
    /// Display color as `#RRGGBB`.
    pub color: String,
}

/// A named environmental reading and the range it is generated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EnvironmentalVariable {
    /// Variable name, used as the key in
    /// [`Observation::environmental_readings`](crate::Observation::environmental_readings).
    pub name: String,
    /// Inclusive lower bound of generated values.
    pub min: f64,
    /// Inclusive upper bound of generated values.
    pub max: f64,
}

impl EnvironmentalVariable {
    /// Check whether `value` lies inside `[min, max]`.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}
