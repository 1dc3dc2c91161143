//! Observation records and derived diversity indices.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::ZoneId;

/// One timestamped record of species counts and environmental readings for
/// a zone.
///
/// `species_counts` is parallel to the species catalog; every catalog
/// variable has exactly one entry in `environmental_readings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Observation {
    /// When the observation was taken.
    pub timestamp: DateTime<Utc>,
    /// The zone observed.
    pub zone: ZoneId,
    /// Individuals counted per species, in catalog order.
    pub species_counts: Vec<u32>,
    /// Environmental readings keyed by variable name.
    pub environmental_readings: BTreeMap<String, f64>,
}

impl Observation {
    /// Return the reading for the named variable, if present.
    pub fn reading(&self, name: &str) -> Option<f64> {
        self.environmental_readings.get(name).copied()
    }

    /// Total number of individuals counted across all species.
    pub fn total_individuals(&self) -> u64 {
        self.species_counts
            .iter()
            .fold(0_u64, |acc, &count| acc.saturating_add(u64::from(count)))
    }
}

/// Biodiversity indices derived from one species-count vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DiversityIndices {
    /// Gini-Simpson index `1 - sum(p_i^2)`, in `[0, 1)`.
    pub simpson: f64,
    /// Shannon entropy `-sum(p_i ln p_i)`, at least 0.
    pub shannon: f64,
    /// Pielou evenness `shannon / ln(S)`, in `[0, 1]`.
    pub pielou: f64,
}

/// One point of a diversity-index time series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct IndexPoint {
    /// Timestamp of the source observation.
    pub timestamp: DateTime<Utc>,
    /// Indices computed from that observation's counts.
    pub indices: DiversityIndices,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Observation {
        let mut readings = BTreeMap::new();
        readings.insert("pH".to_owned(), 8.12);
        Observation {
            timestamp: Utc::now(),
            zone: ZoneId::new(1),
            species_counts: vec![10, 0, 32],
            environmental_readings: readings,
        }
    }

    #[test]
    fn total_individuals_sums_counts() {
        assert_eq!(sample().total_individuals(), 42);
    }

    #[test]
    fn reading_lookup_by_name() {
        let obs = sample();
        assert!(obs.reading("pH").is_some());
        assert!(obs.reading("Salinity").is_none());
    }

    #[test]
    fn observation_serializes_with_field_names() {
        let value = serde_json::to_value(sample()).ok();
        let value = value.unwrap_or_default();
        assert_eq!(value.get("zone").and_then(serde_json::Value::as_u64), Some(1));
        assert!(value.get("species_counts").is_some());
        assert!(value.get("environmental_readings").is_some());
    }
}
