//! Simulated observation generation.
//!
//! Every observation draws one count per species uniformly from
//! `[0, max_species_count]` and one reading per environmental variable
//! uniformly from its configured range, rounded to two decimals. The
//! generator holds no mutable state; all randomness comes from the
//! [`RandomSource`] passed into each call.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use reefwatch_types::{Observation, ZoneId};
use tracing::warn;

use crate::catalog::Catalog;
use crate::random::{RandomError, RandomSource};

/// Errors that can occur while generating an observation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    /// The randomness source failed while generating for a zone.
    #[error("generation failed for {zone}: {source}")]
    Random {
        /// The zone being generated.
        zone: ZoneId,
        /// The underlying randomness error.
        source: RandomError,
    },

    /// The zone is not part of the catalog.
    #[error("unknown zone: {0}")]
    UnknownZone(ZoneId),

    /// The backfill window does not fit in the timestamp range.
    #[error("backfill window of {days} days is out of range")]
    WindowOutOfRange {
        /// Requested window length.
        days: u32,
    },
}

/// A single zone that failed within a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneFailure {
    /// The zone whose generation failed.
    pub zone: ZoneId,
    /// The batch timestamp.
    pub timestamp: DateTime<Utc>,
    /// Why it failed.
    pub error: GenerationError,
}

/// Result of generating a batch across zones.
///
/// Failures never abort the batch: every zone that succeeded is present in
/// `observations`, in catalog order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    /// Generated observations in zone order (and day order for backfills).
    pub observations: Vec<Observation>,
    /// Zones that could not be generated.
    pub failures: Vec<ZoneFailure>,
}

/// Produces simulated observations for the zones of a [`Catalog`].
#[derive(Debug, Clone)]
pub struct ObservationGenerator {
    catalog: Arc<Catalog>,
    max_species_count: u32,
}

impl ObservationGenerator {
    /// Create a generator drawing species counts from `[0, max_species_count]`.
    pub const fn new(catalog: Arc<Catalog>, max_species_count: u32) -> Self {
        Self {
            catalog,
            max_species_count,
        }
    }

    /// The catalog this generator draws from.
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Generate one observation for `zone` at `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::UnknownZone`] if the zone is not in the
    /// catalog, or [`GenerationError::Random`] if the source fails.
    pub fn generate(
        &self,
        zone: ZoneId,
        timestamp: DateTime<Utc>,
        rng: &mut dyn RandomSource,
    ) -> Result<Observation, GenerationError> {
        if self.catalog.zone(zone).is_none() {
            return Err(GenerationError::UnknownZone(zone));
        }
        let random = |source| GenerationError::Random { zone, source };

        let species_counts = self
            .catalog
            .species()
            .iter()
            .map(|_| rng.count(self.max_species_count))
            .collect::<Result<Vec<_>, _>>()
            .map_err(random)?;

        let mut environmental_readings = BTreeMap::new();
        for variable in self.catalog.variables() {
            let value = rng.uniform(variable.min, variable.max).map_err(random)?;
            environmental_readings.insert(variable.name.clone(), round_to_hundredths(value));
        }

        Ok(Observation {
            timestamp,
            zone,
            species_counts,
            environmental_readings,
        })
    }

    /// Generate one observation per catalog zone, in catalog order, all
    /// stamped with `timestamp`.
    pub fn generate_batch(
        &self,
        timestamp: DateTime<Utc>,
        rng: &mut dyn RandomSource,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for zone in self.catalog.zones() {
            match self.generate(zone.id, timestamp, rng) {
                Ok(observation) => outcome.observations.push(observation),
                Err(error) => {
                    warn!(zone = %zone.id, zone_name = zone.name, error = %error, "Zone generation failed");
                    outcome.failures.push(ZoneFailure {
                        zone: zone.id,
                        timestamp,
                        error,
                    });
                }
            }
        }
        outcome
    }

    /// Generate the historical seed window.
    ///
    /// Produces one batch per day for `days` days, starting `days` days
    /// before `now`, so the result holds `days * zone_count` observations
    /// in non-decreasing timestamp order.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::WindowOutOfRange`] if the window start
    /// cannot be represented.
    pub fn backfill(
        &self,
        days: u32,
        now: DateTime<Utc>,
        rng: &mut dyn RandomSource,
    ) -> Result<BatchOutcome, GenerationError> {
        let out_of_range = || GenerationError::WindowOutOfRange { days };
        let start = TimeDelta::try_days(i64::from(days))
            .and_then(|window| now.checked_sub_signed(window))
            .ok_or_else(out_of_range)?;

        let mut outcome = BatchOutcome::default();
        for day in 0..days {
            let timestamp = TimeDelta::try_days(i64::from(day))
                .and_then(|offset| start.checked_add_signed(offset))
                .ok_or_else(out_of_range)?;
            let batch = self.generate_batch(timestamp, rng);
            outcome.observations.extend(batch.observations);
            outcome.failures.extend(batch.failures);
        }
        Ok(outcome)
    }
}

/// Round to two decimal places.
fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use crate::config::CatalogConfig;
    use crate::random::{RngSource, SequenceSource};

    fn reference_generator() -> ObservationGenerator {
        let catalog = Catalog::from_config(&CatalogConfig::default()).unwrap();
        ObservationGenerator::new(Arc::new(catalog), 100)
    }

    fn has_at_most_two_decimals(value: f64) -> bool {
        ((value * 100.0).round() - value * 100.0).abs() < 1e-6
    }

    #[test]
    fn observation_matches_catalog_shape() {
        let generator = reference_generator();
        let mut rng = RngSource::seeded(42);
        let now = Utc::now();
        let obs = generator.generate(ZoneId::new(3), now, &mut rng).unwrap();

        assert_eq!(obs.zone, ZoneId::new(3));
        assert_eq!(obs.timestamp, now);
        assert_eq!(obs.species_counts.len(), 10);
        assert!(obs.species_counts.iter().all(|&c| c <= 100));
        assert_eq!(obs.environmental_readings.len(), 9);

        for variable in generator.catalog().variables() {
            let value = obs.reading(&variable.name).unwrap();
            assert!(variable.contains(value), "{} = {value}", variable.name);
            assert!(has_at_most_two_decimals(value), "{} = {value}", variable.name);
        }
    }

    #[test]
    fn same_seed_same_observation() {
        let generator = reference_generator();
        let now = Utc::now();
        let a = generator
            .generate(ZoneId::new(0), now, &mut RngSource::seeded(5))
            .unwrap();
        let b = generator
            .generate(ZoneId::new(0), now, &mut RngSource::seeded(5))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn scripted_values_flow_through() {
        let config = CatalogConfig {
            zones: vec!["Reef".to_owned()],
            species: vec!["Grouper".to_owned(), "Snapper".to_owned()],
            species_colors: vec!["#000000".to_owned(), "#FFFFFF".to_owned()],
            environment: vec![reefwatch_types::EnvironmentalVariable {
                name: "pH".to_owned(),
                min: 7.5,
                max: 8.5,
            }],
        };
        let generator = ObservationGenerator::new(Arc::new(Catalog::from_config(&config).unwrap()), 100);
        let mut rng = SequenceSource::new([12, 0], [8.126]);

        let obs = generator.generate(ZoneId::new(0), Utc::now(), &mut rng).unwrap();
        assert_eq!(obs.species_counts, vec![12, 0]);
        let ph = obs.reading("pH").unwrap();
        assert!((ph - 8.13).abs() < 1e-9);
    }

    #[test]
    fn unknown_zone_is_rejected() {
        let generator = reference_generator();
        let result = generator.generate(ZoneId::new(99), Utc::now(), &mut RngSource::seeded(1));
        assert_eq!(result, Err(GenerationError::UnknownZone(ZoneId::new(99))));
    }

    #[test]
    fn batch_covers_every_zone_in_order() {
        let generator = reference_generator();
        let now = Utc::now();
        let batch = generator.generate_batch(now, &mut RngSource::seeded(11));

        assert!(batch.failures.is_empty());
        let zones: Vec<u32> = batch.observations.iter().map(|o| o.zone.0).collect();
        assert_eq!(zones, vec![0, 1, 2, 3, 4, 5, 6]);
        assert!(batch.observations.iter().all(|o| o.timestamp == now));
    }

    #[test]
    fn batch_continues_past_a_failing_zone() {
        let generator = reference_generator();
        // Enough counts for all seven zones, but reals for only one zone:
        // zone 0 succeeds, zone 1 exhausts the reals, zones 2..7 keep
        // failing without aborting the batch.
        let mut rng = SequenceSource::new(vec![1; 70], vec![20.0; 9]);
        let batch = generator.generate_batch(Utc::now(), &mut rng);

        assert_eq!(batch.observations.len(), 1);
        assert_eq!(batch.failures.len(), 6);
        let failed: Vec<u32> = batch.failures.iter().map(|f| f.zone.0).collect();
        assert_eq!(failed, vec![1, 2, 3, 4, 5, 6]);
        assert!(matches!(
            batch.failures.first().map(|f| &f.error),
            Some(GenerationError::Random {
                source: RandomError::Exhausted,
                ..
            })
        ));
    }

    #[test]
    fn backfill_produces_ordered_daily_window() {
        let generator = reference_generator();
        let now = Utc::now();
        let outcome = generator.backfill(30, now, &mut RngSource::seeded(3)).unwrap();

        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.observations.len(), 30 * 7);
        assert!(
            outcome
                .observations
                .windows(2)
                .all(|pair| matches!(pair, [a, b] if a.timestamp <= b.timestamp))
        );

        let first = outcome.observations.first().unwrap();
        let last = outcome.observations.last().unwrap();
        assert_eq!(first.timestamp, now - TimeDelta::days(30));
        assert_eq!(last.timestamp, now - TimeDelta::days(1));
    }

    #[test]
    fn empty_backfill_window() {
        let generator = reference_generator();
        let outcome = generator.backfill(0, Utc::now(), &mut RngSource::seeded(3)).unwrap();
        assert!(outcome.observations.is_empty());
    }
}
