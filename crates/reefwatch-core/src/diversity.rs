//! Biodiversity indices from species counts.
//!
//! For a count vector of richness `S` and total `T`, with proportions
//! `p_i = count_i / T`:
//!
//! | Index | Formula | Range |
//! |-------|---------|-------|
//! | Simpson (Gini-Simpson) | `1 - sum(p_i^2)` | `[0, 1)` |
//! | Shannon | `-sum(p_i ln p_i)` over `p_i > 0` | `>= 0` |
//! | Pielou evenness | `shannon / ln(S)` | `[0, 1]` |
//!
//! A sample with `T == 0` or `S <= 1` has no defined indices and is
//! reported as [`DiversityError::DegenerateSample`]; no NaN or infinity is
//! ever returned.

use core::fmt;

use reefwatch_types::{DiversityIndices, IndexPoint, Observation};

/// Why a sample has no defined diversity indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateReason {
    /// Every count is zero, so proportions are undefined.
    ZeroTotal,
    /// Fewer than two species, so `ln(S) <= 0` and evenness is undefined.
    InsufficientRichness {
        /// Number of species in the sample.
        species: usize,
    },
}

impl fmt::Display for DegenerateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroTotal => write!(f, "all species counts are zero"),
            Self::InsufficientRichness { species } => {
                write!(f, "{species} species, at least 2 required")
            }
        }
    }
}

/// Errors from index computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DiversityError {
    /// The indices are undefined for this sample.
    #[error("degenerate sample: {reason}")]
    DegenerateSample {
        /// What made the sample degenerate.
        reason: DegenerateReason,
    },
}

/// Compute Simpson, Shannon, and Pielou indices for one count vector.
///
/// # Errors
///
/// Returns [`DiversityError::DegenerateSample`] when all counts are zero or
/// fewer than two species are present in the vector.
pub fn compute(counts: &[u32]) -> Result<DiversityIndices, DiversityError> {
    if counts.iter().all(|&count| count == 0) {
        return Err(DiversityError::DegenerateSample {
            reason: DegenerateReason::ZeroTotal,
        });
    }
    let richness = u32::try_from(counts.len()).unwrap_or(u32::MAX);
    if richness <= 1 {
        return Err(DiversityError::DegenerateSample {
            reason: DegenerateReason::InsufficientRichness {
                species: counts.len(),
            },
        });
    }

    let total = counts
        .iter()
        .fold(0.0_f64, |acc, &count| acc + f64::from(count));

    let (sum_of_squares, shannon) = counts
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| f64::from(count) / total)
        .fold((0.0_f64, 0.0_f64), |(squares, entropy), p| {
            (p.mul_add(p, squares), (-p).mul_add(p.ln(), entropy))
        });

    let simpson = (1.0 - sum_of_squares).max(0.0);
    let shannon = shannon.max(0.0);
    let pielou = (shannon / f64::from(richness).ln()).clamp(0.0, 1.0);

    Ok(DiversityIndices {
        simpson,
        shannon,
        pielou,
    })
}

/// An index time series for one zone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexSeries {
    /// One point per non-degenerate observation, in input order.
    pub points: Vec<IndexPoint>,
    /// Observations omitted because their sample was degenerate.
    pub skipped: usize,
}

impl IndexSeries {
    /// The most recent point, if any.
    pub fn latest(&self) -> Option<&IndexPoint> {
        self.points.last()
    }
}

/// Map a zone snapshot to its index series.
///
/// Degenerate observations are left out of the series rather than
/// replaced with a sentinel; `skipped` counts them.
pub fn index_series(observations: &[Observation]) -> IndexSeries {
    let mut series = IndexSeries {
        points: Vec::with_capacity(observations.len()),
        skipped: 0,
    };
    for observation in observations {
        match compute(&observation.species_counts) {
            Ok(indices) => series.points.push(IndexPoint {
                timestamp: observation.timestamp,
                indices,
            }),
            Err(DiversityError::DegenerateSample { .. }) => {
                series.skipped = series.skipped.saturating_add(1);
            }
        }
    }
    series
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{DateTime, Utc};
    use reefwatch_types::ZoneId;

    use super::*;
    use crate::random::{RandomSource, RngSource};

    const TOLERANCE: f64 = 1e-9;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn uniform_ten_species() {
        let indices = compute(&[10; 10]).unwrap();
        assert!(close(indices.simpson, 0.9), "{indices:?}");
        assert!(close(indices.shannon, 10_f64.ln()), "{indices:?}");
        assert!(close(indices.shannon, 2.302_585_093), "{indices:?}");
        assert!(close(indices.pielou, 1.0), "{indices:?}");
    }

    #[test]
    fn single_dominant_species() {
        let indices = compute(&[100, 0, 0, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        assert!(close(indices.simpson, 0.0));
        assert!(close(indices.shannon, 0.0));
        assert!(close(indices.pielou, 0.0));
    }

    #[test]
    fn all_equal_counts_reach_maximum_evenness() {
        for richness in 2..=25_usize {
            for value in [1_u32, 7, 100] {
                let counts = vec![value; richness];
                let indices = compute(&counts).unwrap();
                let expected = f64::from(u32::try_from(richness).unwrap()).ln();
                assert!(close(indices.shannon, expected), "S={richness} v={value}");
                assert!(close(indices.pielou, 1.0), "S={richness} v={value}");
            }
        }
    }

    #[test]
    fn all_zero_counts_are_degenerate() {
        assert_eq!(
            compute(&[0, 0, 0]),
            Err(DiversityError::DegenerateSample {
                reason: DegenerateReason::ZeroTotal,
            })
        );
        assert!(compute(&[]).is_err());
    }

    #[test]
    fn single_species_is_degenerate() {
        assert_eq!(
            compute(&[42]),
            Err(DiversityError::DegenerateSample {
                reason: DegenerateReason::InsufficientRichness { species: 1 },
            })
        );
    }

    #[test]
    fn random_samples_stay_in_range() {
        let mut rng = RngSource::seeded(2024);
        let mut checked = 0;
        for _ in 0..2_000 {
            let richness = 2 + rng.count(14).unwrap();
            let counts: Vec<u32> = (0..richness).map(|_| rng.count(100).unwrap()).collect();
            let Ok(indices) = compute(&counts) else {
                assert!(counts.iter().all(|&c| c == 0));
                continue;
            };
            assert!((0.0..1.0).contains(&indices.simpson), "{counts:?} {indices:?}");
            assert!(indices.shannon >= 0.0, "{counts:?} {indices:?}");
            assert!((0.0..=1.0).contains(&indices.pielou), "{counts:?} {indices:?}");
            assert!(indices.simpson.is_finite() && indices.shannon.is_finite());
            checked += 1;
        }
        assert!(checked > 1_900);
    }

    #[test]
    fn series_omits_degenerate_points() {
        let at = |secs: i64| DateTime::<Utc>::from_timestamp(secs, 0).unwrap();
        let make = |secs: i64, counts: Vec<u32>| Observation {
            timestamp: at(secs),
            zone: ZoneId::new(0),
            species_counts: counts,
            environmental_readings: BTreeMap::new(),
        };
        let observations = vec![
            make(1, vec![5, 5]),
            make(2, vec![0, 0]),
            make(3, vec![9, 1]),
        ];

        let series = index_series(&observations);
        assert_eq!(series.skipped, 1);
        let stamps: Vec<_> = series.points.iter().map(|p| p.timestamp).collect();
        assert_eq!(stamps, vec![at(1), at(3)]);
        assert_eq!(series.latest().map(|p| p.timestamp), Some(at(3)));
    }
}
