//! Validated zone, species, and environmental variable registry.
//!
//! A [`Catalog`] is built once at startup from [`CatalogConfig`] and is
//! immutable afterwards. Every misconfiguration is reported as a
//! [`CatalogError`] before the scheduler starts; generation never has to
//! re-check the catalog.

use std::collections::BTreeSet;

use reefwatch_types::{EnvironmentalVariable, Species, Zone, ZoneId};

use crate::config::CatalogConfig;

/// Configuration errors detected while building the catalog.
///
/// All variants are fatal: the monitor refuses to start.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    /// No zones were configured.
    #[error("zone catalog is empty")]
    EmptyZones,

    /// No species were configured.
    #[error("species catalog is empty")]
    EmptySpecies,

    /// No environmental variables were configured.
    #[error("environmental variable catalog is empty")]
    EmptyEnvironment,

    /// The species and color lists have different lengths.
    #[error("species catalog has {species} entries but {colors} colors")]
    ColorCountMismatch {
        /// Number of species names.
        species: usize,
        /// Number of colors.
        colors: usize,
    },

    /// A name appears more than once within one catalog.
    #[error("duplicate {kind} name: {name}")]
    DuplicateName {
        /// Which catalog the duplicate was found in.
        kind: &'static str,
        /// The repeated name.
        name: String,
    },

    /// A species color is not a `#RRGGBB` hex string.
    #[error("invalid color {color:?} for species {species}")]
    InvalidColor {
        /// The species the color belongs to.
        species: String,
        /// The rejected color string.
        color: String,
    },

    /// A variable range is non-finite or inverted.
    #[error("invalid range [{min}, {max}] for variable {variable}")]
    InvalidRange {
        /// The variable name.
        variable: String,
        /// Configured lower bound.
        min: f64,
        /// Configured upper bound.
        max: f64,
    },

    /// More zones than a [`ZoneId`] can address.
    #[error("too many zones: {count}")]
    TooManyZones {
        /// Number of configured zones.
        count: usize,
    },
}

/// Immutable registry of zones, species, and environmental variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    zones: Vec<Zone>,
    species: Vec<Species>,
    variables: Vec<EnvironmentalVariable>,
}

impl Catalog {
    /// Build and validate a catalog from configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] describing the first misconfiguration
    /// found.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        if config.zones.is_empty() {
            return Err(CatalogError::EmptyZones);
        }
        if config.species.is_empty() {
            return Err(CatalogError::EmptySpecies);
        }
        if config.environment.is_empty() {
            return Err(CatalogError::EmptyEnvironment);
        }
        if config.species.len() != config.species_colors.len() {
            return Err(CatalogError::ColorCountMismatch {
                species: config.species.len(),
                colors: config.species_colors.len(),
            });
        }

        ensure_unique("zone", config.zones.iter().map(String::as_str))?;
        ensure_unique("species", config.species.iter().map(String::as_str))?;
        ensure_unique(
            "environmental variable",
            config.environment.iter().map(|v| v.name.as_str()),
        )?;

        let zones = config
            .zones
            .iter()
            .enumerate()
            .map(|(position, name)| {
                let id = u32::try_from(position).map_err(|_err| CatalogError::TooManyZones {
                    count: config.zones.len(),
                })?;
                Ok(Zone {
                    id: ZoneId::new(id),
                    name: name.clone(),
                })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;

        let species = config
            .species
            .iter()
            .zip(&config.species_colors)
            .map(|(name, color)| {
                if is_hex_color(color) {
                    Ok(Species {
                        name: name.clone(),
                        color: color.clone(),
                    })
                } else {
                    Err(CatalogError::InvalidColor {
                        species: name.clone(),
                        color: color.clone(),
                    })
                }
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;

        for variable in &config.environment {
            if !variable.min.is_finite() || !variable.max.is_finite() || variable.min > variable.max
            {
                return Err(CatalogError::InvalidRange {
                    variable: variable.name.clone(),
                    min: variable.min,
                    max: variable.max,
                });
            }
        }

        Ok(Self {
            zones,
            species,
            variables: config.environment.clone(),
        })
    }

    /// All zones in catalog order.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Look up a zone by identifier.
    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        id.index().and_then(|index| self.zones.get(index))
    }

    /// All species in catalog order.
    pub fn species(&self) -> &[Species] {
        &self.species
    }

    /// Number of species, i.e. the length of every count vector.
    pub fn species_count(&self) -> usize {
        self.species.len()
    }

    /// All environmental variables in catalog order.
    pub fn variables(&self) -> &[EnvironmentalVariable] {
        &self.variables
    }
}

/// Reject the first name that appears twice.
fn ensure_unique<'a>(
    kind: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), CatalogError> {
    let mut seen = BTreeSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(CatalogError::DuplicateName {
                kind,
                name: name.to_owned(),
            });
        }
    }
    Ok(())
}

fn is_hex_color(color: &str) -> bool {
    color
        .strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
