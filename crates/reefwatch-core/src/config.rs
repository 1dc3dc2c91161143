//! Configuration loading and typed config structures for the Reefwatch
//! monitor.
//!
//! The configuration lives in `reefwatch-config.yaml` in the working
//! directory. Every field has a default matching the reference deployment
//! (seven UAE coastal zones, ten species, nine environmental variables, a
//! one-year seed window and a three-second refresh), so an empty or missing
//! file yields a fully working monitor.

use std::path::Path;

use reefwatch_types::EnvironmentalVariable;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level monitor configuration.
///
/// Mirrors the structure of `reefwatch-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MonitorConfig {
    /// Station-level settings (name, seed, cadence, seed window).
    #[serde(default)]
    pub station: StationConfig,

    /// Zone, species, and environmental variable catalogs.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Rolling store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Run boundaries.
    #[serde(default)]
    pub bounds: BoundsConfig,

    /// Observer server settings.
    #[serde(default)]
    pub infrastructure: InfrastructureConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MonitorConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `REEFWATCH_OBSERVER_PORT` overrides `infrastructure.observer_port`
    /// - `REEFWATCH_SEED` overrides `station.seed`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// An empty document yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Override selected values with environment variables when set.
    ///
    /// Values that fail to parse are ignored and logged.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("REEFWATCH_OBSERVER_PORT") {
            match val.parse::<u16>() {
                Ok(port) => self.infrastructure.observer_port = port,
                Err(e) => tracing::warn!(value = val, error = %e, "ignoring REEFWATCH_OBSERVER_PORT"),
            }
        }
        if let Ok(val) = std::env::var("REEFWATCH_SEED") {
            match val.parse::<u64>() {
                Ok(seed) => self.station.seed = Some(seed),
                Err(e) => tracing::warn!(value = val, error = %e, "ignoring REEFWATCH_SEED"),
            }
        }
    }

    /// Effective store capacity.
    ///
    /// Uses `store.capacity` when set, otherwise `seed_days * zone_count`
    /// so the store holds exactly the seed window.
    pub fn store_capacity(&self) -> usize {
        self.store.capacity.unwrap_or_else(|| {
            usize::try_from(self.station.seed_days)
                .unwrap_or(usize::MAX)
                .saturating_mul(self.catalog.zones.len())
        })
    }
}

/// Station-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StationConfig {
    /// Human-readable station name shown on the status page.
    #[serde(default = "default_station_name")]
    pub name: String,

    /// Random seed for reproducible runs. `None` seeds from the OS.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Real-time milliseconds between refresh cycles.
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    /// Days of daily history generated per zone at startup.
    #[serde(default = "default_seed_days")]
    pub seed_days: u32,

    /// Inclusive upper bound of simulated per-species counts.
    #[serde(default = "default_max_species_count")]
    pub max_species_count: u32,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            name: default_station_name(),
            seed: None,
            refresh_interval_ms: default_refresh_interval_ms(),
            seed_days: default_seed_days(),
            max_species_count: default_max_species_count(),
        }
    }
}

/// Catalog configuration.
///
/// `species` and `species_colors` are parallel lists: the color at
/// position `i` belongs to the species at position `i`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogConfig {
    /// Ordered zone names.
    #[serde(default = "default_zones")]
    pub zones: Vec<String>,

    /// Ordered species names.
    #[serde(default = "default_species")]
    pub species: Vec<String>,

    /// Display colors, parallel to `species`.
    #[serde(default = "default_species_colors")]
    pub species_colors: Vec<String>,

    /// Environmental variables and their generation ranges.
    #[serde(default = "default_environment")]
    pub environment: Vec<EnvironmentalVariable>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            zones: default_zones(),
            species: default_species(),
            species_colors: default_species_colors(),
            environment: default_environment(),
        }
    }
}

/// Rolling store configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Fixed capacity override. Defaults to `seed_days * zone_count`.
    #[serde(default)]
    pub capacity: Option<usize>,
}

/// Run boundary configuration.
///
/// A value of 0 for either field means unlimited; the reference monitor
/// runs until the process is stopped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BoundsConfig {
    /// Maximum number of refresh cycles (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,

    /// Maximum wall-clock seconds (0 = unlimited).
    #[serde(default)]
    pub max_real_time_seconds: u64,
}

/// Observer server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InfrastructureConfig {
    /// Address the observer binds to.
    #[serde(default = "default_observer_host")]
    pub observer_host: String,

    /// Observer dashboard port.
    #[serde(default = "default_observer_port")]
    pub observer_port: u16,
}

impl Default for InfrastructureConfig {
    fn default() -> Self {
        Self {
            observer_host: default_observer_host(),
            observer_port: default_observer_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is not set (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_station_name() -> String {
    "UAE Coastal Biodiversity Monitor".to_owned()
}

const fn default_refresh_interval_ms() -> u64 {
    3_000
}

const fn default_seed_days() -> u32 {
    365
}

const fn default_max_species_count() -> u32 {
    100
}

fn default_zones() -> Vec<String> {
    [
        "Zone 1 - Abu Dhabi",
        "Zone 2 - Dubai",
        "Zone 3 - Sharjah",
        "Zone 4 - Ajman",
        "Zone 5 - Umm Al Quwain",
        "Zone 6 - Ras Al Khaimah",
        "Zone 7 - Fujairah",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}

fn default_species() -> Vec<String> {
    [
        "Atlantic Salmon",
        "Pacific Salmon",
        "Rainbow Trout",
        "Brook Trout",
        "Brown Trout",
        "Northern Pike",
        "Largemouth Bass",
        "Smallmouth Bass",
        "Walleye",
        "Bluegill",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}

fn default_species_colors() -> Vec<String> {
    [
        "#FF6347", "#FF4500", "#FFD700", "#ADFF2F", "#7FFF00", "#00FA9A", "#1E90FF", "#4682B4",
        "#6A5ACD", "#8A2BE2",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}

fn default_environment() -> Vec<EnvironmentalVariable> {
    [
        ("Temperature", 15.0, 35.0),
        ("Salinity", 30.0, 40.0),
        ("pH", 7.5, 8.5),
        ("O2 Dissolved", 5.0, 10.0),
        ("Turbidity", 1.0, 10.0),
        ("Chlorophyll-a", 0.1, 10.0),
        ("CDOM", 0.1, 5.0),
        ("Phycoreythrin", 0.1, 5.0),
        ("Uranine", 0.1, 5.0),
    ]
    .into_iter()
    .map(|(name, min, max)| EnvironmentalVariable {
        name: name.to_owned(),
        min,
        max,
    })
    .collect()
}

fn default_observer_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_observer_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}
