//! Engine binary for the Reefwatch coastal monitor.
//!
//! Wires together configuration, the catalog, the rolling store, the
//! seed window, the observer API, and the refresh loop, then runs until a
//! bound is reached or a stop is requested.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `reefwatch-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Validate the catalog
//! 4. Create the random source and the rolling store
//! 5. Generate and store the seed window
//! 6. Create operator state from the run bounds
//! 7. Start the Observer API server
//! 8. Map Ctrl-C to a stop request
//! 9. Run the refresh loop
//! 10. Log the result

mod error;
mod observer_callback;

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use reefwatch_core::catalog::Catalog;
use reefwatch_core::clock::SystemClock;
use reefwatch_core::config::MonitorConfig;
use reefwatch_core::generator::ObservationGenerator;
use reefwatch_core::operator::OperatorState;
use reefwatch_core::random::{RandomSource, RngSource};
use reefwatch_core::scheduler::{self, MonitorState};
use reefwatch_core::store::ObservationStore;
use reefwatch_observer::server::ServerConfig;
use reefwatch_observer::state::AppState;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::observer_callback::ObserverCallback;

/// Path of the configuration file, relative to the working directory.
const CONFIG_PATH: &str = "reefwatch-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step or the refresh loop fails.
#[tokio::main]
#[allow(clippy::too_many_lines)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, config_found) = load_config()?;

    // 2. Initialize structured logging. RUST_LOG wins over the config.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("reefwatch-engine starting");
    if !config_found {
        info!(path = CONFIG_PATH, "Config file not found, using defaults");
    }
    info!(
        station = config.station.name,
        seed = config.station.seed,
        refresh_interval_ms = config.station.refresh_interval_ms,
        seed_days = config.station.seed_days,
        "Configuration loaded"
    );

    // 3. Validate the catalog.
    let catalog = Arc::new(Catalog::from_config(&config.catalog).map_err(EngineError::from)?);
    info!(
        zones = catalog.zones().len(),
        species = catalog.species_count(),
        variables = catalog.variables().len(),
        "Catalog validated"
    );

    // 4. Random source and rolling store.
    let mut rng: Box<dyn RandomSource> = match config.station.seed {
        Some(seed) => Box::new(RngSource::seeded(seed)),
        None => Box::new(RngSource::from_os()),
    };
    let store = Arc::new(ObservationStore::new(config.store_capacity()).map_err(EngineError::from)?);
    let generator = ObservationGenerator::new(Arc::clone(&catalog), config.station.max_species_count);

    // 5. Seed window.
    let seed = generator
        .backfill(config.station.seed_days, Utc::now(), rng.as_mut())
        .map_err(EngineError::from)?;
    let seed_failures = seed.failures.len();
    let report = store.append(seed.observations).map_err(EngineError::from)?;
    info!(
        days = config.station.seed_days,
        appended = report.appended,
        evicted = report.evicted,
        failed = seed_failures,
        capacity = store.capacity(),
        "Seed window stored"
    );
    if seed_failures > 0 {
        warn!(failed = seed_failures, "Seed window has missing zone-days");
    }

    // 6. Operator state.
    let operator = Arc::new(OperatorState::new(
        config.station.refresh_interval_ms,
        &config.bounds,
    ));
    info!(
        max_ticks = operator.max_ticks(),
        max_real_time_seconds = operator.max_real_time_seconds(),
        refresh_interval_ms = operator.refresh_interval_ms(),
        "Operator state initialized"
    );

    // 7. Observer API server.
    let app_state = Arc::new(
        AppState::new(config.station.name.clone(), Arc::clone(&store), Arc::clone(&catalog))
            .with_operator(Arc::clone(&operator)),
    );
    let server_config = ServerConfig::from(&config.infrastructure);
    let observer_handle = reefwatch_observer::startup::spawn_observer(server_config, Arc::clone(&app_state))
        .map_err(|e| EngineError::Observer {
            message: format!("{e}"),
        })?;

    // 8. Ctrl-C stops the loop after the current cycle.
    {
        let operator = Arc::clone(&operator);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl-C received, requesting stop");
                    operator.request_stop();
                }
                Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
            }
        });
    }

    // 9. Run the refresh loop.
    let mut monitor = MonitorState::new(store, generator, Box::new(SystemClock), rng);
    let mut callback = ObserverCallback::new(app_state);
    info!("Monitor state assembled, entering refresh loop");

    let result = scheduler::run_monitor(&mut monitor, &operator, &mut callback)
        .await
        .map_err(EngineError::from)?;

    // 10. Log results.
    scheduler::log_monitor_end(&result);
    observer_handle.abort();

    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        "reefwatch-engine shutdown complete"
    );

    Ok(())
}

/// Load the monitor configuration from [`CONFIG_PATH`].
///
/// Returns the defaults (with environment overrides) when the file does
/// not exist, along with whether the file was found.
fn load_config() -> Result<(MonitorConfig, bool), EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok((MonitorConfig::from_file(config_path)?, true))
    } else {
        let mut config = MonitorConfig::default();
        config.apply_env_overrides();
        Ok((config, false))
    }
}
