//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of startup and the monitor
//! loop so `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: reefwatch_core::config::ConfigError,
    },

    /// The configured catalog is invalid.
    #[error("catalog error: {source}")]
    Catalog {
        /// The underlying catalog error.
        #[from]
        source: reefwatch_core::catalog::CatalogError,
    },

    /// The observation store could not be created or written.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: reefwatch_core::store::StoreError,
    },

    /// The seed window could not be generated.
    #[error("seed error: {source}")]
    Seed {
        /// The underlying generation error.
        #[from]
        source: reefwatch_core::generator::GenerationError,
    },

    /// The monitor loop failed.
    #[error("scheduler error: {source}")]
    Scheduler {
        /// The underlying scheduler error.
        #[from]
        source: reefwatch_core::scheduler::SchedulerError,
    },

    /// Observer API server failed to start.
    #[error("observer error: {message}")]
    Observer {
        /// Description of the observer failure.
        message: String,
    },
}
