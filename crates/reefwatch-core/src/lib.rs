//! Monitoring core for the Reefwatch coastal monitor.
//!
//! This crate owns everything with computational content: it generates
//! simulated observations, keeps a bounded rolling window of them, derives
//! biodiversity indices from species counts, and drives the periodic
//! refresh cycle that feeds the presentation layer.
//!
//! # Modules
//!
//! - [`catalog`] -- Validated zone, species, and environmental variable
//!   registry.
//! - [`clock`] -- [`ObservationClock`] trait stamping each refresh cycle.
//! - [`config`] -- Configuration loading from `reefwatch-config.yaml`.
//! - [`diversity`] -- Simpson, Shannon, and Pielou indices.
//! - [`generator`] -- Simulated observation generation and backfill.
//! - [`operator`] -- Runtime controls (pause, resume, speed, stop).
//! - [`presentation`] -- [`PresentationAdapter`] boundary and the bridge
//!   that feeds it after every cycle.
//! - [`random`] -- [`RandomSource`] trait with seeded and scripted sources.
//! - [`scheduler`] -- Single refresh cycle and the monitor loop.
//! - [`store`] -- Bounded, time-ordered [`ObservationStore`].
//!
//! [`ObservationClock`]: clock::ObservationClock
//! [`PresentationAdapter`]: presentation::PresentationAdapter
//! [`RandomSource`]: random::RandomSource
//! [`ObservationStore`]: store::ObservationStore

pub mod catalog;
pub mod clock;
pub mod config;
pub mod diversity;
pub mod generator;
pub mod operator;
pub mod presentation;
pub mod random;
pub mod scheduler;
pub mod store;
