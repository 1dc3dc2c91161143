//! Shared type definitions for the Reefwatch coastal monitor.
//!
//! This crate is the single source of truth for the data model shared by
//! the monitoring core, the observer API, and the dashboard. Types defined
//! here flow downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Catalog-position identifiers (zones)
//! - [`catalog`] -- Catalog entries: zones, species, environmental variables
//! - [`observation`] -- Observation records and derived diversity indices
//! - [`broadcast`] -- Live update messages for dashboard clients

pub mod broadcast;
pub mod catalog;
pub mod ids;
pub mod observation;

// Re-export all public types at crate root for convenience.
pub use broadcast::DataChangedBroadcast;
pub use catalog::{EnvironmentalVariable, Species, Zone};
pub use ids::ZoneId;
pub use observation::{DiversityIndices, IndexPoint, Observation};

#[cfg(test)]
mod tests {
    //! Type export checks and `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Files are written to `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::ZoneId::export_all();
        let _ = crate::catalog::Zone::export_all();
        let _ = crate::catalog::Species::export_all();
        let _ = crate::catalog::EnvironmentalVariable::export_all();
        let _ = crate::observation::Observation::export_all();
        let _ = crate::observation::DiversityIndices::export_all();
        let _ = crate::observation::IndexPoint::export_all();
        let _ = crate::broadcast::DataChangedBroadcast::export_all();
    }
}
