//! Catalog-position identifiers.
//!
//! Zones are drawn from a fixed ordered catalog that never changes for the
//! lifetime of the process, so a zone is identified by its position in that
//! catalog rather than by a generated UUID.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Identifier of a monitoring zone: its zero-based position in the zone
/// catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ZoneId(pub u32);

impl ZoneId {
    /// Create an identifier from a catalog position.
    pub const fn new(position: u32) -> Self {
        Self(position)
    }

    /// Return the catalog position as a `usize` suitable for slice lookups.
    ///
    /// Returns `None` on targets where `u32` does not fit in `usize`.
    pub fn index(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }

    /// Return the raw position value.
    pub const fn into_inner(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "zone#{}", self.0)
    }
}

impl From<u32> for ZoneId {
    fn from(position: u32) -> Self {
        Self(position)
    }
}

impl From<ZoneId> for u32 {
    fn from(id: ZoneId) -> Self {
        id.0
    }
}
