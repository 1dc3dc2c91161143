//! Bounded, time-ordered rolling store of observations.
//!
//! The store holds at most `capacity` observations. Appending past capacity
//! evicts the oldest observations first. Observations are always kept in
//! non-decreasing timestamp order; an observation older than the newest one
//! already stored is inserted after every observation with an equal or
//! earlier timestamp.
//!
//! # Concurrency
//!
//! The buffer sits behind a single [`RwLock`]. An append holds the write
//! guard for the whole batch, so readers see either none or all of it.
//! Snapshots and lookups take read guards and may run concurrently with
//! each other.

use std::collections::VecDeque;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use reefwatch_types::{Observation, ZoneId};

/// Errors returned by store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No observation has been recorded for the zone.
    #[error("no observations recorded for {zone}")]
    NotFound {
        /// The zone that was queried.
        zone: ZoneId,
    },

    /// A store must hold at least one observation.
    #[error("store capacity must be at least 1")]
    ZeroCapacity,

    /// A writer panicked while holding the lock.
    #[error("observation store lock poisoned")]
    LockPoisoned,
}

/// What a single append did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendReport {
    /// Observations added by this append.
    pub appended: usize,
    /// Observations evicted to get back under capacity.
    pub evicted: usize,
    /// Store size after the append.
    pub len: usize,
}

/// Fixed-capacity FIFO store of observations across all zones.
#[derive(Debug)]
pub struct ObservationStore {
    capacity: usize,
    buffer: RwLock<VecDeque<Observation>>,
}

impl ObservationStore {
    /// Create an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ZeroCapacity`] if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self, StoreError> {
        if capacity == 0 {
            return Err(StoreError::ZeroCapacity);
        }
        Ok(Self {
            capacity,
            buffer: RwLock::new(VecDeque::with_capacity(capacity)),
        })
    }

    /// Maximum number of observations held.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of observations. Returns 0 if the lock is poisoned.
    pub fn len(&self) -> usize {
        let Ok(buffer) = self.buffer.read() else {
            return 0;
        };
        buffer.len()
    }

    /// Whether the store holds no observations.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a batch of observations, then evict from the front until the
    /// store is back within capacity.
    ///
    /// The whole batch is applied under one write guard.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::LockPoisoned`] if the lock is poisoned.
    pub fn append(
        &self,
        observations: impl IntoIterator<Item = Observation>,
    ) -> Result<AppendReport, StoreError> {
        // Materialise the batch before taking the lock.
        let batch: Vec<Observation> = observations.into_iter().collect();
        let appended = batch.len();

        let mut buffer = self.buffer.write().map_err(|_err| StoreError::LockPoisoned)?;
        for observation in batch {
            insert_ordered(&mut buffer, observation);
        }
        let evicted = buffer.len().saturating_sub(self.capacity);
        buffer.drain(..evicted);

        Ok(AppendReport {
            appended,
            evicted,
            len: buffer.len(),
        })
    }

    /// All observations for `zone` in ascending timestamp order.
    ///
    /// Returns an empty vector for a zone with no data.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::LockPoisoned`] if the lock is poisoned.
    pub fn snapshot(&self, zone: ZoneId) -> Result<Vec<Observation>, StoreError> {
        let buffer = self.buffer.read().map_err(|_err| StoreError::LockPoisoned)?;
        Ok(buffer.iter().filter(|o| o.zone == zone).cloned().collect())
    }

    /// Number of stored observations for `zone`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::LockPoisoned`] if the lock is poisoned.
    pub fn count(&self, zone: ZoneId) -> Result<usize, StoreError> {
        let buffer = self.buffer.read().map_err(|_err| StoreError::LockPoisoned)?;
        Ok(buffer.iter().filter(|o| o.zone == zone).count())
    }

    /// The most recent observation for `zone`.
    ///
    /// Ties on timestamp resolve to the one appended last.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the zone has no observations, or
    /// [`StoreError::LockPoisoned`] if the lock is poisoned.
    pub fn latest(&self, zone: ZoneId) -> Result<Observation, StoreError> {
        let buffer = self.buffer.read().map_err(|_err| StoreError::LockPoisoned)?;
        buffer
            .iter()
            .rev()
            .find(|o| o.zone == zone)
            .cloned()
            .ok_or(StoreError::NotFound { zone })
    }

    /// Timestamp of the newest stored observation, if any.
    pub fn newest_timestamp(&self) -> Option<DateTime<Utc>> {
        let Ok(buffer) = self.buffer.read() else {
            return None;
        };
        buffer.back().map(|o| o.timestamp)
    }
}

/// Insert keeping timestamps non-decreasing; equal timestamps keep
/// insertion order.
fn insert_ordered(buffer: &mut VecDeque<Observation>, observation: Observation) {
    let in_order = buffer
        .back()
        .is_none_or(|last| last.timestamp <= observation.timestamp);
    if in_order {
        buffer.push_back(observation);
    } else {
        let position = buffer.partition_point(|o| o.timestamp <= observation.timestamp);
        buffer.insert(position, observation);
    }
}
