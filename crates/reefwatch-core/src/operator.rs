//! Operator control state for the running monitor.
//!
//! Shared between the refresh loop and the observer's operator endpoints.
//! The operator can pause and resume the loop, change the refresh interval
//! and request a clean stop without restarting the process.
//!
//! # Architecture
//!
//! Control flags are atomics so the loop reads them without locking. Only
//! the end reason, written once when the loop exits, sits behind a mutex.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Notify};

use crate::config::BoundsConfig;

/// Smallest refresh interval the operator may set, in milliseconds.
pub const MIN_REFRESH_INTERVAL_MS: u64 = 100;

/// Why the monitor loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonitorEndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// Reached the configured `max_real_time_seconds` limit.
    MaxRealTimeReached,
    /// An operator (or Ctrl-C) requested a stop.
    OperatorStop,
}

/// Shared operator control state.
#[derive(Debug)]
pub struct OperatorState {
    /// Whether the loop is paused.
    paused: AtomicBool,

    /// Wakes the loop when resumed.
    resume_notify: Notify,

    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Wakes the loop out of its interval sleep on stop.
    stop_notify: Notify,

    /// Current refresh interval in milliseconds.
    refresh_interval_ms: AtomicU64,

    /// Wall-clock time the monitor started.
    started_at: DateTime<Utc>,

    /// Maximum number of ticks (0 = unlimited).
    max_ticks: u64,

    /// Maximum wall-clock seconds (0 = unlimited).
    max_real_time_seconds: u64,

    /// Reason the loop ended, once it has.
    end_reason: Mutex<Option<MonitorEndReason>>,
}

impl OperatorState {
    /// Create operator state from the configured interval and bounds.
    pub fn new(refresh_interval_ms: u64, bounds: &BoundsConfig) -> Self {
        Self {
            paused: AtomicBool::new(false),
            resume_notify: Notify::new(),
            stop_requested: AtomicBool::new(false),
            stop_notify: Notify::new(),
            refresh_interval_ms: AtomicU64::new(refresh_interval_ms.max(MIN_REFRESH_INTERVAL_MS)),
            started_at: Utc::now(),
            max_ticks: bounds.max_ticks,
            max_real_time_seconds: bounds.max_real_time_seconds,
            end_reason: Mutex::new(None),
        }
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Whether the loop is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause the loop. It finishes the current cycle, then waits.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Resume the loop.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Wait until the loop is no longer paused.
    ///
    /// Returns immediately when not paused, or once a stop is requested.
    pub async fn wait_if_paused(&self) {
        while self.is_paused() && !self.is_stop_requested() {
            tokio::select! {
                () = self.resume_notify.notified() => {}
                () = self.stop_notify.notified() => {}
            }
        }
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request a clean stop. The loop exits before its next cycle.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.stop_notify.notify_one();
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Sleep for the current refresh interval, waking early on stop.
    pub async fn sleep_interval(&self) {
        if self.is_stop_requested() {
            return;
        }
        let interval = std::time::Duration::from_millis(self.refresh_interval_ms());
        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            () = self.stop_notify.notified() => {}
        }
    }

    /// Record why the loop ended.
    pub async fn set_end_reason(&self, reason: MonitorEndReason) {
        let mut guard = self.end_reason.lock().await;
        *guard = Some(reason);
    }

    /// Why the loop ended, if it has.
    pub async fn end_reason(&self) -> Option<MonitorEndReason> {
        *self.end_reason.lock().await
    }

    // -----------------------------------------------------------------------
    // Refresh interval
    // -----------------------------------------------------------------------

    /// Current refresh interval in milliseconds.
    pub fn refresh_interval_ms(&self) -> u64 {
        self.refresh_interval_ms.load(Ordering::Acquire)
    }

    /// Set the refresh interval.
    ///
    /// Returns the previous interval, or `None` if `ms` is below
    /// [`MIN_REFRESH_INTERVAL_MS`] and was rejected.
    pub fn set_refresh_interval_ms(&self, ms: u64) -> Option<u64> {
        if ms < MIN_REFRESH_INTERVAL_MS {
            return None;
        }
        Some(self.refresh_interval_ms.swap(ms, Ordering::AcqRel))
    }

    // -----------------------------------------------------------------------
    // Boundaries
    // -----------------------------------------------------------------------

    /// Whether `completed_ticks` has reached a non-zero `max_ticks`.
    pub const fn tick_limit_reached(&self, completed_ticks: u64) -> bool {
        self.max_ticks > 0 && completed_ticks >= self.max_ticks
    }

    /// Whether a non-zero `max_real_time_seconds` has elapsed.
    pub fn time_limit_reached(&self) -> bool {
        self.max_real_time_seconds > 0 && self.elapsed_seconds() >= self.max_real_time_seconds
    }

    /// Wall-clock start time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Seconds elapsed since start.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        // Negative if the wall clock stepped backwards.
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }

    /// Configured max ticks.
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Configured max real-time seconds.
    pub const fn max_real_time_seconds(&self) -> u64 {
        self.max_real_time_seconds
    }
}

/// JSON-serializable status for the operator API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorStatus {
    /// Refresh cycles completed.
    pub tick: u64,
    /// Whether the loop is paused.
    pub paused: bool,
    /// Whether a stop has been requested.
    pub stop_requested: bool,
    /// Current refresh interval in milliseconds.
    pub refresh_interval_ms: u64,
    /// Seconds elapsed since start.
    pub elapsed_seconds: u64,
    /// Configured maximum ticks (0 = unlimited).
    pub max_ticks: u64,
    /// Configured maximum real-time seconds (0 = unlimited).
    pub max_real_time_seconds: u64,
    /// Observations currently held by the store.
    pub store_len: usize,
    /// Store capacity.
    pub store_capacity: usize,
    /// RFC 3339 timestamp of the newest stored observation, if any.
    pub newest_observation_at: Option<String>,
    /// Why the loop ended, if it has.
    pub end_reason: Option<MonitorEndReason>,
    /// RFC 3339 start time.
    pub started_at: String,
}
