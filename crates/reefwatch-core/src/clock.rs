//! Observation clocks.
//!
//! The scheduler stamps every batch with a single timestamp taken from an
//! [`ObservationClock`] at the start of the cycle. Production uses
//! [`SystemClock`]; tests use [`SteppingClock`] so ticks have predictable,
//! strictly increasing timestamps.

use chrono::{DateTime, TimeDelta, Utc};

/// A source of cycle timestamps.
pub trait ObservationClock: Send {
    /// Return the timestamp for the next cycle.
    fn now(&mut self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ObservationClock for SystemClock {
    fn now(&mut self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that starts at a fixed instant and advances by a fixed step on
/// every reading.
///
/// If advancing would leave the representable range, the clock stays at
/// its last value.
#[derive(Debug, Clone)]
pub struct SteppingClock {
    next: DateTime<Utc>,
    step: TimeDelta,
}

impl SteppingClock {
    /// Create a clock whose first reading is `start`.
    pub const fn new(start: DateTime<Utc>, step: TimeDelta) -> Self {
        Self { next: start, step }
    }
}

impl ObservationClock for SteppingClock {
    fn now(&mut self) -> DateTime<Utc> {
        let current = self.next;
        if let Some(advanced) = current.checked_add_signed(self.step) {
            self.next = advanced;
        }
        current
    }
}
