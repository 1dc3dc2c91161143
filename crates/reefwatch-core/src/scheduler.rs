//! Refresh cycle and monitor loop.
//!
//! [`run_cycle`] performs one refresh: read the clock once, generate one
//! observation per zone in catalog order, append the batch to the store.
//! [`run_monitor`] wraps it with the operator control plane:
//!
//! - **Bounds**: stop after `max_ticks` cycles or `max_real_time_seconds`
//! - **Pause/resume**: the loop waits between cycles while paused
//! - **Variable cadence**: the refresh interval is re-read every cycle
//! - **Stop**: operator or Ctrl-C stop exits before the next cycle
//!
//! After every cycle the [`CycleCallback`] runs to completion before the
//! next sleep, so cycle N+1 never starts while cycle N is being presented.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::clock::ObservationClock;
use crate::generator::{ObservationGenerator, ZoneFailure};
use crate::operator::{MonitorEndReason, OperatorState};
use crate::random::RandomSource;
use crate::store::{ObservationStore, StoreError};

/// Errors that abort the monitor loop.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The store rejected a batch.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },
}

/// Everything one refresh cycle reads or mutates.
///
/// Owned by the engine and passed to the loop by reference; the store is
/// shared with the observer through the [`Arc`].
pub struct MonitorState {
    /// Rolling observation store.
    pub store: Arc<ObservationStore>,
    /// Observation generator for the configured catalog.
    pub generator: ObservationGenerator,
    /// Source of cycle timestamps.
    pub clock: Box<dyn ObservationClock>,
    /// Source of simulated values.
    pub rng: Box<dyn RandomSource>,
    /// Cycles completed so far.
    pub tick: u64,
}

impl MonitorState {
    /// Assemble state for a fresh loop.
    pub fn new(
        store: Arc<ObservationStore>,
        generator: ObservationGenerator,
        clock: Box<dyn ObservationClock>,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            store,
            generator,
            clock,
            rng,
            tick: 0,
        }
    }
}

/// What one refresh cycle did.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleSummary {
    /// 1-based cycle number.
    pub tick: u64,
    /// Timestamp shared by every observation in the batch.
    pub timestamp: DateTime<Utc>,
    /// Observations appended.
    pub appended: usize,
    /// Observations evicted to stay within capacity.
    pub evicted: usize,
    /// Zones whose generation failed this cycle.
    pub failures: Vec<ZoneFailure>,
    /// Store size after the append.
    pub store_len: usize,
}

/// Result of a monitor run.
#[derive(Debug)]
pub struct MonitorResult {
    /// Why the loop ended.
    pub end_reason: MonitorEndReason,
    /// The last cycle summary, if any cycle completed.
    pub final_summary: Option<CycleSummary>,
    /// Total cycles executed.
    pub total_ticks: u64,
}

/// Callback invoked after each cycle.
///
/// Implementations push the new data to whatever is presenting it. The
/// loop does not continue until the callback returns.
pub trait CycleCallback: Send {
    /// Called after a cycle appended its batch.
    fn on_cycle(&mut self, summary: &CycleSummary, state: &MonitorState);
}

/// A callback that does nothing.
pub struct NoOpCallback;

impl CycleCallback for NoOpCallback {
    fn on_cycle(&mut self, _summary: &CycleSummary, _state: &MonitorState) {}
}

/// Execute one refresh cycle.
///
/// Zone failures are recorded in the summary and do not abort the cycle.
///
/// # Errors
///
/// Returns [`SchedulerError::Store`] if the batch cannot be appended.
pub fn run_cycle(state: &mut MonitorState) -> Result<CycleSummary, SchedulerError> {
    let timestamp = state.clock.now();
    let batch = state.generator.generate_batch(timestamp, state.rng.as_mut());
    let report = state.store.append(batch.observations)?;
    state.tick = state.tick.saturating_add(1);

    debug!(
        tick = state.tick,
        timestamp = %timestamp,
        appended = report.appended,
        evicted = report.evicted,
        failed_zones = batch.failures.len(),
        store_len = report.len,
        "Refresh cycle complete"
    );

    Ok(CycleSummary {
        tick: state.tick,
        timestamp,
        appended: report.appended,
        evicted: report.evicted,
        failures: batch.failures,
        store_len: report.len,
    })
}

/// Run refresh cycles until a termination condition is met.
///
/// Each iteration waits out a pause, checks the stop request and the time
/// limit, runs a cycle, notifies `callback`, checks the tick limit, then
/// sleeps for the current refresh interval.
///
/// # Errors
///
/// Returns [`SchedulerError`] if a cycle fails in a way that cannot be
/// reported per zone.
pub async fn run_monitor(
    state: &mut MonitorState,
    operator: &Arc<OperatorState>,
    callback: &mut dyn CycleCallback,
) -> Result<MonitorResult, SchedulerError> {
    let mut last_summary: Option<CycleSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        max_ticks = operator.max_ticks(),
        max_real_time_seconds = operator.max_real_time_seconds(),
        refresh_interval_ms = operator.refresh_interval_ms(),
        zones = state.generator.catalog().zones().len(),
        "Monitor starting"
    );

    loop {
        if operator.is_paused() {
            info!("Monitor paused, waiting for resume");
            operator.wait_if_paused().await;
            info!("Monitor resumed");
        }

        if operator.is_stop_requested() {
            info!("Operator stop requested");
            let reason = MonitorEndReason::OperatorStop;
            return Ok(finish(operator, reason, last_summary, total_ticks).await);
        }

        if operator.time_limit_reached() {
            info!(
                max_seconds = operator.max_real_time_seconds(),
                elapsed = operator.elapsed_seconds(),
                "Real-time limit reached"
            );
            let reason = MonitorEndReason::MaxRealTimeReached;
            return Ok(finish(operator, reason, last_summary, total_ticks).await);
        }

        let summary = run_cycle(state)?;
        total_ticks = total_ticks.saturating_add(1);

        callback.on_cycle(&summary, state);

        if operator.tick_limit_reached(total_ticks) {
            info!(
                tick = summary.tick,
                max_ticks = operator.max_ticks(),
                "Tick limit reached"
            );
            let reason = MonitorEndReason::MaxTicksReached;
            return Ok(finish(operator, reason, Some(summary), total_ticks).await);
        }

        last_summary = Some(summary);
        operator.sleep_interval().await;
    }
}

async fn finish(
    operator: &OperatorState,
    end_reason: MonitorEndReason,
    final_summary: Option<CycleSummary>,
    total_ticks: u64,
) -> MonitorResult {
    operator.set_end_reason(end_reason).await;
    MonitorResult {
        end_reason,
        final_summary,
        total_ticks,
    }
}

/// Log the end of a monitor run.
pub fn log_monitor_end(result: &MonitorResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        "Monitor ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            tick = summary.tick,
            timestamp = %summary.timestamp,
            store_len = summary.store_len,
            failed_zones = summary.failures.len(),
            "Final cycle summary"
        );
    } else {
        warn!("Monitor ended with no cycles executed");
    }
}
