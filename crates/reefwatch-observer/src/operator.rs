//! Operator REST API handlers for runtime monitor control.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/operator/pause` | Pause the refresh loop |
//! | `POST` | `/api/operator/resume` | Resume the refresh loop |
//! | `POST` | `/api/operator/speed` | Set refresh interval (ms) |
//! | `GET` | `/api/operator/status` | Current monitor status |
//! | `POST` | `/api/operator/stop` | Trigger clean shutdown |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use reefwatch_core::operator::{MIN_REFRESH_INTERVAL_MS, MonitorStatus, OperatorState};

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/operator/speed`.
#[derive(Debug, serde::Deserialize)]
pub struct SetSpeedRequest {
    /// New refresh interval in milliseconds (minimum 100).
    pub refresh_interval_ms: u64,
}

/// Generic success response.
#[derive(Debug, serde::Serialize)]
struct OperatorResponse {
    /// Whether the operation succeeded.
    ok: bool,
    /// Human-readable message.
    message: String,
}

fn operator(state: &AppState) -> Result<&Arc<OperatorState>, ObserverError> {
    state
        .operator_state
        .as_ref()
        .ok_or_else(|| ObserverError::Internal("operator state not available".to_owned()))
}

// ---------------------------------------------------------------------------
// POST /api/operator/pause
// ---------------------------------------------------------------------------

/// Pause the refresh loop. The store keeps its contents.
pub async fn pause(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    operator(&state)?.pause();

    Ok(Json(OperatorResponse {
        ok: true,
        message: "Monitor paused".to_owned(),
    }))
}

// ---------------------------------------------------------------------------
// POST /api/operator/resume
// ---------------------------------------------------------------------------

/// Resume the refresh loop after a pause.
pub async fn resume(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    operator(&state)?.resume();

    Ok(Json(OperatorResponse {
        ok: true,
        message: "Monitor resumed".to_owned(),
    }))
}

// ---------------------------------------------------------------------------
// POST /api/operator/speed
// ---------------------------------------------------------------------------

/// Change the refresh interval at runtime.
///
/// Takes effect at the next sleep.
pub async fn set_speed(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetSpeedRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    operator(&state)?
        .set_refresh_interval_ms(body.refresh_interval_ms)
        .map_or_else(
            || {
                Err(ObserverError::InvalidRequest(format!(
                    "refresh_interval_ms must be at least {MIN_REFRESH_INTERVAL_MS}"
                )))
            },
            |prev| {
                Ok(Json(serde_json::json!({
                    "ok": true,
                    "message": format!(
                        "Refresh interval changed from {}ms to {}ms",
                        prev, body.refresh_interval_ms
                    ),
                    "previous_interval_ms": prev,
                    "new_interval_ms": body.refresh_interval_ms,
                })))
            },
        )
}

// ---------------------------------------------------------------------------
// GET /api/operator/status
// ---------------------------------------------------------------------------

/// Return the current monitor status.
pub async fn status(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let operator = operator(&state)?;
    let tick = state.snapshot.read().await.current_tick;

    let status = MonitorStatus {
        tick,
        paused: operator.is_paused(),
        stop_requested: operator.is_stop_requested(),
        refresh_interval_ms: operator.refresh_interval_ms(),
        elapsed_seconds: operator.elapsed_seconds(),
        max_ticks: operator.max_ticks(),
        max_real_time_seconds: operator.max_real_time_seconds(),
        store_len: state.store.len(),
        store_capacity: state.store.capacity(),
        newest_observation_at: state.store.newest_timestamp().map(|ts| ts.to_rfc3339()),
        end_reason: operator.end_reason().await,
        started_at: operator.started_at().to_rfc3339(),
    };

    Ok(Json(status))
}

// ---------------------------------------------------------------------------
// POST /api/operator/stop
// ---------------------------------------------------------------------------

/// Request a clean stop.
///
/// The loop finishes its current cycle and exits. The HTTP server keeps
/// running so the store can still be queried.
pub async fn stop(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    operator(&state)?.request_stop();

    Ok(Json(OperatorResponse {
        ok: true,
        message: "Stop requested -- monitor will end after the current cycle".to_owned(),
    }))
}
