//! REST API endpoint handlers for the Observer server.
//!
//! Zone data is read from the shared store on every request, so responses
//! always reflect the last completed cycle.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/catalog` | Zones, species with colors, variable ranges |
//! | `GET` | `/api/zones` | Zone list with selection flag |
//! | `GET` | `/api/zones/selected` | Currently selected zone |
//! | `PUT` | `/api/zones/selected` | Select a zone |
//! | `GET` | `/api/zones/{id}/observations` | Zone snapshot |
//! | `GET` | `/api/zones/{id}/latest` | Latest observation |
//! | `GET` | `/api/zones/{id}/indices` | Diversity index series |
//! | `GET` | `/api/zones/{id}/composition` | Latest species composition |
//! | `GET` | `/api/zones/{id}/environment` | Environmental variable series |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse};
use reefwatch_core::diversity::index_series;
use reefwatch_types::{Observation, ZoneId};

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / query structs
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/zones/{id}/observations`.
#[derive(Debug, serde::Deserialize)]
pub struct ObservationsQuery {
    /// Keep only the newest `limit` observations.
    pub limit: Option<usize>,
}

/// Request body for `PUT /api/zones/selected`.
#[derive(Debug, serde::Deserialize)]
pub struct SelectZoneRequest {
    /// Catalog position of the zone to select.
    pub zone_id: u32,
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing monitor status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await;
    let tick = snapshot.current_tick;
    let last_cycle = snapshot
        .last_cycle_at
        .map_or_else(|| "never".to_owned(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string());
    let indices = snapshot.last_update.as_ref().and_then(|u| u.latest_indices);
    drop(snapshot);

    let station = &state.station_name;
    let selected = state
        .catalog
        .zone(state.selected_zone())
        .map_or("none", |z| z.name.as_str());
    let store_len = state.store.len();
    let capacity = state.store.capacity();
    let zone_count = state.catalog.zones().len();
    let (simpson, shannon, pielou) = indices.map_or_else(
        || ("-".to_owned(), "-".to_owned(), "-".to_owned()),
        |i| {
            (
                format!("{:.3}", i.simpson),
                format!("{:.3}", i.shannon),
                format!("{:.3}", i.pielou),
            )
        },
    );

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>{station}</title>
    <style>
        body {{
            background: #0b1e2d;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #4fc3f7; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #102a3d;
            border: 1px solid #1f4760;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #4fc3f7; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #4fc3f7; text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        hr {{ border: none; border-top: 1px solid #1f4760; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>{station}</h1>
    <p class="subtitle">Real-time coastal biodiversity monitoring</p>

    <div>
        <div class="metric">
            <div class="label">Cycle</div>
            <div class="value">{tick}</div>
        </div>
        <div class="metric">
            <div class="label">Last cycle</div>
            <div class="value">{last_cycle}</div>
        </div>
        <div class="metric">
            <div class="label">Zones</div>
            <div class="value">{zone_count}</div>
        </div>
        <div class="metric">
            <div class="label">Observations</div>
            <div class="value">{store_len} / {capacity}</div>
        </div>
    </div>

    <h2>{selected}</h2>
    <div>
        <div class="metric">
            <div class="label">Simpson</div>
            <div class="value">{simpson}</div>
        </div>
        <div class="metric">
            <div class="label">Shannon</div>
            <div class="value">{shannon}</div>
        </div>
        <div class="metric">
            <div class="label">Pielou</div>
            <div class="value">{pielou}</div>
        </div>
    </div>

    <hr>

    <h2>API Endpoints</h2>
    <ul>
        <li><a href="/api/catalog">/api/catalog</a> -- Zones, species, variables</li>
        <li><a href="/api/zones">/api/zones</a> -- Zone list</li>
        <li><a href="/api/zones/selected">/api/zones/selected</a> -- Selected zone (PUT to change)</li>
        <li>/api/zones/{{id}}/observations -- Zone snapshot (?limit=N)</li>
        <li>/api/zones/{{id}}/latest -- Latest observation</li>
        <li>/api/zones/{{id}}/indices -- Simpson, Shannon, Pielou over time</li>
        <li>/api/zones/{{id}}/composition -- Latest species counts</li>
        <li>/api/zones/{{id}}/environment -- Environmental variables over time</li>
        <li><a href="/api/operator/status">/api/operator/status</a> -- Monitor status</li>
    </ul>

    <h2>WebSocket</h2>
    <ul>
        <li><code>ws://host:port/ws/updates</code> -- Live cycle updates</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /api/catalog
// ---------------------------------------------------------------------------

/// Return the zone, species, and environmental variable catalogs.
pub async fn get_catalog(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "zones": state.catalog.zones(),
        "species": state.catalog.species(),
        "environment": state.catalog.variables(),
    }))
}

// ---------------------------------------------------------------------------
// Zone selection
// ---------------------------------------------------------------------------

/// List zones with their selection flag and stored observation count.
pub async fn list_zones(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let selected = state.selected_zone();
    let zones = state
        .catalog
        .zones()
        .iter()
        .map(|zone| {
            Ok(serde_json::json!({
                "id": zone.id,
                "name": zone.name,
                "selected": zone.id == selected,
                "observations": state.store.count(zone.id)?,
            }))
        })
        .collect::<Result<Vec<serde_json::Value>, ObserverError>>()?;

    Ok(Json(serde_json::json!({
        "count": zones.len(),
        "selected": selected,
        "zones": zones,
    })))
}

/// Return the currently selected zone.
pub async fn get_selected_zone(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let zone = state.zone(state.selected_zone())?;
    Ok(Json(zone.clone()))
}

/// Change the selected zone. The next cycle presents the new zone.
pub async fn set_selected_zone(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SelectZoneRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let zone = state.select_zone(ZoneId::new(body.zone_id))?;
    tracing::info!(zone = %zone.id, zone_name = zone.name, "Zone selected");
    Ok(Json(zone.clone()))
}

// ---------------------------------------------------------------------------
// Per-zone data
// ---------------------------------------------------------------------------

/// Return the zone's stored observations in ascending timestamp order.
///
/// # Query Parameters
///
/// - `limit`: keep only the newest N observations.
pub async fn get_observations(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    Query(params): Query<ObservationsQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let zone = parse_zone(&state, &id_str)?;
    let mut observations = state.store.snapshot(zone)?;

    if let Some(limit) = params.limit {
        let excess = observations.len().saturating_sub(limit);
        observations.drain(..excess);
    }

    Ok(Json(serde_json::json!({
        "zone": zone,
        "count": observations.len(),
        "observations": observations,
    })))
}

/// Return the zone's most recent observation.
pub async fn get_latest(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let zone = parse_zone(&state, &id_str)?;
    let latest = state.store.latest(zone)?;
    Ok(Json(latest))
}

/// Return the zone's diversity index series.
///
/// Degenerate samples are omitted and counted in `skipped`.
pub async fn get_indices(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let zone = parse_zone(&state, &id_str)?;
    let snapshot = state.store.snapshot(zone)?;
    let series = index_series(&snapshot);

    Ok(Json(serde_json::json!({
        "zone": zone,
        "count": series.points.len(),
        "skipped": series.skipped,
        "latest": series.latest(),
        "points": series.points,
    })))
}

/// Return the latest observation's species counts labelled with names and
/// colors.
pub async fn get_composition(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let zone = parse_zone(&state, &id_str)?;
    let latest = state.store.latest(zone)?;
    let total = latest
        .species_counts
        .iter()
        .fold(0.0_f64, |acc, &count| acc + f64::from(count));

    let slices: Vec<serde_json::Value> = state
        .catalog
        .species()
        .iter()
        .zip(&latest.species_counts)
        .map(|(species, &count)| {
            let share = if total > 0.0 {
                f64::from(count) / total
            } else {
                0.0
            };
            serde_json::json!({
                "species": species.name,
                "color": species.color,
                "count": count,
                "share": share,
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "zone": zone,
        "timestamp": latest.timestamp,
        "total": latest.total_individuals(),
        "slices": slices,
    })))
}

/// Return one time series per environmental variable for the zone.
pub async fn get_environment(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let zone = parse_zone(&state, &id_str)?;
    let snapshot = state.store.snapshot(zone)?;

    let variables: Vec<serde_json::Value> = state
        .catalog
        .variables()
        .iter()
        .map(|variable| {
            serde_json::json!({
                "name": variable.name,
                "min": variable.min,
                "max": variable.max,
                "points": variable_series(&snapshot, &variable.name),
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "zone": zone,
        "count": snapshot.len(),
        "variables": variables,
    })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a zone identifier from a path segment and check it against the
/// catalog.
fn parse_zone(state: &AppState, s: &str) -> Result<ZoneId, ObserverError> {
    let position = s
        .parse::<u32>()
        .map_err(|e| ObserverError::InvalidRequest(format!("zone id {s}: {e}")))?;
    let zone = ZoneId::new(position);
    state.zone(zone)?;
    Ok(zone)
}

fn variable_series(observations: &[Observation], name: &str) -> Vec<serde_json::Value> {
    observations
        .iter()
        .filter_map(|o| {
            o.reading(name).map(|value| {
                serde_json::json!({
                    "timestamp": o.timestamp,
                    "value": value,
                })
            })
        })
        .collect()
}
