//! Integration tests for the Observer API endpoints.
//!
//! Tests drive the Axum `Router` directly via `tower::ServiceExt` without
//! starting a TCP server.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, TimeDelta, Utc};
use reefwatch_core::catalog::Catalog;
use reefwatch_core::config::{BoundsConfig, CatalogConfig};
use reefwatch_core::operator::OperatorState;
use reefwatch_core::store::ObservationStore;
use reefwatch_observer::router::build_router;
use reefwatch_observer::state::{AppState, DataChangedBroadcast};
use reefwatch_types::{Observation, ZoneId};
use serde_json::Value;
use tower::ServiceExt;

fn base_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

fn observation(zone: u32, minutes: i64, counts: Vec<u32>) -> Observation {
    let mut readings = BTreeMap::new();
    readings.insert("Temperature".to_owned(), 25.5);
    readings.insert("pH".to_owned(), 8.1);
    Observation {
        timestamp: base_time() + TimeDelta::minutes(minutes),
        zone: ZoneId::new(zone),
        species_counts: counts,
        environmental_readings: readings,
    }
}

fn uniform_counts(value: u32) -> Vec<u32> {
    vec![value; 10]
}

fn make_test_state() -> Arc<AppState> {
    let catalog = Arc::new(Catalog::from_config(&CatalogConfig::default()).unwrap());
    let store = Arc::new(ObservationStore::new(100).unwrap());
    store
        .append([
            observation(0, 0, uniform_counts(10)),
            observation(1, 0, uniform_counts(3)),
            observation(0, 1, vec![0; 10]),
            observation(0, 2, vec![30, 10, 0, 0, 0, 0, 0, 0, 0, 0]),
        ])
        .unwrap();

    let operator = Arc::new(OperatorState::new(3000, &BoundsConfig::default()));
    Arc::new(AppState::new("Test Station", store, catalog).with_operator(operator))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(state: Arc<AppState>, path: &str) -> (StatusCode, Value) {
    let response = build_router(state)
        .oneshot(Request::get(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn send_json(state: Arc<AppState>, method: &str, path: &str, body: &str) -> (StatusCode, Value) {
    let response = build_router(state)
        .oneshot(
            Request::builder()
                .method(method)
                .uri(path)
                .header("content-type", "application/json")
                .body(Body::from(body.to_owned()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// =========================================================================
// Status page and catalog
// =========================================================================

#[tokio::test]
async fn test_index_returns_html() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("text/html"));
}

#[tokio::test]
async fn test_catalog() {
    let (status, json) = get(make_test_state(), "/api/catalog").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["zones"].as_array().unwrap().len(), 7);
    assert_eq!(json["zones"][1]["name"], "Zone 2 - Dubai");
    assert_eq!(json["species"].as_array().unwrap().len(), 10);
    assert!(json["species"][0]["color"].as_str().unwrap().starts_with('#'));
    assert_eq!(json["environment"].as_array().unwrap().len(), 9);
}

// =========================================================================
// Zone selection
// =========================================================================

#[tokio::test]
async fn test_list_zones_marks_selection() {
    let (status, json) = get(make_test_state(), "/api/zones").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 7);
    assert_eq!(json["selected"], 0);
    assert_eq!(json["zones"][0]["selected"], true);
    assert_eq!(json["zones"][0]["observations"], 3);
    assert_eq!(json["zones"][1]["selected"], false);
    assert_eq!(json["zones"][1]["observations"], 1);
    assert_eq!(json["zones"][6]["observations"], 0);
}

#[tokio::test]
async fn test_select_zone() {
    let state = make_test_state();

    let (status, json) = send_json(Arc::clone(&state), "PUT", "/api/zones/selected", r#"{"zone_id": 4}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Zone 5 - Umm Al Quwain");
    assert_eq!(state.selected_zone(), ZoneId::new(4));

    let (status, json) = get(state, "/api/zones/selected").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], 4);
}

#[tokio::test]
async fn test_select_unknown_zone_is_404() {
    let state = make_test_state();
    let (status, json) = send_json(Arc::clone(&state), "PUT", "/api/zones/selected", r#"{"zone_id": 99}"#).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], 404);
    assert_eq!(state.selected_zone(), ZoneId::new(0));
}

// =========================================================================
// Per-zone data
// =========================================================================

#[tokio::test]
async fn test_observations_in_order() {
    let (status, json) = get(make_test_state(), "/api/zones/0/observations").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 3);
    let observations = json["observations"].as_array().unwrap();
    assert!(observations.iter().all(|o| o["zone"] == 0));
    assert_eq!(observations[0]["species_counts"][0], 10);
}

#[tokio::test]
async fn test_observations_limit_keeps_newest() {
    let (status, json) = get(make_test_state(), "/api/zones/0/observations?limit=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 1);
    assert_eq!(json["observations"][0]["species_counts"][0], 30);
}

#[tokio::test]
async fn test_latest() {
    let (status, json) = get(make_test_state(), "/api/zones/1/latest").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["zone"], 1);
    assert_eq!(json["species_counts"][0], 3);
}

#[tokio::test]
async fn test_latest_without_data_is_404() {
    let (status, json) = get(make_test_state(), "/api/zones/6/latest").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], 404);
}

#[tokio::test]
async fn test_unknown_zone_is_404() {
    let (status, _) = get(make_test_state(), "/api/zones/42/observations").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_zone_id_is_400() {
    let (status, json) = get(make_test_state(), "/api/zones/abc/indices").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn test_indices_skip_degenerate_samples() {
    let (status, json) = get(make_test_state(), "/api/zones/0/indices").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 2);
    assert_eq!(json["skipped"], 1);

    let first = &json["points"][0]["indices"];
    assert!((first["simpson"].as_f64().unwrap() - 0.9).abs() < 1e-9);
    assert!((first["pielou"].as_f64().unwrap() - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_composition_labels_species() {
    let (status, json) = get(make_test_state(), "/api/zones/0/composition").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 40);

    let slices = json["slices"].as_array().unwrap();
    assert_eq!(slices.len(), 10);
    assert_eq!(slices[0]["species"], "Atlantic Salmon");
    assert_eq!(slices[0]["count"], 30);
    assert!((slices[0]["share"].as_f64().unwrap() - 0.75).abs() < 1e-9);
}

#[tokio::test]
async fn test_environment_series() {
    let (status, json) = get(make_test_state(), "/api/zones/0/environment").await;
    assert_eq!(status, StatusCode::OK);
    let variables = json["variables"].as_array().unwrap();
    assert_eq!(variables.len(), 9);

    let ph = variables.iter().find(|v| v["name"] == "pH").unwrap();
    assert_eq!(ph["points"].as_array().unwrap().len(), 3);
    let salinity = variables.iter().find(|v| v["name"] == "Salinity").unwrap();
    assert!(salinity["points"].as_array().unwrap().is_empty());
}

// =========================================================================
// Operator API
// =========================================================================

#[tokio::test]
async fn test_operator_pause_resume_stop() {
    let state = make_test_state();
    let operator = Arc::clone(state.operator_state.as_ref().unwrap());

    let (status, _) = send_json(Arc::clone(&state), "POST", "/api/operator/pause", "").await;
    assert_eq!(status, StatusCode::OK);
    assert!(operator.is_paused());

    let (status, _) = send_json(Arc::clone(&state), "POST", "/api/operator/resume", "").await;
    assert_eq!(status, StatusCode::OK);
    assert!(!operator.is_paused());

    let (status, _) = send_json(state, "POST", "/api/operator/stop", "").await;
    assert_eq!(status, StatusCode::OK);
    assert!(operator.is_stop_requested());
}

#[tokio::test]
async fn test_operator_speed() {
    let state = make_test_state();
    let (status, json) = send_json(
        Arc::clone(&state),
        "POST",
        "/api/operator/speed",
        r#"{"refresh_interval_ms": 500}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["previous_interval_ms"], 3000);

    let (status, json) = send_json(state, "POST", "/api/operator/speed", r#"{"refresh_interval_ms": 5}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn test_operator_status() {
    let (status, json) = get(make_test_state(), "/api/operator/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["paused"], false);
    assert_eq!(json["refresh_interval_ms"], 3000);
    assert_eq!(json["store_len"], 4);
    assert_eq!(json["store_capacity"], 100);
    assert_eq!(json["newest_observation_at"], "2023-11-14T22:15:20+00:00");
    assert!(json["end_reason"].is_null());
}

#[tokio::test]
async fn test_operator_status_empty_store() {
    let catalog = Arc::new(Catalog::from_config(&CatalogConfig::default()).unwrap());
    let store = Arc::new(ObservationStore::new(10).unwrap());
    let operator = Arc::new(OperatorState::new(3000, &BoundsConfig::default()));
    let state = Arc::new(AppState::new("Empty", store, catalog).with_operator(operator));

    let (status, json) = get(state, "/api/operator/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["store_len"], 0);
    assert!(json["newest_observation_at"].is_null());
}

#[tokio::test]
async fn test_operator_without_state_is_500() {
    let catalog = Arc::new(Catalog::from_config(&CatalogConfig::default()).unwrap());
    let store = Arc::new(ObservationStore::new(10).unwrap());
    let state = Arc::new(AppState::new("Bare", store, catalog));
    let (status, _) = get(state, "/api/operator/status").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

// =========================================================================
// Broadcast and routing
// =========================================================================

#[tokio::test]
async fn test_broadcast_channel() {
    let state = make_test_state();
    let mut rx = state.subscribe();

    let update = DataChangedBroadcast {
        tick: 7,
        timestamp: base_time(),
        zone: ZoneId::new(0),
        observations_appended: 7,
        failed_zones: vec![ZoneId::new(3)],
        store_len: 14,
        latest_indices: None,
    };
    assert_eq!(state.broadcast(&update), 1);

    let received = rx.recv().await.unwrap();
    assert_eq!(received, update);
    let json = serde_json::to_value(&received).unwrap();
    assert_eq!(json["failed_zones"][0], 3);
}

#[tokio::test]
async fn test_nonexistent_route_returns_404() {
    let router = build_router(make_test_state());
    let response = router
        .oneshot(Request::get("/api/nonexistent").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
