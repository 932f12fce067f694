//! HTTP API backing the dashboard UI
//!
//! JSON query surface over the telemetry engine, view-mode and control
//! commands, plus liveness and Prometheus metrics endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use telemetry_lib::{
    EngineError, MetricKind, SharedSystemState, TelemetryEngine, TimeRange, ViewMode,
};
use tokio::sync::RwLock;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RwLock<TelemetryEngine>>,
    pub system: SharedSystemState,
}

impl AppState {
    pub fn new(engine: Arc<RwLock<TelemetryEngine>>, system: SharedSystemState) -> Self {
        Self { engine, system }
    }
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    start: Option<i64>,
    end: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TaskQuery {
    filter: Option<String>,
}

/// View-state mutations; absent fields are left untouched
#[derive(Debug, Deserialize)]
struct ViewRequest {
    mode: Option<ViewMode>,
    lookback_minutes: Option<u64>,
    /// Empty string clears the selection
    selected_server: Option<String>,
    time_range: Option<TimeRange>,
    #[serde(default)]
    clear_time_range: bool,
    playback_index: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ViewResponse {
    mode: ViewMode,
    selected_server: Option<String>,
    time_range: Option<TimeRange>,
    playback_index: usize,
}

#[derive(Debug, Deserialize)]
struct SnapshotRequest {
    lookback_minutes: u64,
}

#[derive(Debug, Deserialize)]
struct ControlRequest {
    running: Option<bool>,
    selected_metric: Option<MetricKind>,
}

async fn servers(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.engine.read().await.servers())
}

async fn server_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse {
    let range = match (query.start, query.end) {
        (Some(start), Some(end)) => Some(TimeRange { start, end }),
        _ => None,
    };
    Json(state.engine.read().await.server_history(&id, range))
}

async fn aggregated_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.engine.read().await.aggregated_metrics())
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.engine.read().await.health_status())
}

async fn load_balance(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.engine.read().await.load_balance_status())
}

async fn tasks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TaskQuery>,
) -> impl IntoResponse {
    Json(state.engine.read().await.tasks(query.filter.as_deref()))
}

async fn alerts(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.engine.read().await.alerts())
}

async fn timeseries(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.engine.read().await.filtered_time_series())
}

async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.engine.read().await.update_status())
}

fn unprocessable(err: EngineError) -> (StatusCode, String) {
    (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
}

fn view_response(engine: &TelemetryEngine) -> ViewResponse {
    let view = engine.view();
    ViewResponse {
        mode: view.mode(),
        selected_server: view.selected_node().map(str::to_string),
        time_range: view.time_range(),
        playback_index: view.playback_index(),
    }
}

/// Apply view-state setters; invalid ranges are rejected with 422
async fn update_view(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ViewRequest>,
) -> Result<Json<ViewResponse>, (StatusCode, String)> {
    let mut engine = state.engine.write().await;

    if let Some(mode) = body.mode {
        engine
            .set_view_mode(mode, body.lookback_minutes)
            .map_err(unprocessable)?;
    }
    if let Some(selected) = body.selected_server {
        let selected = if selected.is_empty() {
            None
        } else {
            Some(selected)
        };
        engine.set_selected_node(selected);
    }
    if body.clear_time_range {
        engine.set_time_range(None).map_err(unprocessable)?;
    } else if let Some(range) = body.time_range {
        engine.set_time_range(Some(range)).map_err(unprocessable)?;
    }
    if let Some(index) = body.playback_index {
        engine.set_playback_index(index);
    }

    Ok(Json(view_response(&engine)))
}

/// Freeze the trailing window and switch to historical playback
async fn create_snapshot(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SnapshotRequest>,
) -> impl IntoResponse {
    let mut engine = state.engine.write().await;
    engine.create_historical_snapshot(body.lookback_minutes);
    Json(engine.view().snapshot().cloned())
}

/// Full atomic reset of the simulated fleet
async fn refresh(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut engine = state.engine.write().await;
    engine.refresh_data();
    info!("data refresh requested via API");
    Json(serde_json::json!({ "refreshed": true, "servers": engine.node_count() }))
}

/// Mutate the process-wide run flag and metric preference
async fn control(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ControlRequest>,
) -> impl IntoResponse {
    let mut system = state.system.write().unwrap();
    if let Some(running) = body.running {
        system.running = running;
    }
    if let Some(metric) = body.selected_metric {
        system.selected_metric = metric;
    }
    Json(*system)
}

/// Liveness probe
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let last_update = state.engine.read().await.update_status().last_update;
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "ok", "last_update": last_update })),
    )
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder.encode(&metric_families, &mut buffer).unwrap();

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/servers", get(servers))
        .route("/api/servers/:id/history", get(server_history))
        .route("/api/metrics", get(aggregated_metrics))
        .route("/api/health", get(health))
        .route("/api/load-balance", get(load_balance))
        .route("/api/tasks", get(tasks))
        .route("/api/alerts", get(alerts))
        .route("/api/timeseries", get(timeseries))
        .route("/api/status", get(status))
        .route("/api/view", post(update_view))
        .route("/api/snapshot", post(create_snapshot))
        .route("/api/refresh", post(refresh))
        .route("/api/control", post(control))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
