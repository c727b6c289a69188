//! HTTP server setup and configuration.
//!
//! This module provides the router and application state used by both
//! the production server and integration tests.

use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::{header::CACHE_CONTROL, HeaderValue},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::api;
use crate::error::ApiError;
use crate::models::{AppConfig, CheckRecord, DetectionOverrides, PreprocessOverrides};
use crate::services::{DataLayout, MapMonitor, PngBaselineStore, ReportCache};

/// Largest accepted screenshot upload
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub monitor: Arc<MapMonitor>,
    pub reports: Arc<ReportCache>,
}

/// Create application state with baselines under `<data_dir>/baselines`.
pub fn create_app_state(config: Arc<AppConfig>) -> AppState {
    create_app_state_with_overrides(
        config,
        DetectionOverrides::default(),
        PreprocessOverrides::default(),
    )
}

/// Create application state with settings applied on top of every map.
pub fn create_app_state_with_overrides(
    config: Arc<AppConfig>,
    detection: DetectionOverrides,
    preprocess: PreprocessOverrides,
) -> AppState {
    let layout = DataLayout::new(config.data_dir());
    let baselines = Arc::new(PngBaselineStore::new(layout.baselines_root()));
    let reports = Arc::new(ReportCache::new());
    let monitor = Arc::new(
        MapMonitor::new(config.clone(), baselines, reports.clone())
            .with_overrides(detection, preprocess),
    );

    AppState {
        config,
        monitor,
        reports,
    }
}

/// Build the API router with all endpoints and middleware.
///
/// Reports change on every check, so responses are marked `no-store`
/// unless a handler sets its own caching policy.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/maps", get(handle_list_maps))
        .route("/api/maps/:map_id/check", post(handle_check))
        .route("/api/maps/:map_id/report", get(handle_report))
        .route("/api/maps/:map_id/visualization", get(handle_visualization))
        // Health check
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
}

// Wrapper handlers to extract state components for the underlying API handlers

async fn handle_list_maps(State(state): State<AppState>) -> Json<api::MapListResponse> {
    api::handle_list_maps(State(state.config), State(state.reports)).await
}

async fn handle_check(
    State(state): State<AppState>,
    path: Path<String>,
    body: axum::body::Bytes,
) -> Result<Json<CheckRecord>, ApiError> {
    api::handle_check(State(state.monitor), path, body).await
}

async fn handle_report(
    State(state): State<AppState>,
    path: Path<String>,
) -> Result<Json<CheckRecord>, ApiError> {
    api::handle_report(State(state.reports), path).await
}

async fn handle_visualization(
    State(state): State<AppState>,
    path: Path<String>,
) -> Result<axum::response::Response, ApiError> {
    api::handle_visualization(State(state.reports), path).await
}
