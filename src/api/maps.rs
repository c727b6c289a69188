use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::models::{AppConfig, CheckRecord, MapId};
use crate::services::{MapMonitor, ReportCache};

/// One monitored map
#[derive(Debug, Serialize, ToSchema)]
pub struct MapSummary {
    pub map_id: String,
    /// Whether the map appears in the configuration file
    pub configured: bool,
    /// Page the capture tool renders
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Most recent check since the server started
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_check: Option<CheckRecord>,
}

/// Response from GET /api/maps
#[derive(Debug, Serialize, ToSchema)]
pub struct MapListResponse {
    pub maps: Vec<MapSummary>,
}

/// List maps
///
/// Configured maps in processing order, followed by maps that were only
/// checked through the API.
#[utoipa::path(
    get,
    path = "/api/maps",
    responses(
        (status = 200, description = "Known maps", body = MapListResponse),
    ),
    tag = "Maps"
)]
pub async fn handle_list_maps(
    State(config): State<Arc<AppConfig>>,
    State(reports): State<Arc<ReportCache>>,
) -> Json<MapListResponse> {
    let mut ids = config.ordered_map_ids();
    for id in reports.map_ids().await {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    let mut maps = Vec::with_capacity(ids.len());
    for id in ids {
        let map_config = config.maps.get(&id);
        maps.push(MapSummary {
            map_id: id.to_string(),
            configured: map_config.is_some(),
            url: map_config.and_then(|m| m.url.clone()),
            last_check: reports.get(&id).await.map(|latest| latest.record),
        });
    }

    Json(MapListResponse { maps })
}

/// Check a screenshot
///
/// Compares the uploaded PNG against the stored baseline of the map and
/// replaces the baseline with it. The first upload of a map only stores it.
#[utoipa::path(
    post,
    path = "/api/maps/{map_id}/check",
    request_body(content = Vec<u8>, description = "PNG screenshot", content_type = "image/png"),
    responses(
        (status = 200, description = "Check result", body = CheckRecord),
        (status = 400, description = "Invalid map id or image"),
        (status = 500, description = "Check failed"),
    ),
    params(
        ("map_id" = String, Path, description = "Map identifier ([A-Za-z0-9_-], at most 64 characters)"),
    ),
    tag = "Maps"
)]
pub async fn handle_check(
    State(monitor): State<Arc<MapMonitor>>,
    Path(map_id): Path<String>,
    body: Bytes,
) -> Result<Json<CheckRecord>, ApiError> {
    let map_id = MapId::parse(map_id)?;
    if body.is_empty() {
        return Err(ApiError::InvalidImage("empty request body".to_string()));
    }

    tracing::info!(map_id = %map_id, size_bytes = body.len(), "Screenshot received");

    let record = monitor.check(&map_id, body.to_vec(), None).await?;
    Ok(Json(record))
}

/// Latest check result
#[utoipa::path(
    get,
    path = "/api/maps/{map_id}/report",
    responses(
        (status = 200, description = "Latest check result", body = CheckRecord),
        (status = 400, description = "Invalid map id"),
        (status = 404, description = "Map not checked yet"),
    ),
    params(
        ("map_id" = String, Path, description = "Map identifier"),
    ),
    tag = "Maps"
)]
pub async fn handle_report(
    State(reports): State<Arc<ReportCache>>,
    Path(map_id): Path<String>,
) -> Result<Json<CheckRecord>, ApiError> {
    let map_id = MapId::parse(map_id)?;
    let latest = reports.get(&map_id).await.ok_or(ApiError::NotFound)?;
    Ok(Json(latest.record))
}

/// Highlighted frame of the latest comparison
#[utoipa::path(
    get,
    path = "/api/maps/{map_id}/visualization",
    responses(
        (status = 200, description = "PNG image", content_type = "image/png"),
        (status = 400, description = "Invalid map id"),
        (status = 404, description = "No comparison for this map yet"),
    ),
    params(
        ("map_id" = String, Path, description = "Map identifier"),
    ),
    tag = "Maps"
)]
pub async fn handle_visualization(
    State(reports): State<Arc<ReportCache>>,
    Path(map_id): Path<String>,
) -> Result<Response, ApiError> {
    let map_id = MapId::parse(map_id)?;
    let png_bytes = reports
        .get(&map_id)
        .await
        .and_then(|latest| latest.visualization_png)
        .ok_or(ApiError::NotFound)?;

    let etag = format!("\"{}\"", &hex::encode(Sha256::digest(png_bytes.as_slice()))[..16]);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::CONTENT_LENGTH, png_bytes.len().to_string()),
            (header::ETAG, etag),
        ],
        Bytes::from(Vec::clone(&png_bytes)),
    )
        .into_response())
}
