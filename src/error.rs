use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::{ConfigFileError, InvalidMapId};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid map id: {0}")]
    InvalidMapId(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Not found")]
    NotFound,

    #[error("Check failed: {0}")]
    Pipeline(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::MapId(e) => ApiError::InvalidMapId(e.0),
            PipelineError::Codec(CodecError::Decode(msg)) => ApiError::InvalidImage(msg),
            PipelineError::Codec(CodecError::Raster(e)) => ApiError::InvalidImage(e.to_string()),
            PipelineError::Codec(e @ CodecError::TooLarge { .. }) => {
                ApiError::InvalidImage(e.to_string())
            }
            other => ApiError::Pipeline(other.to_string()),
        }
    }
}

impl From<InvalidMapId> for ApiError {
    fn from(e: InvalidMapId) -> Self {
        ApiError::InvalidMapId(e.0)
    }
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("PNG decode error: {0}")]
    Decode(String),

    #[error("PNG encode error: {0}")]
    Encode(String),

    #[error("Image too large: {width}x{height}")]
    TooLarge { width: usize, height: usize },

    #[error("Pixel buffer error: {0}")]
    Raster(#[from] claim_diff::RasterError),
}

/// Failure of one monitoring step for one map.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    MapId(#[from] InvalidMapId),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Crop(#[from] claim_diff::CropError),

    #[error("Comparison failed: {0}")]
    Compare(#[from] claim_diff::ClaimDiffError),

    #[error("Baseline store error: {0}")]
    Cache(#[from] claim_diff::CacheError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigFileError),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No screenshot found for map '{0}'")]
    NoScreenshot(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidMapId(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidImage(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "status": status.as_u16(),
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_messages() {
        assert_eq!(
            ApiError::InvalidMapId("a/b".to_string()).to_string(),
            "Invalid map id: a/b"
        );
        assert_eq!(ApiError::NotFound.to_string(), "Not found");
        assert_eq!(
            ApiError::Internal("boom".to_string()).to_string(),
            "Internal error: boom"
        );
    }

    #[test]
    fn test_codec_error_messages() {
        assert_eq!(
            CodecError::Decode("bad signature".to_string()).to_string(),
            "PNG decode error: bad signature"
        );
        assert_eq!(
            CodecError::TooLarge {
                width: 70000,
                height: 2
            }
            .to_string(),
            "Image too large: 70000x2"
        );
    }

    #[test]
    fn test_pipeline_error_maps_to_api_error() {
        let err: ApiError = PipelineError::Codec(CodecError::Decode("x".into())).into();
        assert!(matches!(err, ApiError::InvalidImage(_)));

        let err: ApiError = PipelineError::MapId(InvalidMapId("..".into())).into();
        assert!(matches!(err, ApiError::InvalidMapId(_)));

        let err: ApiError = PipelineError::Task("panicked".into()).into();
        assert!(matches!(err, ApiError::Pipeline(_)));

        let err: ApiError = PipelineError::io(
            "/tmp/x",
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        )
        .into();
        assert!(matches!(err, ApiError::Pipeline(_)));
    }

    #[test]
    fn test_api_error_into_response_status_codes() {
        let response = ApiError::InvalidMapId("x".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError::InvalidImage("x".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = ApiError::Pipeline("x".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = ApiError::Internal("x".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
