use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Request-level failures. Upstream (vision/preview) failures never appear
/// here: they are absorbed into `Recovered` fallbacks before a handler
/// builds its response.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    ClientInput(String),

    #[error("{0}")]
    Unexpected(#[from] anyhow::Error),
}

impl ApiError {
    pub fn client<S: Into<String>>(message: S) -> Self {
        ApiError::ClientInput(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::ClientInput(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::Unexpected(err) => {
                error!("Unexpected request failure: {err:#}");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("{err}"))
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
