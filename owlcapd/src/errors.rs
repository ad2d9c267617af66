//! The JSON error envelope every handler speaks: `{"success":false,"text":…}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use owlcap_store::StoreError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing/invalid token, skew, unknown or disabled user, gate denied.
    #[error("{0}")]
    Auth(String),
    #[error("{0}")]
    NotFound(String),
    /// Missing field, bad enum, name collision, regex compile.
    #[error("{0}")]
    Validation(String),
    /// Peer unreachable, socket timeout.
    #[error("{0}")]
    Transport(String),
    /// Backend 5xx / parse error.
    #[error("{0}")]
    Backend(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(_) | ApiError::Validation(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Transport(_) => StatusCode::BAD_GATEWAY,
            ApiError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "success": false, "text": self.to_string() }));
        (self.status(), body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => ApiError::NotFound(what),
            StoreError::Transport(text) => ApiError::Transport(text),
            StoreError::Backend(text) | StoreError::Serde(text) => ApiError::Backend(text),
        }
    }
}

#[cfg(test)]
mod test {
    use super::ApiError;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::Auth("no".to_string()).into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("x".to_string()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Transport("x".to_string()).into_response().status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
