//! Outermost middleware: response-time header plus the security headers
//! the config asks for.

use crate::app::AppState;
use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;
use std::time::Instant;

/// Milliseconds from request start to headers out, monotonic clock.
pub const RESPONSE_TIME_HEADER: &str = "X-Moloch-Response-Time";

pub async fn response_time_layer(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let mut resp = next.run(req).await;

    let elapsed_ms = start.elapsed().as_millis() as u64;
    if let Ok(value) = HeaderValue::from_str(&elapsed_ms.to_string()) {
        resp.headers_mut().insert(RESPONSE_TIME_HEADER, value);
    }

    let frame = match state.config.iframe.as_str() {
        "deny" => Some("DENY".to_string()),
        "sameorigin" => Some("SAMEORIGIN".to_string()),
        origin if !origin.is_empty() => Some(format!("ALLOW-FROM {origin}")),
        _ => None,
    };
    if let Some(frame) = frame {
        if let Ok(value) = HeaderValue::from_str(&frame) {
            resp.headers_mut().insert("X-Frame-Options", value);
        }
    }
    if state.config.hsts_header {
        resp.headers_mut().insert(
            "Strict-Transport-Security",
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }
    resp
}
