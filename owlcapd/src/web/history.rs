//! Appends one history document per authenticated request. Bodies are
//! logged with password fields scrubbed; the history index must never
//! hold credentials.

use crate::app::AppState;
use crate::web::auth::AuthedUser;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use owlcap_store::{scrub_passwords, Datastore, HistoryEntry};
use owlcap_utils::unix_time::unix_now;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

/// Bodies beyond this aren't logged, only executed.
const MAX_LOGGED_BODY: usize = 256 * 1024;

pub async fn history_layer(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let (parts, body) = req.into_parts();

    let api = parts.uri.path().to_string();
    let query = parts.uri.query().map(|q| q.to_string());
    let user_id = parts
        .extensions
        .get::<AuthedUser>()
        .map(|a| a.user.user_id.clone());

    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return crate::errors::ApiError::Validation("Unreadable request body".to_string())
                .into_response()
        }
    };
    let logged_body: Option<Value> = if bytes.len() <= MAX_LOGGED_BODY {
        serde_json::from_slice::<Value>(&bytes).ok().map(|mut v| {
            scrub_passwords(&mut v);
            v
        })
    } else {
        None
    };

    let req = Request::from_parts(parts, Body::from(bytes));
    let resp = next.run(req).await;

    if let Some(user_id) = user_id {
        let entry = HistoryEntry {
            timestamp: unix_now().unwrap_or(0),
            user_id,
            api,
            query,
            body: logged_body,
            query_time: start.elapsed().as_millis() as u64,
            ..Default::default()
        };
        if let Err(e) = state.stores.db.add_history(&entry).await {
            warn!("Unable to append history: {e}");
        }
    }
    resp
}
