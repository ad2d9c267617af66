//! Forwards a request to the node that owns the session, preserving
//! method, path, query, headers, and body, and streaming the response
//! back unchanged.

use crate::app::AppState;
use crate::errors::ApiError;
use crate::peer::auth::{sign_peer, PEER_AUTH_HEADER};
use crate::peer::resolver;
use axum::body::Body;
use axum::extract::Request;
use axum::http::header::HOST;
use axum::http::HeaderValue;
use axum::response::Response;
use tracing::warn;

/// Body size cap when buffering a request for the hop.
const MAX_PROXY_BODY: usize = 64 * 1024 * 1024;

/// One pooled client per target scheme, shared across every proxied
/// request. The HTTPS client trusts the fleet's self-signed node certs.
pub struct PeerClients {
    http: reqwest::Client,
    https: reqwest::Client,
}

impl PeerClients {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(15)
            .build()
            .unwrap_or_default();
        let https = reqwest::Client::builder()
            .pool_max_idle_per_host(15)
            .danger_accept_invalid_certs(true)
            .build()
            .unwrap_or_default();
        Self { http, https }
    }

    pub fn for_scheme(&self, scheme: &str) -> &reqwest::Client {
        if scheme == "https" {
            &self.https
        } else {
            &self.http
        }
    }
}

impl Default for PeerClients {
    fn default() -> Self {
        Self::new()
    }
}

/// Hops `req` to `owner`. The caller already decided the session isn't
/// local. Transport failures surface as 502; the hunt engine has its own
/// retry list, so nothing here retries.
pub async fn forward(
    state: &AppState,
    owner: &str,
    user_id: &str,
    req: Request,
) -> Result<Response, ApiError> {
    let node = resolver::node_info(state, owner).await?;
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let url = format!("{}{}", node.view_url.trim_end_matches('/'), path_and_query);

    let token = sign_peer(
        state.config.server_secret_or_password(),
        user_id,
        &path_and_query,
    )
    .map_err(|e| ApiError::Backend(format!("Unable to sign peer token: {e}")))?;

    let (parts, body) = req.into_parts();
    let body = axum::body::to_bytes(body, MAX_PROXY_BODY)
        .await
        .map_err(|e| ApiError::Validation(format!("Unreadable request body: {e}")))?;

    let mut headers = parts.headers.clone();
    headers.remove(HOST);
    headers.insert(
        PEER_AUTH_HEADER,
        HeaderValue::from_str(&token)
            .map_err(|_| ApiError::Backend("Token is not a valid header value".to_string()))?,
    );

    let client = state.cluster.peers.for_scheme(node.scheme());
    let resp = client
        .request(parts.method.clone(), &url)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|e| {
            warn!("Peer {owner} unreachable at {url}: {e}");
            ApiError::Transport(format!("Peer {owner} unreachable"))
        })?;

    let mut builder = Response::builder().status(resp.status());
    for (name, value) in resp.headers() {
        builder = builder.header(name, value);
    }
    builder
        .body(Body::from_stream(resp.bytes_stream()))
        .map_err(|e| ApiError::Backend(format!("Unable to assemble proxied response: {e}")))
}
