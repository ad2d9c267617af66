use crate::app::AppState;
use crate::cron::forward::{forward_local_session, unframe_session};
use crate::errors::ApiError;
use crate::pcaps::{self, WhatToRemove};
use crate::peer::auth::{sign_peer, PEER_AUTH_HEADER};
use crate::peer::{proxy, resolver};
use crate::web::api::require;
use crate::web::auth::AuthedUser;
use axum::body::Bytes;
use axum::extract::{Path, Query, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use owlcap_store::Datastore;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

/// GET /api/session/:id/pcap - the session's packets as a standalone
/// capture file. Non-owners hop to the owner transparently.
pub async fn session_pcap(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
    Path(id): Path<String>,
    req: Request,
) -> Result<Response, ApiError> {
    require(
        !authed.user.disable_pcap_download,
        "PCAP download is disabled for this user",
    )?;
    let session = state.stores.db.get_session(&id).await?;
    let owner = resolver::owner_of(&session);
    if !state.cluster.is_local(owner) {
        return proxy::forward(&state, owner, &authed.user.user_id, req).await;
    }
    let (bytes, _) = pcaps::session_pcap_bytes(&state, &session).await?;
    Ok((
        [(CONTENT_TYPE, "application/vnd.tcpdump.pcap")],
        bytes,
    )
        .into_response())
}

#[derive(Deserialize)]
pub struct DeleteRequest {
    pub ids: Vec<String>,
    #[serde(rename = "removeSpi", default)]
    pub remove_spi: bool,
    #[serde(rename = "removePcap", default)]
    pub remove_pcap: bool,
}

/// POST /api/delete - scrub sessions. Owning node does the disk work;
/// everyone else hops per session.
pub async fn delete_sessions(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
    Json(body): Json<DeleteRequest>,
) -> Result<Json<Value>, ApiError> {
    require(authed.user.remove_enabled, "Delete access denied")?;
    let what = match (body.remove_spi, body.remove_pcap) {
        (true, true) => WhatToRemove::All,
        (true, false) => WhatToRemove::Spi,
        (false, true) => WhatToRemove::Pcap,
        (false, false) => {
            return Err(ApiError::Validation(
                "Nothing to remove: set removeSpi and/or removePcap".to_string(),
            ))
        }
    };
    if body.ids.is_empty() {
        return Err(ApiError::Validation("No session ids given".to_string()));
    }

    for id in &body.ids {
        let session = state.stores.db.get_session(id).await?;
        let owner = resolver::owner_of(&session).to_string();
        if state.cluster.is_local(&owner) {
            pcaps::scrub_session(&state, id, what, &authed.user.user_id).await?;
        } else {
            remote_scrub(&state, &owner, id, what, &authed.user.user_id).await?;
        }
    }
    Ok(Json(json!({ "success": true })))
}

/// Hop a scrub to the owning node: GET /:node/delete/:what/:sid.
async fn remote_scrub(
    state: &AppState,
    node: &str,
    session_id: &str,
    what: WhatToRemove,
    user_id: &str,
) -> Result<(), ApiError> {
    let info = resolver::node_info(state, node).await?;
    let what = match what {
        WhatToRemove::Spi => "spi",
        WhatToRemove::Pcap => "pcap",
        WhatToRemove::All => "all",
    };
    let path = format!("/{node}/delete/{what}/{session_id}");
    let token = sign_peer(state.config.server_secret_or_password(), user_id, &path)
        .map_err(|e| ApiError::Backend(format!("Unable to sign scrub hop: {e}")))?;
    let url = format!("{}{}", info.view_url.trim_end_matches('/'), path);
    let client = state.cluster.peers.for_scheme(info.scheme());
    let resp = client
        .get(&url)
        .header(PEER_AUTH_HEADER, token)
        .send()
        .await
        .map_err(|e| ApiError::Transport(format!("Peer {node} unreachable: {e}")))?;
    if !resp.status().is_success() {
        return Err(ApiError::Backend(format!(
            "Peer {node} refused scrub of {session_id}: HTTP {}",
            resp.status()
        )));
    }
    Ok(())
}

/// GET /:node/delete/:what/:sid - the peer side of a scrub hop. Empty
/// 200 on success.
pub async fn remote_delete(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
    Path((node, what, sid)): Path<(String, String, String)>,
) -> Result<Response, ApiError> {
    require(authed.user.remove_enabled, "Delete access denied")?;
    if !state.cluster.is_local(&node) {
        return Err(ApiError::NotFound(format!(
            "Node {node} is not served here"
        )));
    }
    let what: WhatToRemove = what.parse()?;
    pcaps::scrub_session(&state, &sid, what, &authed.user.user_id).await?;
    Ok(().into_response())
}

#[derive(Deserialize)]
pub struct ReceiveParams {
    #[serde(rename = "saveId")]
    pub save_id: String,
}

/// POST /api/sessions/receive?saveId=… - accepts a forwarded session.
/// Peer-token auth ONLY; no other identity may reach this endpoint.
pub async fn receive(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
    Query(params): Query<ReceiveParams>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    if !authed.via_peer_token {
        return Err(ApiError::Auth(
            "Session receive requires node-to-node authentication".to_string(),
        ));
    }

    let (spi_json, pcap_bytes) = unframe_session(&body)?;
    let mut session: owlcap_store::Session = serde_json::from_slice(spi_json)
        .map_err(|e| ApiError::Validation(format!("Bad SPI JSON: {e}")))?;

    let (file_num, offsets) = pcaps::store_received_pcap(&state, &params.save_id, pcap_bytes).await?;
    session.id = String::new();
    session.node = state.cluster.node_name.clone();
    session.file_id = vec![file_num];
    session.packet_pos = offsets;
    let id = state.stores.db.create_session(&session).await?;

    info!(
        "Received session {id} ({} pcap bytes) as {}",
        pcap_bytes.len(),
        params.save_id
    );
    Ok(Json(json!({ "success": true, "id": id })))
}

#[derive(Deserialize)]
pub struct ForwardParams {
    pub cluster: String,
}

/// POST /:node/session/:id/forward?cluster=… - the cron engine's hop:
/// the owning node reads its own disk and ships the session onward.
pub async fn forward_session(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
    Path((node, id)): Path<(String, String)>,
    Query(params): Query<ForwardParams>,
) -> Result<Json<Value>, ApiError> {
    if !authed.via_peer_token {
        return Err(ApiError::Auth(
            "Session forward requires node-to-node authentication".to_string(),
        ));
    }
    if !state.cluster.is_local(&node) {
        return Err(ApiError::NotFound(format!(
            "Node {node} is not served here"
        )));
    }
    let session = state.stores.db.get_session(&id).await?;
    forward_local_session(&state, &params.cluster, &session).await?;
    Ok(Json(json!({ "success": true })))
}
