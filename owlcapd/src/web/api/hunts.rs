use crate::app::AppState;
use crate::errors::ApiError;
use crate::expression;
use crate::hunt::engine::local_search;
use crate::hunt::packet_search::PacketSearch;
use crate::web::api::require;
use crate::web::auth::AuthedUser;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use owlcap_store::{Datastore, Filter, Hunt, HuntStatus, SessionQuery};
use owlcap_utils::unix_time::unix_now;
use serde_json::{json, Value};
use std::sync::Arc;

/// POST /api/hunt - queue a new hunt.
pub async fn create_hunt(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
    Json(mut hunt): Json<Hunt>,
) -> Result<Json<Value>, ApiError> {
    require(authed.user.packet_search, "Hunt access denied")?;

    if hunt.name.trim().is_empty() {
        return Err(ApiError::Validation("Missing hunt name".to_string()));
    }
    let Some(query) = &hunt.query else {
        return Err(ApiError::Validation("Missing hunt query".to_string()));
    };
    if query.stop_time <= query.start_time {
        return Err(ApiError::Validation(
            "Hunt stopTime must be after startTime".to_string(),
        ));
    }
    if hunt.size == 0 {
        return Err(ApiError::Validation("Missing hunt size".to_string()));
    }
    // A pattern that can't compile now will never compile later; reject
    // instead of queueing an unrunnable job.
    PacketSearch::compile(&hunt).map_err(ApiError::Validation)?;

    // Session-count cap for the creator's tier.
    let filter = expression::compile_with_forced(
        query.expression.as_deref(),
        authed.user.expression.as_deref(),
        &state,
    )
    .await
    .map_err(ApiError::Validation)?;
    let ranged = Filter::And(vec![
        Filter::Range {
            field: "lastPacket".to_string(),
            gte: Some((query.start_time * 1000) as i64),
            lt: None,
            lte: Some((query.stop_time * 1000) as i64),
        },
        filter,
    ]);
    let peek = state
        .stores
        .db
        .search_sessions(&SessionQuery::new(ranged).with_size(1))
        .await?;
    let limit = if authed.user.is_admin() {
        state.config.hunt_admin_limit
    } else {
        state.config.hunt_limit
    };
    if peek.total > limit {
        return Err(ApiError::Validation(format!(
            "Hunt would target {} sessions, over the {limit} limit",
            peek.total
        )));
    }

    let now = unix_now().map_err(|e| ApiError::Backend(e.to_string()))?;
    hunt.id = String::new();
    hunt.user_id = authed.user.user_id.clone();
    hunt.status = HuntStatus::Queued;
    hunt.total_sessions = peek.total;
    hunt.searched_sessions = 0;
    hunt.matched_sessions = 0;
    hunt.last_packet_time = None;
    hunt.failed_session_ids = Vec::new();
    hunt.errors = Vec::new();
    hunt.unrunnable = false;
    hunt.started = 0;
    hunt.created = now;
    hunt.last_updated = now;

    let id = state.stores.db.create_hunt(&hunt).await?;
    hunt.id = id.clone();
    state.engines.kick_hunts();
    Ok(Json(json!({ "success": true, "hunt": hunt, "id": id })))
}

/// GET /api/hunts - list, redacting hunts the caller may not inspect.
pub async fn list_hunts(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
) -> Result<Json<Value>, ApiError> {
    require(authed.user.packet_search, "Hunt access denied")?;
    let hunts = state.stores.db.list_hunts().await?;
    let is_admin = authed.user.is_admin();
    let visible: Vec<Value> = hunts
        .iter()
        .map(|hunt| {
            let shown = if hunt.visible_to(&authed.user.user_id, is_admin) {
                hunt.clone()
            } else {
                hunt.redacted()
            };
            let mut v = serde_json::to_value(&shown).unwrap_or_default();
            if let Value::Object(map) = &mut v {
                map.insert("id".to_string(), json!(shown.id));
            }
            v
        })
        .collect();
    Ok(Json(json!({ "success": true, "hunts": visible })))
}

/// PUT /api/hunt/:id/pause - the engine observes within a checkpoint.
pub async fn pause_hunt(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    require(authed.user.packet_search, "Hunt access denied")?;
    let mut hunt = state.stores.db.get_hunt(&id).await?;
    require(
        hunt.visible_to(&authed.user.user_id, authed.user.is_admin()),
        "Not your hunt",
    )?;
    hunt.status = HuntStatus::Paused;
    state.stores.db.update_hunt(&hunt).await?;
    Ok(Json(json!({ "success": true })))
}

/// PUT /api/hunt/:id/play - requeue a paused hunt; it resumes from its
/// persisted watermark.
pub async fn play_hunt(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    require(authed.user.packet_search, "Hunt access denied")?;
    let mut hunt = state.stores.db.get_hunt(&id).await?;
    require(
        hunt.visible_to(&authed.user.user_id, authed.user.is_admin()),
        "Not your hunt",
    )?;
    if hunt.unrunnable {
        return Err(ApiError::Validation(format!(
            "Hunt {id} is unrunnable; its expression or pattern will never compile"
        )));
    }
    if hunt.status != HuntStatus::Paused {
        return Err(ApiError::Validation(format!(
            "Hunt {id} is not paused"
        )));
    }
    hunt.status = HuntStatus::Queued;
    state.stores.db.update_hunt(&hunt).await?;
    state.engines.kick_hunts();
    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/hunt/:id
pub async fn delete_hunt(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    require(authed.user.packet_search, "Hunt access denied")?;
    let hunt = state.stores.db.get_hunt(&id).await?;
    require(
        hunt.user_id == authed.user.user_id || authed.user.is_admin(),
        "Only the creator or an admin may delete a hunt",
    )?;
    state.stores.db.delete_hunt(&id).await?;
    Ok(Json(json!({ "success": true })))
}

/// GET /:node/hunt/:huntid/remote/:sessionid - the per-session RPC the
/// engine drives against owning nodes. Answers `{matched}` or
/// `{matched:false, error}`; the caller never retries here.
pub async fn remote_hunt_session(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
    Path((node, hunt_id, session_id)): Path<(String, String, String)>,
) -> Result<Json<Value>, ApiError> {
    require(authed.user.packet_search, "Hunt access denied")?;
    if !state.cluster.is_local(&node) {
        return Err(ApiError::NotFound(format!(
            "Node {node} is not served here"
        )));
    }
    let hunt = state.stores.db.get_hunt(&hunt_id).await?;
    let search = match PacketSearch::compile(&hunt) {
        Ok(search) => search,
        Err(e) => return Ok(Json(json!({ "matched": false, "error": e }))),
    };
    let outcome = local_search(&state, &search, &hunt.id, &hunt.name, &session_id).await;
    Ok(Json(match outcome.error {
        Some(error) => json!({ "matched": outcome.matched, "error": error }),
        None => json!({ "matched": outcome.matched }),
    }))
}
