use crate::app::AppState;
use crate::errors::ApiError;
use crate::web::api::require;
use crate::web::auth::AuthedUser;
use axum::extract::State;
use axum::{Extension, Json};
use owlcap_store::{Datastore, Lookup};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "success": true, "node": state.cluster.node_name }))
}

/// GET /api/files - this node's registered capture files.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
) -> Result<Json<Value>, ApiError> {
    require(!authed.user.hide_files, "Files view is hidden")?;
    let files = state
        .stores
        .db
        .list_files(&state.cluster.node_name)
        .await?;
    Ok(Json(json!({ "success": true, "files": files })))
}

/// GET /api/stats - fleet map plus local counters.
pub async fn stats(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
) -> Result<Json<Value>, ApiError> {
    require(!authed.user.hide_stats, "Stats view is hidden")?;
    let nodes = state.stores.db.list_nodes().await?;
    let file_count = state
        .stores
        .db
        .file_count(&state.cluster.node_name)
        .await?;
    Ok(Json(json!({
        "success": true,
        "nodes": nodes,
        "fileCount": file_count,
    })))
}

/// POST /api/lookup - create a shared shortcut. The existence check and
/// the create sit under one lock so two racing creates can't both win the
/// same name.
pub async fn create_lookup(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
    Json(mut lookup): Json<Lookup>,
) -> Result<Json<Value>, ApiError> {
    if lookup.name.trim().is_empty() {
        return Err(ApiError::Validation("Missing lookup name".to_string()));
    }
    if lookup.values.is_empty() {
        return Err(ApiError::Validation("Missing lookup values".to_string()));
    }

    let _guard = state.auth.lookup_create_lock.lock().await;
    if state.stores.db.get_lookup(&lookup.name).await.is_ok() {
        return Err(ApiError::Validation(format!(
            "A lookup named '{}' already exists",
            lookup.name
        )));
    }
    lookup.user_id = authed.user.user_id.clone();
    let id = state.stores.db.create_lookup(&lookup).await?;
    state.auth.lookups.invalidate(&lookup.name);
    Ok(Json(json!({ "success": true, "id": id })))
}

#[derive(Deserialize)]
pub struct CancelRequest {
    #[serde(rename = "taskId")]
    pub task_id: String,
}

/// POST /api/esadmin/cancel - cancel a backend admin task. Gated on the
/// explicit esAdminUsers list, or on admin when not multi-cluster.
pub async fn esadmin_cancel(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
    Json(body): Json<CancelRequest>,
) -> Result<Json<Value>, ApiError> {
    let allowed = if state.config.multi_es || !state.config.es_admin_users.is_empty() {
        state
            .config
            .es_admin_users
            .iter()
            .any(|u| u == &authed.user.user_id)
    } else {
        authed.user.create_enabled
    };
    require(allowed, "ES admin access denied")?;
    state.stores.db.cancel_task(&body.task_id).await?;
    Ok(Json(json!({ "success": true })))
}
