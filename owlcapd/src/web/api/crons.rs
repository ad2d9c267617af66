use crate::app::AppState;
use crate::errors::ApiError;
use crate::expression;
use crate::web::auth::AuthedUser;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use owlcap_store::{CronQuery, Datastore};
use owlcap_utils::unix_time::unix_now;
use serde_json::{json, Value};
use std::sync::Arc;

fn validate(cron: &CronQuery, state: &AppState) -> Result<(), ApiError> {
    if cron.name.trim().is_empty() {
        return Err(ApiError::Validation("Missing cron name".to_string()));
    }
    if cron.query.trim().is_empty() {
        return Err(ApiError::Validation("Missing cron query".to_string()));
    }
    let Some(action) = cron.parsed_action() else {
        return Err(ApiError::Validation(format!(
            "Bad cron action '{}'",
            cron.action
        )));
    };
    match action {
        owlcap_store::CronAction::Tag => {
            if cron.tags.trim().is_empty() {
                return Err(ApiError::Validation(
                    "Tag action needs a tag list".to_string(),
                ));
            }
        }
        owlcap_store::CronAction::Forward(cluster) => {
            if !state.config.remote_clusters.contains_key(&cluster) {
                return Err(ApiError::Validation(format!(
                    "Unknown remote cluster '{cluster}'"
                )));
            }
        }
    }
    Ok(())
}

/// POST /api/user/cron - create; starts reading at `now - cronDelay`.
pub async fn create_cron(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
    Json(mut cron): Json<CronQuery>,
) -> Result<Json<Value>, ApiError> {
    validate(&cron, &state)?;
    expression::compile(&cron.query, &state)
        .await
        .map_err(ApiError::Validation)?;

    let now = unix_now().map_err(|e| ApiError::Backend(e.to_string()))?;
    cron.id = String::new();
    cron.creator = authed.user.user_id.clone();
    if cron.lp_value == 0 {
        cron.lp_value = now.saturating_sub(state.config.cron_delay_secs);
    }
    cron.count = 0;
    cron.last_run = 0;
    cron.last_notified = 0;
    cron.last_notified_count = 0;

    let id = state.stores.db.create_cron(&cron).await?;
    state.engines.kick_crons();
    Ok(Json(json!({ "success": true, "key": id })))
}

/// GET /api/user/crons
pub async fn list_crons(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
) -> Result<Json<Value>, ApiError> {
    let crons = state.stores.db.list_crons().await?;
    let visible: Vec<Value> = crons
        .iter()
        .filter(|c| c.creator == authed.user.user_id || authed.user.is_admin())
        .map(|c| {
            let mut v = serde_json::to_value(c).unwrap_or_default();
            if let Value::Object(map) = &mut v {
                map.insert("key".to_string(), json!(c.id));
            }
            v
        })
        .collect();
    Ok(Json(json!({ "success": true, "queries": visible })))
}

/// POST /api/user/cron/:key - update; the watermark survives edits.
pub async fn update_cron(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
    Path(key): Path<String>,
    Json(update): Json<CronQuery>,
) -> Result<Json<Value>, ApiError> {
    let mut cron = state.stores.db.get_cron(&key).await?;
    if cron.creator != authed.user.user_id && !authed.user.is_admin() {
        return Err(ApiError::Auth("Not your cron query".to_string()));
    }
    validate(&update, &state)?;
    expression::compile(&update.query, &state)
        .await
        .map_err(ApiError::Validation)?;

    cron.name = update.name;
    cron.query = update.query;
    cron.tags = update.tags;
    cron.action = update.action;
    cron.enabled = update.enabled;
    cron.notifier = update.notifier;
    state.stores.db.update_cron(&cron).await?;
    state.engines.kick_crons();
    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/user/cron/:key
pub async fn delete_cron(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
    Path(key): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let cron = state.stores.db.get_cron(&key).await?;
    if cron.creator != authed.user.user_id && !authed.user.is_admin() {
        return Err(ApiError::Auth("Not your cron query".to_string()));
    }
    state.stores.db.delete_cron(&key).await?;
    state.engines.kick_crons();
    Ok(Json(json!({ "success": true })))
}
