//! The cron singleton: every sixty seconds (and immediately after any
//! cron mutation) it walks each enabled query forward through bounded
//! time slices, at-least-once.

use crate::app::{AppState, CronMessage};
use crate::cron::forward;
use crate::errors::ApiError;
use crate::expression;
use crate::peer::auth::{sign_peer, PEER_AUTH_HEADER};
use crate::peer::resolver;
use owlcap_store::{CronAction, CronQuery, Datastore, Filter, SessionQuery};
use owlcap_utils::tags::sanitize_tag_list;
use owlcap_utils::unix_time::unix_now;
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Wall-clock tick between unsolicited runs.
const CRON_TICK_SECS: u64 = 60;
/// A query drains at most this much session time per slice, seconds.
const MAX_SLICE_SECS: u64 = 86_400;
/// Forward fan-out across all nodes.
const FORWARD_CONCURRENCY_TOTAL: usize = 15;
/// Forward fan-out per owning node.
const FORWARD_CONCURRENCY_PER_NODE: usize = 10;
/// Notifier throttle.
const NOTIFY_MIN_INTERVAL_SECS: u64 = 600;

pub async fn start(state: Arc<AppState>, mut rx: Receiver<CronMessage>) {
    info!("Cron engine starting on {}", state.cluster.node_name);
    loop {
        tokio::select! {
            msg = rx.recv() => {
                if msg.is_none() {
                    break;
                }
            }
            _ = tokio::time::sleep(std::time::Duration::from_secs(CRON_TICK_SECS)) => {}
        }
        process_cron_queries(&state).await;
    }
}

/// One engine pass: keep giving every query a slice until a full round
/// makes no progress.
pub async fn process_cron_queries(state: &Arc<AppState>) {
    if state.engines.cron_running.swap(true, Ordering::SeqCst) {
        return;
    }
    loop {
        let crons = match state.stores.db.list_crons().await {
            Ok(crons) => crons,
            Err(e) => {
                error!("Unable to list cron queries: {e}");
                break;
            }
        };
        let mut any_repeat = false;
        for cron in crons {
            if !cron.enabled {
                continue;
            }
            match run_cron_slice(state, cron).await {
                Ok(repeat) => any_repeat |= repeat,
                Err(e) => warn!("Cron slice failed: {e}"),
            }
        }
        if !any_repeat {
            break;
        }
    }
    state.engines.cron_running.store(false, Ordering::SeqCst);
}

/// Drains one bounded window of one query. Returns true when the query
/// still has timeline left, so the outer loop comes back after giving the
/// other queries a turn.
async fn run_cron_slice(state: &Arc<AppState>, mut cron: CronQuery) -> Result<bool, ApiError> {
    let now = unix_now().map_err(|e| ApiError::Backend(e.to_string()))?;
    // The horizon: never read windows newer than now - cronDelay.
    let end_time = now.saturating_sub(state.config.cron_delay_secs);
    if cron.lp_value >= end_time {
        return Ok(false);
    }

    let Some(action) = cron.parsed_action() else {
        warn!("Cron {} has unusable action '{}'", cron.id, cron.action);
        return Ok(false);
    };

    let creator = match state.stores.db.get_user(&cron.creator).await {
        Ok(user) if user.enabled => user,
        Ok(_) => {
            warn!("Cron {} creator {} is disabled", cron.id, cron.creator);
            return Ok(false);
        }
        Err(e) => {
            warn!("Cron {} creator {} missing: {e}", cron.id, cron.creator);
            return Ok(false);
        }
    };

    // A compile error skips the query for this tick only.
    let filter = match expression::compile_with_forced(
        Some(&cron.query),
        creator.expression.as_deref(),
        state,
    )
    .await
    {
        Ok(filter) => filter,
        Err(e) => {
            warn!("Cron {} expression error: {e}", cron.id);
            return Ok(false);
        }
    };

    let single_end = end_time.min(cron.lp_value + MAX_SLICE_SECS);
    let windowed = Filter::And(vec![
        Filter::Range {
            field: "lastPacket".to_string(),
            gte: Some((cron.lp_value * 1000) as i64),
            lt: Some((single_end * 1000) as i64),
            lte: None,
        },
        filter,
    ]);
    let query = SessionQuery::new(windowed)
        .with_source(&["node"])
        .with_size(500);

    let (scroll, mut page) = state.stores.db.start_session_scroll(&query).await?;
    let mut batch: u64 = 0;
    loop {
        if page.hits.is_empty() {
            break;
        }
        match &action {
            CronAction::Tag => {
                let tags = sanitize_tag_list(&cron.tags);
                if !tags.is_empty() {
                    for hit in &page.hits {
                        if let Err(e) = state.stores.db.add_tags_to_session(&hit.id, &tags).await {
                            warn!("Cron {} unable to tag {}: {e}", cron.id, hit.id);
                            continue;
                        }
                    }
                }
                batch += page.hits.len() as u64;
            }
            CronAction::Forward(cluster) => {
                batch += forward_page(state, cluster, &page.hits).await;
            }
        }
        page = state.stores.db.scroll_sessions(&scroll).await?;
    }
    state.stores.db.clear_scroll(scroll).await?;

    // Commit the low watermark. A crash before this line re-processes the
    // window; actions are at-least-once by design.
    cron.lp_value = single_end;
    cron.last_run = now;
    cron.count += batch;

    if let Some(notifier) = cron.notifier.clone() {
        if batch > 0 && now.saturating_sub(cron.last_notified) >= NOTIFY_MIN_INTERVAL_SECS {
            let new_matches = cron.count - cron.last_notified_count;
            state
                .notifier
                .send(
                    &notifier,
                    &format!("Cron query {} matched {new_matches} new sessions", cron.name),
                )
                .await;
            cron.last_notified = now;
            cron.last_notified_count = cron.count;
        }
    }

    state.stores.db.update_cron(&cron).await?;
    Ok(single_end < end_time)
}

/// Forwards a page of sessions: local owners read their own disk, remote
/// owners get a per-session hop. Fifteen in flight fleet-wide, ten per
/// node; both caps hold regardless of the client pool's own limits.
async fn forward_page(
    state: &Arc<AppState>,
    cluster: &str,
    hits: &[owlcap_store::SessionHit],
) -> u64 {
    let total = Arc::new(Semaphore::new(FORWARD_CONCURRENCY_TOTAL));
    let mut per_node: HashMap<String, Arc<Semaphore>> = HashMap::new();
    let mut set = JoinSet::new();
    for hit in hits {
        let node_gate = per_node
            .entry(hit.session.node.clone())
            .or_insert_with(|| Arc::new(Semaphore::new(FORWARD_CONCURRENCY_PER_NODE)))
            .clone();
        let Ok(total_permit) = total.clone().acquire_owned().await else {
            break;
        };
        let Ok(node_permit) = node_gate.acquire_owned().await else {
            break;
        };
        let state = state.clone();
        let cluster = cluster.to_string();
        let session_id = hit.id.clone();
        let node = hit.session.node.clone();
        set.spawn(async move {
            let _permits = (total_permit, node_permit);
            forward_one(&state, &cluster, &session_id, &node).await
        });
    }
    let mut sent = 0u64;
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(Ok(())) => sent += 1,
            Ok(Err(e)) => warn!("Forward failed: {e}"),
            Err(e) => error!("Forward worker panicked: {e}"),
        }
    }
    sent
}

async fn forward_one(
    state: &Arc<AppState>,
    cluster: &str,
    session_id: &str,
    node: &str,
) -> Result<(), ApiError> {
    if state.cluster.is_local(node) {
        let session = state.stores.db.get_session(session_id).await?;
        return forward::forward_local_session(state, cluster, &session).await;
    }
    // The owner reads its own disk: hop the forward request over.
    let info = resolver::node_info(state, node).await?;
    let path = format!("/{node}/session/{session_id}/forward?cluster={cluster}");
    let token = sign_peer(
        state.config.server_secret_or_password(),
        &state.cluster.node_name,
        &path,
    )
    .map_err(|e| ApiError::Backend(format!("Unable to sign forward hop: {e}")))?;
    let url = format!("{}{}", info.view_url.trim_end_matches('/'), path);
    let client = state.cluster.peers.for_scheme(info.scheme());
    let resp = client
        .post(&url)
        .header(PEER_AUTH_HEADER, token)
        .send()
        .await
        .map_err(|e| ApiError::Transport(format!("Peer {node} unreachable: {e}")))?;
    if !resp.status().is_success() {
        return Err(ApiError::Backend(format!(
            "Peer {node} refused forward of {session_id}: HTTP {}",
            resp.status()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testutil::fixture;
    use owlcap_store::Session;

    fn tag_cron(lp_value: u64) -> CronQuery {
        CronQuery {
            creator: "alice".to_string(),
            enabled: true,
            name: "tag-web".to_string(),
            query: "port == 80".to_string(),
            tags: "cron1,cron2".to_string(),
            action: "tag".to_string(),
            lp_value,
            ..Default::default()
        }
    }

    fn web_session(id: &str, last_packet_ms: u64, dst_port: u16) -> Session {
        Session {
            id: id.to_string(),
            node: "capture01".to_string(),
            last_packet: last_packet_ms,
            src_ip: "10.0.0.1".to_string(),
            src_port: 49152,
            dst_ip: "10.0.0.100".to_string(),
            dst_port,
            tags: vec!["keep".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn tag_action_tags_matches_and_advances_the_watermark() {
        let fx = fixture();
        fx.add_user("alice", false);

        let now = unix_now().unwrap();
        let lp0 = now - 2 * MAX_SLICE_SECS;
        // Three matching sessions inside the first slice, one on the
        // wrong port.
        let in_window = now - MAX_SLICE_SECS - 100;
        for i in 0..3u64 {
            fx.db
                .put_session(web_session(&format!("w{i}"), (in_window + i) * 1000, 80));
        }
        fx.db
            .put_session(web_session("ssh", (in_window + 5) * 1000, 22));
        let id = fx.db.create_cron(&tag_cron(lp0)).await.unwrap();

        process_cron_queries(&fx.state).await;

        let cron = fx.db.get_cron(&id).await.unwrap();
        assert_eq!(cron.count, 3);
        // The watermark marched to the horizon and never past it.
        assert!(cron.lp_value > lp0);
        assert!(cron.lp_value <= unix_now().unwrap() - fx.state.config.cron_delay_secs);

        for i in 0..3u64 {
            let s = fx.db.get_session(&format!("w{i}")).await.unwrap();
            assert!(s.tags.contains(&"keep".to_string()));
            assert!(s.tags.contains(&"cron1".to_string()));
            assert!(s.tags.contains(&"cron2".to_string()));
        }
        let ssh = fx.db.get_session("ssh").await.unwrap();
        assert_eq!(ssh.tags, vec!["keep".to_string()]);
    }

    #[tokio::test]
    async fn disabled_queries_and_disabled_creators_are_skipped() {
        let fx = fixture();
        fx.add_user("alice", false);
        let now = unix_now().unwrap();
        fx.db
            .put_session(web_session("w0", (now - 200) * 1000, 80));

        let mut off = tag_cron(now - 300);
        off.enabled = false;
        let off_id = fx.db.create_cron(&off).await.unwrap();

        let mut orphan = tag_cron(now - 300);
        orphan.creator = "ghost".to_string();
        let orphan_id = fx.db.create_cron(&orphan).await.unwrap();

        process_cron_queries(&fx.state).await;

        assert_eq!(fx.db.get_cron(&off_id).await.unwrap().count, 0);
        assert_eq!(fx.db.get_cron(&orphan_id).await.unwrap().count, 0);
        let s = fx.db.get_session("w0").await.unwrap();
        assert!(!s.tags.contains(&"cron1".to_string()));
    }

    #[tokio::test]
    async fn compile_errors_skip_the_tick_without_poisoning_others() {
        let fx = fixture();
        fx.add_user("alice", false);
        let now = unix_now().unwrap();
        fx.db
            .put_session(web_session("w0", (now - 200) * 1000, 80));

        let mut broken = tag_cron(now - 300);
        broken.query = "port ==".to_string();
        fx.db.create_cron(&broken).await.unwrap();
        let good_id = fx.db.create_cron(&tag_cron(now - 300)).await.unwrap();

        process_cron_queries(&fx.state).await;

        let good = fx.db.get_cron(&good_id).await.unwrap();
        assert_eq!(good.count, 1);
    }

    #[tokio::test]
    async fn the_horizon_is_respected() {
        let fx = fixture();
        fx.add_user("alice", false);
        let now = unix_now().unwrap();
        // A session newer than now - cronDelay must not be consumed yet.
        fx.db.put_session(web_session("fresh", (now - 5) * 1000, 80));
        let id = fx.db.create_cron(&tag_cron(now - 3600)).await.unwrap();

        process_cron_queries(&fx.state).await;

        let cron = fx.db.get_cron(&id).await.unwrap();
        assert_eq!(cron.count, 0);
        assert!(cron.lp_value <= now - fx.state.config.cron_delay_secs + 1);
        let fresh = fx.db.get_session("fresh").await.unwrap();
        assert!(!fresh.tags.contains(&"cron1".to_string()));
    }
}
