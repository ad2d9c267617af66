//! The hunt scheduler. Exactly one hunt runs at a time on the
//! cron-enabled node; state lives in the hunt document so a restart
//! resumes from the persisted watermark.

use crate::app::{AppState, HuntMessage};
use crate::expression;
use crate::hunt::packet_search::PacketSearch;
use crate::peer::auth::{sign_peer, PEER_AUTH_HEADER};
use crate::peer::resolver;
use crate::pcaps;
use owlcap_pcap::SessionFingerprint;
use owlcap_store::{Datastore, Filter, Hunt, HuntStatus, SessionHit, SessionQuery};
use owlcap_utils::unix_time::unix_now;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::Receiver;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Per-session fan-out bound inside one hunt.
const SESSION_CONCURRENCY: usize = 3;
/// Checkpoint (and pause-poll) cadence.
const CHECKPOINT_INTERVAL: Duration = Duration::from_secs(2);
/// A hunt accumulating more failed sessions than this pauses for good.
const FAILED_SESSION_CAP: usize = 10_000;
/// Idle poll for newly queued hunts when nobody kicks us.
const IDLE_TICK: Duration = Duration::from_secs(5);

/// The engine task. Restores an abandoned running hunt first (crash
/// recovery), then serves the queue on kicks and idle ticks.
pub async fn start(state: Arc<AppState>, mut rx: Receiver<HuntMessage>) {
    info!("Hunt engine starting on {}", state.cluster.node_name);
    recover_abandoned(&state).await;
    process_hunt_jobs(&state).await;
    loop {
        tokio::select! {
            msg = rx.recv() => {
                if msg.is_none() {
                    break;
                }
            }
            _ = tokio::time::sleep(IDLE_TICK) => {}
        }
        process_hunt_jobs(&state).await;
    }
}

/// A hunt left `running` by a crashed process resumes from its persisted
/// `lastPacketTime`.
pub async fn recover_abandoned(state: &Arc<AppState>) {
    let hunts = match state.stores.db.list_hunts().await {
        Ok(hunts) => hunts,
        Err(e) => {
            error!("Unable to list hunts for crash recovery: {e}");
            return;
        }
    };
    for hunt in hunts {
        if hunt.status == HuntStatus::Running {
            warn!("Resuming abandoned hunt {} ({})", hunt.id, hunt.name);
            run_hunt(state, hunt).await;
        }
    }
}

/// Drains the queue, oldest first. At most one hunt is in flight.
pub async fn process_hunt_jobs(state: &Arc<AppState>) {
    if state.engines.hunt_running.swap(true, Ordering::SeqCst) {
        return;
    }
    loop {
        let hunts = match state.stores.db.list_hunts().await {
            Ok(hunts) => hunts,
            Err(e) => {
                error!("Unable to list hunts: {e}");
                break;
            }
        };
        let next = hunts
            .into_iter()
            .filter(|h| h.status == HuntStatus::Queued)
            .min_by_key(|h| h.created);
        match next {
            Some(hunt) => run_hunt(state, hunt).await,
            None => break,
        }
    }
    state.engines.hunt_running.store(false, Ordering::SeqCst);
}

/// What happened to one session during the scan.
pub struct Outcome {
    pub session_id: String,
    pub matched: bool,
    pub failed: bool,
    pub error: Option<String>,
}

async fn run_hunt(state: &Arc<AppState>, mut hunt: Hunt) {
    let now = unix_now().unwrap_or(0);
    hunt.status = HuntStatus::Running;
    if hunt.started == 0 {
        hunt.started = now;
    }
    hunt.last_updated = now;
    if let Err(e) = state.stores.db.update_hunt(&hunt).await {
        error!("Unable to mark hunt {} running: {e}", hunt.id);
        return;
    }

    // Compile failures latch unrunnable; the hunt never auto-resumes.
    let Some(query) = hunt.query.clone() else {
        fail_hunt(state, &mut hunt, "Hunt has no query".to_string(), true).await;
        return;
    };
    let creator = match state.stores.db.get_user(&hunt.user_id).await {
        Ok(user) => user,
        Err(e) => {
            fail_hunt(state, &mut hunt, format!("Hunt creator missing: {e}"), false).await;
            return;
        }
    };
    let filter = match expression::compile_with_forced(
        query.expression.as_deref(),
        creator.expression.as_deref(),
        state,
    )
    .await
    {
        Ok(filter) => filter,
        Err(e) => {
            fail_hunt(state, &mut hunt, format!("Expression error: {e}"), true).await;
            return;
        }
    };
    let search = match PacketSearch::compile(&hunt) {
        Ok(search) => Arc::new(search),
        Err(e) => {
            fail_hunt(state, &mut hunt, e, true).await;
            return;
        }
    };

    // Resume at the persisted watermark; a fresh hunt starts at startTime.
    let from_ms = hunt
        .last_packet_time
        .unwrap_or(query.start_time * 1000) as i64;
    let scan = Filter::And(vec![
        Filter::Range {
            field: "lastPacket".to_string(),
            gte: Some(from_ms),
            lt: None,
            lte: Some((query.stop_time * 1000) as i64),
        },
        filter,
    ]);
    let session_query = SessionQuery::new(scan)
        .with_source(&["lastPacket", "node", "huntId", "huntName", "fileId"])
        .with_size(100);

    let (scroll, mut page) = match state.stores.db.start_session_scroll(&session_query).await {
        Ok(ok) => ok,
        Err(e) => {
            fail_hunt(state, &mut hunt, format!("Session scan failed: {e}"), false).await;
            return;
        }
    };
    // First page knows the real remaining total.
    hunt.total_sessions = page.total + hunt.searched_sessions;

    let mut last_checkpoint = Instant::now();
    loop {
        if page.hits.is_empty() {
            break;
        }
        let outcomes = scan_page(state, &hunt, &search, &page.hits).await;
        for outcome in outcomes {
            apply_outcome(&mut hunt, outcome);
        }
        if hunt.failed_session_ids.len() > FAILED_SESSION_CAP {
            let _ = state.stores.db.clear_scroll(scroll).await;
            fail_hunt(
                state,
                &mut hunt,
                format!("More than {FAILED_SESSION_CAP} unreachable sessions"),
                false,
            )
            .await;
            return;
        }
        if let Some(page_max) = page.hits.iter().map(|h| h.session.last_packet).max() {
            hunt.last_packet_time = Some(hunt.last_packet_time.unwrap_or(0).max(page_max));
        }

        if last_checkpoint.elapsed() >= CHECKPOINT_INTERVAL {
            last_checkpoint = Instant::now();
            if checkpoint(state, &mut hunt).await == CheckpointResult::PauseRequested {
                let _ = state.stores.db.clear_scroll(scroll).await;
                info!("Hunt {} paused at {:?}", hunt.id, hunt.last_packet_time);
                return;
            }
        }

        page = match state.stores.db.scroll_sessions(&scroll).await {
            Ok(page) => page,
            Err(e) => {
                fail_hunt(state, &mut hunt, format!("Scroll failed: {e}"), false).await;
                return;
            }
        };
    }
    let _ = state.stores.db.clear_scroll(scroll).await;

    if !hunt.failed_session_ids.is_empty() {
        if !failed_sessions_pass(state, &mut hunt, &search).await {
            return;
        }
    }

    hunt.status = HuntStatus::Finished;
    hunt.last_updated = unix_now().unwrap_or(0);
    if let Err(e) = state.stores.db.update_hunt(&hunt).await {
        error!("Unable to persist finished hunt {}: {e}", hunt.id);
        return;
    }
    info!(
        "Hunt {} finished: {} matched of {} searched",
        hunt.id, hunt.matched_sessions, hunt.searched_sessions
    );
    if let Some(notifier) = &hunt.notifier {
        state
            .notifier
            .send(
                notifier,
                &format!(
                    "Hunt {} finished: {} matched of {} sessions",
                    hunt.name, hunt.matched_sessions, hunt.searched_sessions
                ),
            )
            .await;
    }
}

fn apply_outcome(hunt: &mut Hunt, outcome: Outcome) {
    if outcome.failed {
        if !hunt.failed_session_ids.contains(&outcome.session_id) {
            hunt.failed_session_ids.push(outcome.session_id);
        }
        return;
    }
    hunt.searched_sessions += 1;
    if outcome.matched {
        hunt.matched_sessions += 1;
    }
    if let Some(text) = outcome.error {
        let now = unix_now().unwrap_or(0);
        hunt.errors.push(owlcap_store::HuntError {
            value: text,
            time: now,
            unrunnable: None,
        });
    }
}

#[derive(PartialEq)]
enum CheckpointResult {
    Continue,
    PauseRequested,
}

/// Persists progress and picks up pause requests written by the API.
async fn checkpoint(state: &AppState, hunt: &mut Hunt) -> CheckpointResult {
    let pause_requested = match state.stores.db.get_hunt(&hunt.id).await {
        Ok(fresh) => fresh.status == HuntStatus::Paused,
        Err(e) => {
            warn!("Unable to reload hunt {} at checkpoint: {e}", hunt.id);
            false
        }
    };
    if pause_requested {
        hunt.status = HuntStatus::Paused;
    }
    hunt.last_updated = unix_now().unwrap_or(0);
    if let Err(e) = state.stores.db.update_hunt(hunt).await {
        warn!("Checkpoint write failed for hunt {}: {e}", hunt.id);
    }
    if pause_requested {
        CheckpointResult::PauseRequested
    } else {
        CheckpointResult::Continue
    }
}

async fn fail_hunt(state: &AppState, hunt: &mut Hunt, text: String, unrunnable: bool) {
    warn!("Hunt {} failed: {text}", hunt.id);
    let now = unix_now().unwrap_or(0);
    hunt.fail(text, now, unrunnable);
    hunt.last_updated = now;
    if let Err(e) = state.stores.db.update_hunt(hunt).await {
        error!("Unable to persist failed hunt {}: {e}", hunt.id);
    }
}

/// Fans a page out across the bounded worker pool.
async fn scan_page(
    state: &Arc<AppState>,
    hunt: &Hunt,
    search: &Arc<PacketSearch>,
    hits: &[SessionHit],
) -> Vec<Outcome> {
    let semaphore = Arc::new(Semaphore::new(SESSION_CONCURRENCY));
    let mut set = JoinSet::new();
    for hit in hits {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };
        let state = state.clone();
        let search = search.clone();
        let hunt_id = hunt.id.clone();
        let hunt_name = hunt.name.clone();
        let user_id = hunt.user_id.clone();
        let session_id = hit.id.clone();
        let node = hit.session.node.clone();
        let has_files = !hit.session.file_id.is_empty();
        set.spawn(async move {
            let _permit = permit;
            search_one(
                &state, &search, &hunt_id, &hunt_name, &user_id, &session_id, &node, has_files,
            )
            .await
        });
    }
    let mut outcomes = Vec::with_capacity(hits.len());
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => error!("Hunt worker panicked: {e}"),
        }
    }
    outcomes
}

/// Searches one session, locally or via the owning node.
#[allow(clippy::too_many_arguments)]
async fn search_one(
    state: &AppState,
    search: &PacketSearch,
    hunt_id: &str,
    hunt_name: &str,
    user_id: &str,
    session_id: &str,
    node: &str,
    has_files: bool,
) -> Outcome {
    if !has_files {
        // Nothing on disk; counts as searched with no match.
        return Outcome {
            session_id: session_id.to_string(),
            matched: false,
            failed: false,
            error: None,
        };
    }
    if state.cluster.is_local(node) {
        local_search(state, search, hunt_id, hunt_name, session_id).await
    } else {
        remote_search(state, hunt_id, user_id, session_id, node).await
    }
}

/// Runs the matcher over locally owned packet bytes, tagging the session
/// document on a hit.
pub async fn local_search(
    state: &AppState,
    search: &PacketSearch,
    hunt_id: &str,
    hunt_name: &str,
    session_id: &str,
) -> Outcome {
    let session = match state.stores.db.get_session(session_id).await {
        Ok(session) => session,
        Err(_) => {
            return Outcome {
                session_id: session_id.to_string(),
                matched: false,
                failed: true,
                error: None,
            }
        }
    };
    let Some(fp) = SessionFingerprint::from_strings(
        &session.src_ip,
        session.src_port,
        &session.dst_ip,
        session.dst_port,
    ) else {
        return Outcome {
            session_id: session_id.to_string(),
            matched: false,
            failed: false,
            error: Some(format!("Session {session_id} has no usable fingerprint")),
        };
    };
    let packets = match pcaps::session_packets(state, &session).await {
        Ok(packets) => packets,
        Err(e) => {
            return Outcome {
                session_id: session_id.to_string(),
                matched: false,
                failed: false,
                error: Some(format!("Packet read failed for {session_id}: {e}")),
            }
        }
    };
    let matched = search.search(&packets, &fp);
    if matched {
        if let Err(e) = state
            .stores
            .db
            .add_hunt_to_session(session_id, hunt_id, hunt_name)
            .await
        {
            return Outcome {
                session_id: session_id.to_string(),
                matched: true,
                failed: false,
                error: Some(format!("Unable to mark session {session_id}: {e}")),
            };
        }
    }
    Outcome {
        session_id: session_id.to_string(),
        matched,
        failed: false,
        error: None,
    }
}

/// Asks the owning node to run the search. Transport failure lands the
/// session on the retry list; an error answer counts as searched.
async fn remote_search(
    state: &AppState,
    hunt_id: &str,
    user_id: &str,
    session_id: &str,
    node: &str,
) -> Outcome {
    let failed = |session_id: &str| Outcome {
        session_id: session_id.to_string(),
        matched: false,
        failed: true,
        error: None,
    };

    let Ok(info) = resolver::node_info(state, node).await else {
        return failed(session_id);
    };
    let path = format!("/{node}/hunt/{hunt_id}/remote/{session_id}");
    let Ok(token) = sign_peer(state.config.server_secret_or_password(), user_id, &path) else {
        return failed(session_id);
    };
    let url = format!("{}{}", info.view_url.trim_end_matches('/'), path);
    let client = state.cluster.peers.for_scheme(info.scheme());
    let resp = match client
        .get(&url)
        .header(PEER_AUTH_HEADER, token)
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(_) => return failed(session_id),
    };
    let body: serde_json::Value = match resp.json().await {
        Ok(body) => body,
        Err(_) => return failed(session_id),
    };
    Outcome {
        session_id: session_id.to_string(),
        matched: body["matched"].as_bool().unwrap_or(false),
        failed: false,
        error: body["error"].as_str().map(|s| s.to_string()),
    }
}

/// Retries the unreachable sessions until the list drains or a full pass
/// makes no progress. Returns false when the hunt paused.
async fn failed_sessions_pass(
    state: &Arc<AppState>,
    hunt: &mut Hunt,
    search: &Arc<PacketSearch>,
) -> bool {
    while !hunt.failed_session_ids.is_empty() {
        let before = hunt.failed_session_ids.len();
        let ids = std::mem::take(&mut hunt.failed_session_ids);

        let semaphore = Arc::new(Semaphore::new(SESSION_CONCURRENCY));
        let mut set = JoinSet::new();
        for session_id in ids {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                break;
            };
            let state = state.clone();
            let search = search.clone();
            let hunt_id = hunt.id.clone();
            let hunt_name = hunt.name.clone();
            let user_id = hunt.user_id.clone();
            set.spawn(async move {
                let _permit = permit;
                retry_one(&state, &search, &hunt_id, &hunt_name, &user_id, &session_id).await
            });
        }
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(outcome) => apply_outcome(hunt, outcome),
                Err(e) => error!("Hunt retry worker panicked: {e}"),
            }
        }

        if checkpoint(state, hunt).await == CheckpointResult::PauseRequested {
            return false;
        }
        if hunt.failed_session_ids.len() == before {
            fail_hunt(
                state,
                hunt,
                format!("{before} unreachable sessions after retry"),
                false,
            )
            .await;
            return false;
        }
    }
    true
}

/// A failed-list entry needs its owning node looked up again before it can
/// be dispatched.
async fn retry_one(
    state: &AppState,
    search: &PacketSearch,
    hunt_id: &str,
    hunt_name: &str,
    user_id: &str,
    session_id: &str,
) -> Outcome {
    let session = match state.stores.db.get_session(session_id).await {
        Ok(session) => session,
        Err(_) => {
            return Outcome {
                session_id: session_id.to_string(),
                matched: false,
                failed: true,
                error: None,
            }
        }
    };
    search_one(
        state,
        search,
        hunt_id,
        hunt_name,
        user_id,
        session_id,
        &session.node,
        !session.file_id.is_empty(),
    )
    .await
}
