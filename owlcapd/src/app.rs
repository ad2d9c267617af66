//! Process state, split into four injected contexts so each piece can be
//! constructed in isolation: cluster (who we are, who our peers are),
//! stores (documents + pcap handles), auth (secrets + caches), engines
//! (channel handles into the background singletons).

use crate::peer::proxy::PeerClients;
use owlcap_config::Config;
use owlcap_pcap::HandleCache;
use owlcap_store::{Datastore, LookupCache, MemoryDatastore, UserCache};
use std::sync::Arc;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::sync::Mutex;

/// Wakes the hunt scheduler: a new hunt was queued, a paused hunt was
/// replayed, or a pass made progress worth another look.
#[derive(Debug)]
pub enum HuntMessage {
    Kick,
}

/// Wakes the cron engine outside its 60 s tick, after any cron mutation.
#[derive(Debug)]
pub enum CronMessage {
    Kick,
}

/// Who we are and how to reach the rest of the fleet.
pub struct ClusterCtx {
    pub node_name: String,
    pub peers: PeerClients,
}

impl ClusterCtx {
    /// Local iff the session's owning node is this process.
    pub fn is_local(&self, node: &str) -> bool {
        node == self.node_name
    }
}

/// Documents and local packet bytes.
pub struct StoreCtx {
    pub db: Arc<dyn Datastore>,
    pub handles: HandleCache,
}

/// Secrets and the per-process caches the auth chain consults.
pub struct AuthCtx {
    pub users: UserCache,
    pub lookups: LookupCache,
    /// Serializes lookup existence-check + create.
    pub lookup_create_lock: Mutex<()>,
}

/// Handles into the background singletons. The two flags are the
/// singleton slots: at most one hunt and one cron pass in flight.
pub struct EngineCtx {
    pub hunt_tx: Sender<HuntMessage>,
    pub cron_tx: Sender<CronMessage>,
    pub hunt_running: std::sync::atomic::AtomicBool,
    pub cron_running: std::sync::atomic::AtomicBool,
}

impl EngineCtx {
    /// Nudge the hunt scheduler; dropping the message is fine, the timer
    /// tick will get there eventually.
    pub fn kick_hunts(&self) {
        let _ = self.hunt_tx.try_send(HuntMessage::Kick);
    }

    pub fn kick_crons(&self) {
        let _ = self.cron_tx.try_send(CronMessage::Kick);
    }
}

pub struct AppState {
    pub config: Config,
    pub cluster: ClusterCtx,
    pub stores: StoreCtx,
    pub auth: AuthCtx,
    pub engines: EngineCtx,
    pub notifier: crate::notifier::Notifier,
}

impl AppState {
    /// Builds the state and hands back the engine receivers for the caller
    /// to spawn the background tasks with.
    pub fn build(
        config: Config,
        db: Arc<dyn Datastore>,
    ) -> (Arc<AppState>, Receiver<HuntMessage>, Receiver<CronMessage>) {
        let (hunt_tx, hunt_rx) = mpsc::channel(16);
        let (cron_tx, cron_rx) = mpsc::channel(16);
        let state = Arc::new(AppState {
            cluster: ClusterCtx {
                node_name: config.node_name.clone(),
                peers: PeerClients::new(),
            },
            stores: StoreCtx {
                db,
                handles: HandleCache::new(),
            },
            auth: AuthCtx {
                users: UserCache::new(),
                lookups: LookupCache::new(),
                lookup_create_lock: Mutex::new(()),
            },
            engines: EngineCtx {
                hunt_tx,
                cron_tx,
                hunt_running: std::sync::atomic::AtomicBool::new(false),
                cron_running: std::sync::atomic::AtomicBool::new(false),
            },
            notifier: crate::notifier::Notifier::new(),
            config,
        });
        (state, hunt_rx, cron_rx)
    }

    /// In-memory state for tests.
    pub fn for_tests(config: Config) -> (Arc<AppState>, Arc<MemoryDatastore>) {
        let db = Arc::new(MemoryDatastore::new());
        let (state, _hunt_rx, _cron_rx) = Self::build(config, db.clone());
        (state, db)
    }
}
