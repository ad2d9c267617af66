//! The typed index/search/scroll/update facade the rest of the system
//! programs against.

use crate::documents::{
    CronQuery, HistoryEntry, Hunt, Lookup, NodeInfo, PcapFileDoc, Session, User,
};
use crate::error::StoreError;
use crate::filter::Filter;
use async_trait::async_trait;
use serde_json::Value;

/// A session search: a compiled filter plus paging/sorting knobs.
#[derive(Clone, Debug)]
pub struct SessionQuery {
    pub filter: Filter,
    /// Fields to pull back; empty means everything.
    pub source: Vec<String>,
    pub size: usize,
    pub sort_field: String,
    pub sort_asc: bool,
}

impl SessionQuery {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            source: Vec::new(),
            size: 100,
            sort_field: "lastPacket".to_string(),
            sort_asc: true,
        }
    }

    pub fn with_source(mut self, fields: &[&str]) -> Self {
        self.source = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }
}

/// One hit from a search or scroll page.
#[derive(Clone, Debug)]
pub struct SessionHit {
    pub id: String,
    pub session: Session,
}

/// One page of results. `total` counts every match, not just this page.
#[derive(Clone, Debug, Default)]
pub struct SearchPage {
    pub total: u64,
    pub hits: Vec<SessionHit>,
}

/// Opaque scroll cursor.
#[derive(Clone, Debug)]
pub struct ScrollId(pub String);

/// Typed facade over the session index and its siblings. The Elasticsearch
/// implementation is the production path; the in-memory one drives tests.
#[async_trait]
pub trait Datastore: Send + Sync {
    // -- sessions ---------------------------------------------------------
    async fn get_session(&self, id: &str) -> Result<Session, StoreError>;
    /// Indexes a new session document (the receive path). Returns its id.
    async fn create_session(&self, session: &Session) -> Result<String, StoreError>;
    async fn search_sessions(&self, query: &SessionQuery) -> Result<SearchPage, StoreError>;
    /// Opens a cursor and returns the first page with it.
    async fn start_session_scroll(
        &self,
        query: &SessionQuery,
    ) -> Result<(ScrollId, SearchPage), StoreError>;
    async fn scroll_sessions(&self, scroll: &ScrollId) -> Result<SearchPage, StoreError>;
    async fn clear_scroll(&self, scroll: ScrollId) -> Result<(), StoreError>;
    /// Shallow-merges `body` into the stored document.
    async fn update_session(&self, id: &str, body: &Value) -> Result<(), StoreError>;
    async fn delete_session(&self, id: &str) -> Result<(), StoreError>;
    /// Atomic append; concurrent writers both land.
    async fn add_tags_to_session(&self, id: &str, tags: &[String]) -> Result<(), StoreError>;
    async fn add_hunt_to_session(
        &self,
        id: &str,
        hunt_id: &str,
        hunt_name: &str,
    ) -> Result<(), StoreError>;

    // -- hunts ------------------------------------------------------------
    async fn create_hunt(&self, hunt: &Hunt) -> Result<String, StoreError>;
    async fn get_hunt(&self, id: &str) -> Result<Hunt, StoreError>;
    async fn update_hunt(&self, hunt: &Hunt) -> Result<(), StoreError>;
    async fn delete_hunt(&self, id: &str) -> Result<(), StoreError>;
    async fn list_hunts(&self) -> Result<Vec<Hunt>, StoreError>;

    // -- cron queries -----------------------------------------------------
    async fn create_cron(&self, cron: &CronQuery) -> Result<String, StoreError>;
    async fn get_cron(&self, id: &str) -> Result<CronQuery, StoreError>;
    async fn update_cron(&self, cron: &CronQuery) -> Result<(), StoreError>;
    async fn delete_cron(&self, id: &str) -> Result<(), StoreError>;
    /// All cron queries, capped at 1000.
    async fn list_crons(&self) -> Result<Vec<CronQuery>, StoreError>;

    // -- users ------------------------------------------------------------
    async fn get_user(&self, user_id: &str) -> Result<User, StoreError>;
    async fn create_user(&self, user: &User) -> Result<(), StoreError>;
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    // -- files ------------------------------------------------------------
    async fn get_file(&self, node: &str, num: i64) -> Result<PcapFileDoc, StoreError>;
    /// Registers a file this node just wrote (the receive path).
    async fn create_file(&self, file: &PcapFileDoc) -> Result<(), StoreError>;
    /// Oldest unlocked files for a node whose path matches one of the
    /// directory wildcards, sorted `first:asc`.
    async fn oldest_unlocked_files(
        &self,
        node: &str,
        dir_wildcards: &[String],
        limit: usize,
    ) -> Result<Vec<PcapFileDoc>, StoreError>;
    async fn delete_file(&self, node: &str, num: i64) -> Result<(), StoreError>;
    async fn file_count(&self, node: &str) -> Result<u64, StoreError>;
    async fn list_files(&self, node: &str) -> Result<Vec<PcapFileDoc>, StoreError>;

    // -- lookups ----------------------------------------------------------
    async fn get_lookup(&self, name: &str) -> Result<Lookup, StoreError>;
    async fn create_lookup(&self, lookup: &Lookup) -> Result<String, StoreError>;
    async fn list_lookups(&self) -> Result<Vec<Lookup>, StoreError>;

    // -- history ----------------------------------------------------------
    async fn add_history(&self, entry: &HistoryEntry) -> Result<(), StoreError>;

    // -- fleet map --------------------------------------------------------
    async fn get_node(&self, name: &str) -> Result<NodeInfo, StoreError>;
    async fn list_nodes(&self) -> Result<Vec<NodeInfo>, StoreError>;
    async fn register_node(&self, node: &NodeInfo) -> Result<(), StoreError>;

    // -- admin ------------------------------------------------------------
    async fn cancel_task(&self, task_id: &str) -> Result<(), StoreError>;
}
