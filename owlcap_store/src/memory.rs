//! In-memory datastore. Backs the engine and handler tests; evaluates the
//! filter tree directly against serialized documents.

use crate::datastore::{Datastore, ScrollId, SearchPage, SessionHit, SessionQuery};
use crate::documents::{
    CronQuery, HistoryEntry, Hunt, Lookup, NodeInfo, PcapFileDoc, Session, User,
};
use crate::error::StoreError;
use crate::filter::Filter;
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct ScrollState {
    hits: Vec<SessionHit>,
    pos: usize,
    page_size: usize,
    total: u64,
}

/// DashMap-backed store, one map per index.
#[derive(Default)]
pub struct MemoryDatastore {
    sessions: DashMap<String, Session>,
    hunts: DashMap<String, Hunt>,
    crons: DashMap<String, CronQuery>,
    users: DashMap<String, User>,
    files: DashMap<String, PcapFileDoc>,
    lookups: DashMap<String, Lookup>,
    nodes: DashMap<String, NodeInfo>,
    scrolls: DashMap<String, ScrollState>,
    history: Mutex<Vec<HistoryEntry>>,
    cancelled: Mutex<Vec<String>>,
}

impl MemoryDatastore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a session. Test helper.
    pub fn put_session(&self, session: Session) {
        self.sessions.insert(session.id.clone(), session);
    }

    /// Seed a user. Test helper.
    pub fn put_user(&self, user: User) {
        self.users.insert(user.user_id.clone(), user);
    }

    /// Seed a file row. Test helper.
    pub fn put_file(&self, file: PcapFileDoc) {
        self.files
            .insert(PcapFileDoc::doc_id(&file.node, file.num), file);
    }

    /// Everything written to the history index so far. Test helper.
    pub fn history_entries(&self) -> Vec<HistoryEntry> {
        self.history.lock().unwrap().clone()
    }

    /// Task ids passed to `cancel_task`. Test helper.
    pub fn cancelled_tasks(&self) -> Vec<String> {
        self.cancelled.lock().unwrap().clone()
    }

    fn matching_sessions(&self, query: &SessionQuery) -> Vec<SessionHit> {
        let mut hits: Vec<(i64, SessionHit)> = self
            .sessions
            .iter()
            .filter_map(|entry| {
                let doc = serde_json::to_value(entry.value()).ok()?;
                if !query.filter.matches(&doc) {
                    return None;
                }
                let sort_key = doc.get(&query.sort_field).and_then(Value::as_i64).unwrap_or(0);
                let mut session = entry.value().clone();
                session.id = entry.key().clone();
                Some((
                    sort_key,
                    SessionHit {
                        id: entry.key().clone(),
                        session,
                    },
                ))
            })
            .collect();
        hits.sort_by_key(|(key, _)| *key);
        if !query.sort_asc {
            hits.reverse();
        }
        hits.into_iter().map(|(_, hit)| hit).collect()
    }
}

#[async_trait]
impl Datastore for MemoryDatastore {
    async fn get_session(&self, id: &str) -> Result<Session, StoreError> {
        self.sessions
            .get(id)
            .map(|s| {
                let mut session = s.clone();
                session.id = id.to_string();
                session
            })
            .ok_or_else(|| StoreError::NotFound(format!("session {id}")))
    }

    async fn create_session(&self, session: &Session) -> Result<String, StoreError> {
        let id = if session.id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            session.id.clone()
        };
        let mut session = session.clone();
        session.id = id.clone();
        self.sessions.insert(id.clone(), session);
        Ok(id)
    }

    async fn search_sessions(&self, query: &SessionQuery) -> Result<SearchPage, StoreError> {
        let all = self.matching_sessions(query);
        let total = all.len() as u64;
        Ok(SearchPage {
            total,
            hits: all.into_iter().take(query.size).collect(),
        })
    }

    async fn start_session_scroll(
        &self,
        query: &SessionQuery,
    ) -> Result<(ScrollId, SearchPage), StoreError> {
        let all = self.matching_sessions(query);
        let total = all.len() as u64;
        let id = Uuid::new_v4().to_string();
        let first: Vec<SessionHit> = all.iter().take(query.size).cloned().collect();
        self.scrolls.insert(
            id.clone(),
            ScrollState {
                pos: first.len(),
                hits: all,
                page_size: query.size,
                total,
            },
        );
        Ok((ScrollId(id), SearchPage { total, hits: first }))
    }

    async fn scroll_sessions(&self, scroll: &ScrollId) -> Result<SearchPage, StoreError> {
        let mut state = self
            .scrolls
            .get_mut(&scroll.0)
            .ok_or_else(|| StoreError::NotFound(format!("scroll {}", scroll.0)))?;
        let end = (state.pos + state.page_size).min(state.hits.len());
        let hits: Vec<SessionHit> = state.hits[state.pos..end].to_vec();
        state.pos = end;
        Ok(SearchPage {
            total: state.total,
            hits,
        })
    }

    async fn clear_scroll(&self, scroll: ScrollId) -> Result<(), StoreError> {
        self.scrolls.remove(&scroll.0);
        Ok(())
    }

    async fn update_session(&self, id: &str, body: &Value) -> Result<(), StoreError> {
        let mut entry = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("session {id}")))?;
        let mut doc = serde_json::to_value(&*entry)?;
        if let (Value::Object(doc), Value::Object(patch)) = (&mut doc, body) {
            for (k, v) in patch {
                doc.insert(k.clone(), v.clone());
            }
        }
        let mut updated: Session = serde_json::from_value(doc)?;
        updated.id = id.to_string();
        *entry = updated;
        Ok(())
    }

    async fn delete_session(&self, id: &str) -> Result<(), StoreError> {
        self.sessions
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("session {id}")))
    }

    async fn add_tags_to_session(&self, id: &str, tags: &[String]) -> Result<(), StoreError> {
        let mut entry = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("session {id}")))?;
        for tag in tags {
            if !entry.tags.contains(tag) {
                entry.tags.push(tag.clone());
            }
        }
        Ok(())
    }

    async fn add_hunt_to_session(
        &self,
        id: &str,
        hunt_id: &str,
        hunt_name: &str,
    ) -> Result<(), StoreError> {
        let mut entry = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("session {id}")))?;
        if !entry.hunt_id.iter().any(|h| h == hunt_id) {
            entry.hunt_id.push(hunt_id.to_string());
        }
        if !entry.hunt_name.iter().any(|h| h == hunt_name) {
            entry.hunt_name.push(hunt_name.to_string());
        }
        Ok(())
    }

    async fn create_hunt(&self, hunt: &Hunt) -> Result<String, StoreError> {
        let id = if hunt.id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            hunt.id.clone()
        };
        let mut hunt = hunt.clone();
        hunt.id = id.clone();
        self.hunts.insert(id.clone(), hunt);
        Ok(id)
    }

    async fn get_hunt(&self, id: &str) -> Result<Hunt, StoreError> {
        self.hunts
            .get(id)
            .map(|h| {
                let mut hunt = h.clone();
                hunt.id = id.to_string();
                hunt
            })
            .ok_or_else(|| StoreError::NotFound(format!("hunt {id}")))
    }

    async fn update_hunt(&self, hunt: &Hunt) -> Result<(), StoreError> {
        if !self.hunts.contains_key(&hunt.id) {
            return Err(StoreError::NotFound(format!("hunt {}", hunt.id)));
        }
        self.hunts.insert(hunt.id.clone(), hunt.clone());
        Ok(())
    }

    async fn delete_hunt(&self, id: &str) -> Result<(), StoreError> {
        self.hunts
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("hunt {id}")))
    }

    async fn list_hunts(&self) -> Result<Vec<Hunt>, StoreError> {
        let mut hunts: Vec<Hunt> = self
            .hunts
            .iter()
            .map(|entry| {
                let mut hunt = entry.value().clone();
                hunt.id = entry.key().clone();
                hunt
            })
            .collect();
        hunts.sort_by_key(|h| h.created);
        Ok(hunts)
    }

    async fn create_cron(&self, cron: &CronQuery) -> Result<String, StoreError> {
        let id = if cron.id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            cron.id.clone()
        };
        let mut cron = cron.clone();
        cron.id = id.clone();
        self.crons.insert(id.clone(), cron);
        Ok(id)
    }

    async fn get_cron(&self, id: &str) -> Result<CronQuery, StoreError> {
        self.crons
            .get(id)
            .map(|c| {
                let mut cron = c.clone();
                cron.id = id.to_string();
                cron
            })
            .ok_or_else(|| StoreError::NotFound(format!("cron {id}")))
    }

    async fn update_cron(&self, cron: &CronQuery) -> Result<(), StoreError> {
        if !self.crons.contains_key(&cron.id) {
            return Err(StoreError::NotFound(format!("cron {}", cron.id)));
        }
        self.crons.insert(cron.id.clone(), cron.clone());
        Ok(())
    }

    async fn delete_cron(&self, id: &str) -> Result<(), StoreError> {
        self.crons
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("cron {id}")))
    }

    async fn list_crons(&self) -> Result<Vec<CronQuery>, StoreError> {
        let mut crons: Vec<CronQuery> = self
            .crons
            .iter()
            .map(|entry| {
                let mut cron = entry.value().clone();
                cron.id = entry.key().clone();
                cron
            })
            .collect();
        crons.sort_by(|a, b| a.name.cmp(&b.name));
        crons.truncate(1000);
        Ok(crons)
    }

    async fn get_user(&self, user_id: &str) -> Result<User, StoreError> {
        self.users
            .get(user_id)
            .map(|u| u.clone())
            .ok_or_else(|| StoreError::NotFound(format!("user {user_id}")))
    }

    async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        self.users.insert(user.user_id.clone(), user.clone());
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self.users.iter().map(|u| u.clone()).collect();
        users.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(users)
    }

    async fn get_file(&self, node: &str, num: i64) -> Result<PcapFileDoc, StoreError> {
        let id = PcapFileDoc::doc_id(node, num);
        self.files
            .get(&id)
            .map(|f| {
                let mut file = f.clone();
                file.id = id.clone();
                file
            })
            .ok_or_else(|| StoreError::NotFound(format!("file {id}")))
    }

    async fn create_file(&self, file: &PcapFileDoc) -> Result<(), StoreError> {
        self.put_file(file.clone());
        Ok(())
    }

    async fn oldest_unlocked_files(
        &self,
        node: &str,
        dir_wildcards: &[String],
        limit: usize,
    ) -> Result<Vec<PcapFileDoc>, StoreError> {
        let name_filter = Filter::Or(
            dir_wildcards
                .iter()
                .map(|w| Filter::Wildcard {
                    field: "name".to_string(),
                    pattern: w.clone(),
                })
                .collect(),
        );
        let mut files: Vec<PcapFileDoc> = self
            .files
            .iter()
            .filter(|entry| entry.node == node && !entry.locked)
            .filter(|entry| {
                serde_json::to_value(entry.value())
                    .map(|doc| name_filter.matches(&doc))
                    .unwrap_or(false)
            })
            .map(|entry| {
                let mut file = entry.value().clone();
                file.id = entry.key().clone();
                file
            })
            .collect();
        files.sort_by_key(|f| f.first);
        files.truncate(limit);
        Ok(files)
    }

    async fn delete_file(&self, node: &str, num: i64) -> Result<(), StoreError> {
        let id = PcapFileDoc::doc_id(node, num);
        self.files
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("file {id}")))
    }

    async fn file_count(&self, node: &str) -> Result<u64, StoreError> {
        Ok(self.files.iter().filter(|f| f.node == node).count() as u64)
    }

    async fn list_files(&self, node: &str) -> Result<Vec<PcapFileDoc>, StoreError> {
        let mut files: Vec<PcapFileDoc> = self
            .files
            .iter()
            .filter(|f| f.node == node)
            .map(|entry| {
                let mut file = entry.value().clone();
                file.id = entry.key().clone();
                file
            })
            .collect();
        files.sort_by_key(|f| f.num);
        Ok(files)
    }

    async fn get_lookup(&self, name: &str) -> Result<Lookup, StoreError> {
        self.lookups
            .get(name)
            .map(|l| l.clone())
            .ok_or_else(|| StoreError::NotFound(format!("lookup {name}")))
    }

    async fn create_lookup(&self, lookup: &Lookup) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let mut lookup = lookup.clone();
        lookup.id = id.clone();
        self.lookups.insert(lookup.name.clone(), lookup);
        Ok(id)
    }

    async fn list_lookups(&self) -> Result<Vec<Lookup>, StoreError> {
        Ok(self.lookups.iter().map(|l| l.clone()).collect())
    }

    async fn add_history(&self, entry: &HistoryEntry) -> Result<(), StoreError> {
        self.history.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn get_node(&self, name: &str) -> Result<NodeInfo, StoreError> {
        self.nodes
            .get(name)
            .map(|n| n.clone())
            .ok_or_else(|| StoreError::NotFound(format!("node {name}")))
    }

    async fn list_nodes(&self) -> Result<Vec<NodeInfo>, StoreError> {
        Ok(self.nodes.iter().map(|n| n.clone()).collect())
    }

    async fn register_node(&self, node: &NodeInfo) -> Result<(), StoreError> {
        self.nodes.insert(node.node_name.clone(), node.clone());
        Ok(())
    }

    async fn cancel_task(&self, task_id: &str) -> Result<(), StoreError> {
        self.cancelled.lock().unwrap().push(task_id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn session(id: &str, last_packet: u64) -> Session {
        Session {
            id: id.to_string(),
            node: "capture01".to_string(),
            last_packet,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn scroll_pages_in_sort_order() {
        let store = MemoryDatastore::new();
        for i in 0..25 {
            store.put_session(session(&format!("s{i}"), 1000 + i));
        }
        let query = SessionQuery::new(Filter::MatchAll).with_size(10);
        let (scroll, first) = store.start_session_scroll(&query).await.unwrap();
        assert_eq!(first.total, 25);
        assert_eq!(first.hits.len(), 10);
        assert_eq!(first.hits[0].session.last_packet, 1000);

        let second = store.scroll_sessions(&scroll).await.unwrap();
        assert_eq!(second.hits.len(), 10);
        assert_eq!(second.hits[0].session.last_packet, 1010);

        let third = store.scroll_sessions(&scroll).await.unwrap();
        assert_eq!(third.hits.len(), 5);
        let done = store.scroll_sessions(&scroll).await.unwrap();
        assert!(done.hits.is_empty());
        store.clear_scroll(scroll).await.unwrap();
    }

    #[tokio::test]
    async fn tag_append_is_a_set() {
        let store = MemoryDatastore::new();
        let mut s = session("s1", 1000);
        s.tags = vec!["keep".to_string()];
        store.put_session(s);
        store
            .add_tags_to_session("s1", &["cron1".to_string(), "keep".to_string()])
            .await
            .unwrap();
        let got = store.get_session("s1").await.unwrap();
        assert_eq!(got.tags, vec!["keep", "cron1"]);
    }

    #[tokio::test]
    async fn update_preserves_unknown_keys() {
        let store = MemoryDatastore::new();
        let mut s = session("s1", 1000);
        s.extra.insert("totDataBytes".to_string(), json!(512));
        store.put_session(s);
        store
            .update_session("s1", &json!({ "scrubby": "admin" }))
            .await
            .unwrap();
        let got = store.get_session("s1").await.unwrap();
        assert_eq!(got.scrubby.as_deref(), Some("admin"));
        assert_eq!(got.extra["totDataBytes"], 512);
    }

    #[tokio::test]
    async fn users_list_in_id_order() {
        let store = MemoryDatastore::new();
        for id in ["carol", "alice", "bob"] {
            store.put_user(crate::documents::User {
                user_id: id.to_string(),
                enabled: true,
                roles: vec!["viewerUser".to_string()],
                ..Default::default()
            });
        }
        let users = store.list_users().await.unwrap();
        let ids: Vec<&str> = users.iter().map(|u| u.user_id.as_str()).collect();
        assert_eq!(ids, vec!["alice", "bob", "carol"]);
        assert!(users[0].has_role("viewerUser"));
    }

    #[tokio::test]
    async fn oldest_files_respect_lock_and_wildcards() {
        let store = MemoryDatastore::new();
        for (num, first, locked, dir) in [
            (1, 100, false, "/data/pcap0"),
            (2, 50, true, "/data/pcap0"),
            (3, 75, false, "/data/pcap0"),
            (4, 10, false, "/elsewhere"),
        ] {
            store.put_file(PcapFileDoc {
                node: "capture01".to_string(),
                num,
                first,
                locked,
                name: format!("{dir}/cap-{num}.pcap"),
                ..Default::default()
            });
        }
        let files = store
            .oldest_unlocked_files("capture01", &["/data/pcap0/*".to_string()], 200)
            .await
            .unwrap();
        let nums: Vec<i64> = files.iter().map(|f| f.num).collect();
        assert_eq!(nums, vec![3, 1]);
    }
}
