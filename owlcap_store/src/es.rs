//! The Elasticsearch-backed datastore. A thin typed layer over the REST
//! API; everything interesting lives behind the [`Datastore`] trait.

use crate::datastore::{Datastore, ScrollId, SearchPage, SessionHit, SessionQuery};
use crate::documents::{
    CronQuery, HistoryEntry, Hunt, Lookup, NodeInfo, PcapFileDoc, Session, User,
};
use crate::error::StoreError;
use crate::filter::Filter;
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{json, Value};
use tracing::warn;

const SESSION_SEARCH_INDEX: &str = "sessions2-*";
/// Locally indexed sessions (the receive path) land here.
const SESSION_WRITE_INDEX: &str = "sessions2-received";
const HUNTS_INDEX: &str = "hunts";
const QUERIES_INDEX: &str = "queries";
const USERS_INDEX: &str = "users";
const FILES_INDEX: &str = "files";
const LOOKUPS_INDEX: &str = "lookups";
const HISTORY_INDEX: &str = "history";
const NODES_INDEX: &str = "nodes";
const SCROLL_KEEP_ALIVE: &str = "2m";

pub struct EsDatastore {
    base_url: String,
    client: reqwest::Client,
    /// Session writes need the concrete backing index; hits remember where
    /// they came from.
    session_index: DashMap<String, String>,
}

impl EsDatastore {
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .build()
            .map_err(StoreError::from)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            session_index: DashMap::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, StoreError> {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await?;
        Self::read_json(resp).await
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value, StoreError> {
        let resp = self.client.put(self.url(path)).json(body).send().await?;
        Self::read_json(resp).await
    }

    async fn get_json(&self, path: &str) -> Result<Value, StoreError> {
        let resp = self.client.get(self.url(path)).send().await?;
        Self::read_json(resp).await
    }

    async fn delete_path(&self, path: &str) -> Result<Value, StoreError> {
        let resp = self.client.delete(self.url(path)).send().await?;
        Self::read_json(resp).await
    }

    async fn read_json(resp: reqwest::Response) -> Result<Value, StoreError> {
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(resp.url().path().to_string()));
        }
        let body: Value = resp.json().await?;
        if !status.is_success() {
            return Err(StoreError::Backend(body.to_string()));
        }
        Ok(body)
    }

    fn search_body(query: &SessionQuery) -> Value {
        let order = if query.sort_asc { "asc" } else { "desc" };
        let mut body = json!({
            "query": { "bool": { "filter": [query.filter.to_es_query()] } },
            "size": query.size,
            "sort": [{ query.sort_field.as_str(): { "order": order } }],
        });
        if !query.source.is_empty() {
            body["_source"] = json!(query.source);
        }
        body
    }

    fn parse_page(&self, body: &Value) -> SearchPage {
        let total = body["hits"]["total"]["value"].as_u64().unwrap_or(0);
        let hits = body["hits"]["hits"]
            .as_array()
            .map(|hits| {
                hits.iter()
                    .filter_map(|hit| {
                        let id = hit["_id"].as_str()?.to_string();
                        if let Some(index) = hit["_index"].as_str() {
                            self.session_index.insert(id.clone(), index.to_string());
                        }
                        let mut session: Session =
                            serde_json::from_value(hit["_source"].clone()).ok()?;
                        session.id = id.clone();
                        Some(SessionHit { id, session })
                    })
                    .collect()
            })
            .unwrap_or_default();
        SearchPage { total, hits }
    }

    /// The concrete index behind a session id, resolving through a search
    /// when the id hasn't been seen in a hit yet.
    async fn resolve_session_index(&self, id: &str) -> Result<String, StoreError> {
        if let Some(index) = self.session_index.get(id) {
            return Ok(index.clone());
        }
        let body = json!({
            "query": { "ids": { "values": [id] } },
            "size": 1,
            "_source": false,
        });
        let resp = self
            .post(&format!("{SESSION_SEARCH_INDEX}/_search"), &body)
            .await?;
        let index = resp["hits"]["hits"][0]["_index"]
            .as_str()
            .ok_or_else(|| StoreError::NotFound(format!("session {id}")))?
            .to_string();
        self.session_index.insert(id.to_string(), index.clone());
        Ok(index)
    }

    async fn append_script_update(
        &self,
        id: &str,
        field: &str,
        values: &[String],
    ) -> Result<(), StoreError> {
        let index = self.resolve_session_index(id).await?;
        let body = json!({
            "script": {
                "lang": "painless",
                "source": "if (ctx._source[params.field] == null) { \
                               ctx._source[params.field] = params.values; \
                           } else { \
                               for (v in params.values) { \
                                   if (!ctx._source[params.field].contains(v)) { \
                                       ctx._source[params.field].add(v); \
                                   } \
                               } \
                           }",
                "params": { "field": field, "values": values },
            }
        });
        self.post(&format!("{index}/_update/{id}?retry_on_conflict=3"), &body)
            .await?;
        Ok(())
    }

    async fn typed_get<T: serde::de::DeserializeOwned>(
        &self,
        index: &str,
        id: &str,
    ) -> Result<(String, T), StoreError> {
        let body = self.get_json(&format!("{index}/_doc/{id}")).await?;
        if body["found"] == false {
            return Err(StoreError::NotFound(format!("{index}/{id}")));
        }
        let doc = serde_json::from_value(body["_source"].clone())?;
        Ok((body["_id"].as_str().unwrap_or(id).to_string(), doc))
    }

    async fn typed_list<T: serde::de::DeserializeOwned>(
        &self,
        index: &str,
        body: &Value,
    ) -> Result<Vec<(String, T)>, StoreError> {
        let resp = self.post(&format!("{index}/_search"), body).await?;
        let mut out = Vec::new();
        if let Some(hits) = resp["hits"]["hits"].as_array() {
            for hit in hits {
                let id = hit["_id"].as_str().unwrap_or_default().to_string();
                match serde_json::from_value(hit["_source"].clone()) {
                    Ok(doc) => out.push((id, doc)),
                    Err(e) => warn!("Skipping undecodable {index} doc {id}: {e}"),
                }
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl Datastore for EsDatastore {
    async fn get_session(&self, id: &str) -> Result<Session, StoreError> {
        let index = self.resolve_session_index(id).await?;
        let (id, mut session): (String, Session) = self.typed_get(&index, id).await?;
        session.id = id;
        Ok(session)
    }

    async fn create_session(&self, session: &Session) -> Result<String, StoreError> {
        let body = serde_json::to_value(session)?;
        let resp = self
            .post(&format!("{SESSION_WRITE_INDEX}/_doc?refresh=true"), &body)
            .await?;
        let id = resp["_id"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| StoreError::Backend("create session returned no _id".to_string()))?;
        self.session_index
            .insert(id.clone(), SESSION_WRITE_INDEX.to_string());
        Ok(id)
    }

    async fn search_sessions(&self, query: &SessionQuery) -> Result<SearchPage, StoreError> {
        let body = Self::search_body(query);
        let resp = self
            .post(&format!("{SESSION_SEARCH_INDEX}/_search"), &body)
            .await?;
        Ok(self.parse_page(&resp))
    }

    async fn start_session_scroll(
        &self,
        query: &SessionQuery,
    ) -> Result<(ScrollId, SearchPage), StoreError> {
        let body = Self::search_body(query);
        let resp = self
            .post(
                &format!("{SESSION_SEARCH_INDEX}/_search?scroll={SCROLL_KEEP_ALIVE}"),
                &body,
            )
            .await?;
        let scroll_id = resp["_scroll_id"]
            .as_str()
            .ok_or_else(|| StoreError::Backend("search response missing _scroll_id".to_string()))?
            .to_string();
        Ok((ScrollId(scroll_id), self.parse_page(&resp)))
    }

    async fn scroll_sessions(&self, scroll: &ScrollId) -> Result<SearchPage, StoreError> {
        let body = json!({ "scroll": SCROLL_KEEP_ALIVE, "scroll_id": scroll.0 });
        let resp = self.post("_search/scroll", &body).await?;
        Ok(self.parse_page(&resp))
    }

    async fn clear_scroll(&self, scroll: ScrollId) -> Result<(), StoreError> {
        let resp = self
            .client
            .delete(self.url("_search/scroll"))
            .json(&json!({ "scroll_id": [scroll.0] }))
            .send()
            .await?;
        Self::read_json(resp).await.map(|_| ())
    }

    async fn update_session(&self, id: &str, body: &Value) -> Result<(), StoreError> {
        let index = self.resolve_session_index(id).await?;
        self.post(
            &format!("{index}/_update/{id}?retry_on_conflict=3"),
            &json!({ "doc": body }),
        )
        .await?;
        Ok(())
    }

    async fn delete_session(&self, id: &str) -> Result<(), StoreError> {
        let index = self.resolve_session_index(id).await?;
        self.delete_path(&format!("{index}/_doc/{id}?refresh=true"))
            .await?;
        self.session_index.remove(id);
        Ok(())
    }

    async fn add_tags_to_session(&self, id: &str, tags: &[String]) -> Result<(), StoreError> {
        self.append_script_update(id, "tags", tags).await
    }

    async fn add_hunt_to_session(
        &self,
        id: &str,
        hunt_id: &str,
        hunt_name: &str,
    ) -> Result<(), StoreError> {
        self.append_script_update(id, "huntId", &[hunt_id.to_string()])
            .await?;
        self.append_script_update(id, "huntName", &[hunt_name.to_string()])
            .await
    }

    async fn create_hunt(&self, hunt: &Hunt) -> Result<String, StoreError> {
        let body = serde_json::to_value(hunt)?;
        let resp = self
            .post(&format!("{HUNTS_INDEX}/_doc?refresh=true"), &body)
            .await?;
        resp["_id"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| StoreError::Backend("create hunt returned no _id".to_string()))
    }

    async fn get_hunt(&self, id: &str) -> Result<Hunt, StoreError> {
        let (id, mut hunt): (String, Hunt) = self.typed_get(HUNTS_INDEX, id).await?;
        hunt.id = id;
        Ok(hunt)
    }

    async fn update_hunt(&self, hunt: &Hunt) -> Result<(), StoreError> {
        let body = serde_json::to_value(hunt)?;
        self.put(
            &format!("{HUNTS_INDEX}/_doc/{}?refresh=true", hunt.id),
            &body,
        )
        .await?;
        Ok(())
    }

    async fn delete_hunt(&self, id: &str) -> Result<(), StoreError> {
        self.delete_path(&format!("{HUNTS_INDEX}/_doc/{id}?refresh=true"))
            .await?;
        Ok(())
    }

    async fn list_hunts(&self) -> Result<Vec<Hunt>, StoreError> {
        let body = json!({
            "size": 10000,
            "sort": [{ "created": { "order": "asc" } }],
            "query": { "match_all": {} },
        });
        let hunts = self.typed_list::<Hunt>(HUNTS_INDEX, &body).await?;
        Ok(hunts
            .into_iter()
            .map(|(id, mut hunt)| {
                hunt.id = id;
                hunt
            })
            .collect())
    }

    async fn create_cron(&self, cron: &CronQuery) -> Result<String, StoreError> {
        let body = serde_json::to_value(cron)?;
        let resp = self
            .post(&format!("{QUERIES_INDEX}/_doc?refresh=true"), &body)
            .await?;
        resp["_id"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| StoreError::Backend("create cron returned no _id".to_string()))
    }

    async fn get_cron(&self, id: &str) -> Result<CronQuery, StoreError> {
        let (id, mut cron): (String, CronQuery) = self.typed_get(QUERIES_INDEX, id).await?;
        cron.id = id;
        Ok(cron)
    }

    async fn update_cron(&self, cron: &CronQuery) -> Result<(), StoreError> {
        let body = serde_json::to_value(cron)?;
        self.put(
            &format!("{QUERIES_INDEX}/_doc/{}?refresh=true", cron.id),
            &body,
        )
        .await?;
        Ok(())
    }

    async fn delete_cron(&self, id: &str) -> Result<(), StoreError> {
        self.delete_path(&format!("{QUERIES_INDEX}/_doc/{id}?refresh=true"))
            .await?;
        Ok(())
    }

    async fn list_crons(&self) -> Result<Vec<CronQuery>, StoreError> {
        let body = json!({ "size": 1000, "query": { "match_all": {} } });
        let crons = self.typed_list::<CronQuery>(QUERIES_INDEX, &body).await?;
        Ok(crons
            .into_iter()
            .map(|(id, mut cron)| {
                cron.id = id;
                cron
            })
            .collect())
    }

    async fn get_user(&self, user_id: &str) -> Result<User, StoreError> {
        let (_, user): (String, User) = self.typed_get(USERS_INDEX, user_id).await?;
        Ok(user)
    }

    async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        let body = serde_json::to_value(user)?;
        self.put(
            &format!("{USERS_INDEX}/_doc/{}?refresh=true", user.user_id),
            &body,
        )
        .await?;
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let body = json!({
            "size": 10000,
            "sort": [{ "userId": { "order": "asc" } }],
            "query": { "match_all": {} },
        });
        let users = self.typed_list::<User>(USERS_INDEX, &body).await?;
        Ok(users
            .into_iter()
            .map(|(id, mut user)| {
                if user.user_id.is_empty() {
                    user.user_id = id;
                }
                user
            })
            .collect())
    }

    async fn get_file(&self, node: &str, num: i64) -> Result<PcapFileDoc, StoreError> {
        let doc_id = PcapFileDoc::doc_id(node, num);
        let (id, mut file): (String, PcapFileDoc) = self.typed_get(FILES_INDEX, &doc_id).await?;
        file.id = id;
        Ok(file)
    }

    async fn create_file(&self, file: &PcapFileDoc) -> Result<(), StoreError> {
        let body = serde_json::to_value(file)?;
        let doc_id = PcapFileDoc::doc_id(&file.node, file.num);
        self.put(&format!("{FILES_INDEX}/_doc/{doc_id}?refresh=true"), &body)
            .await?;
        Ok(())
    }

    async fn oldest_unlocked_files(
        &self,
        node: &str,
        dir_wildcards: &[String],
        limit: usize,
    ) -> Result<Vec<PcapFileDoc>, StoreError> {
        let wildcards: Vec<Filter> = dir_wildcards
            .iter()
            .map(|w| Filter::Wildcard {
                field: "name".to_string(),
                pattern: w.clone(),
            })
            .collect();
        let filter = Filter::And(vec![
            Filter::Term {
                field: "node".to_string(),
                value: json!(node),
            },
            Filter::Or(wildcards),
            Filter::Not(Box::new(Filter::Term {
                field: "locked".to_string(),
                value: json!(true),
            })),
        ]);
        let body = json!({
            "size": limit,
            "sort": [{ "first": { "order": "asc" } }],
            "query": { "bool": { "filter": [filter.to_es_query()] } },
        });
        let files = self.typed_list::<PcapFileDoc>(FILES_INDEX, &body).await?;
        Ok(files
            .into_iter()
            .map(|(id, mut file)| {
                file.id = id;
                file
            })
            .collect())
    }

    async fn delete_file(&self, node: &str, num: i64) -> Result<(), StoreError> {
        let doc_id = PcapFileDoc::doc_id(node, num);
        self.delete_path(&format!("{FILES_INDEX}/_doc/{doc_id}?refresh=true"))
            .await?;
        Ok(())
    }

    async fn file_count(&self, node: &str) -> Result<u64, StoreError> {
        let body = json!({ "query": { "term": { "node": node } } });
        let resp = self.post(&format!("{FILES_INDEX}/_count"), &body).await?;
        Ok(resp["count"].as_u64().unwrap_or(0))
    }

    async fn list_files(&self, node: &str) -> Result<Vec<PcapFileDoc>, StoreError> {
        let body = json!({
            "size": 10000,
            "sort": [{ "num": { "order": "asc" } }],
            "query": { "term": { "node": node } },
        });
        let files = self.typed_list::<PcapFileDoc>(FILES_INDEX, &body).await?;
        Ok(files
            .into_iter()
            .map(|(id, mut file)| {
                file.id = id;
                file
            })
            .collect())
    }

    async fn get_lookup(&self, name: &str) -> Result<Lookup, StoreError> {
        let body = json!({ "size": 1, "query": { "term": { "name": name } } });
        let mut lookups = self.typed_list::<Lookup>(LOOKUPS_INDEX, &body).await?;
        let (id, mut lookup) = lookups
            .pop()
            .ok_or_else(|| StoreError::NotFound(format!("lookup {name}")))?;
        lookup.id = id;
        Ok(lookup)
    }

    async fn create_lookup(&self, lookup: &Lookup) -> Result<String, StoreError> {
        let body = serde_json::to_value(lookup)?;
        let resp = self
            .post(&format!("{LOOKUPS_INDEX}/_doc?refresh=true"), &body)
            .await?;
        resp["_id"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| StoreError::Backend("create lookup returned no _id".to_string()))
    }

    async fn list_lookups(&self) -> Result<Vec<Lookup>, StoreError> {
        let body = json!({ "size": 10000, "query": { "match_all": {} } });
        let lookups = self.typed_list::<Lookup>(LOOKUPS_INDEX, &body).await?;
        Ok(lookups
            .into_iter()
            .map(|(id, mut lookup)| {
                lookup.id = id;
                lookup
            })
            .collect())
    }

    async fn add_history(&self, entry: &HistoryEntry) -> Result<(), StoreError> {
        let body = serde_json::to_value(entry)?;
        self.post(&format!("{HISTORY_INDEX}/_doc"), &body).await?;
        Ok(())
    }

    async fn get_node(&self, name: &str) -> Result<NodeInfo, StoreError> {
        let (_, node): (String, NodeInfo) = self.typed_get(NODES_INDEX, name).await?;
        Ok(node)
    }

    async fn list_nodes(&self) -> Result<Vec<NodeInfo>, StoreError> {
        let body = json!({ "size": 10000, "query": { "match_all": {} } });
        let nodes = self.typed_list::<NodeInfo>(NODES_INDEX, &body).await?;
        Ok(nodes.into_iter().map(|(_, node)| node).collect())
    }

    async fn register_node(&self, node: &NodeInfo) -> Result<(), StoreError> {
        let body = serde_json::to_value(node)?;
        self.put(
            &format!("{NODES_INDEX}/_doc/{}?refresh=true", node.node_name),
            &body,
        )
        .await?;
        Ok(())
    }

    async fn cancel_task(&self, task_id: &str) -> Result<(), StoreError> {
        self.post(&format!("_tasks/{task_id}/_cancel"), &json!({}))
            .await?;
        Ok(())
    }
}
