//! Session ownership. Every session-scoped request must execute on the
//! node whose disk holds the PCAP bytes; everyone else proxies.

use crate::app::AppState;
use crate::errors::ApiError;
use owlcap_store::{Datastore, NodeInfo, Session};

/// The owning node is whatever the capture process stamped on the session.
pub fn owner_of(session: &Session) -> &str {
    &session.node
}

/// Resolves a node name through the fleet map.
pub async fn node_info(state: &AppState, node: &str) -> Result<NodeInfo, ApiError> {
    state
        .stores
        .db
        .get_node(node)
        .await
        .map_err(|_| ApiError::NotFound(format!("Unknown node {node}")))
}

#[cfg(test)]
mod test {
    use super::*;
    use owlcap_config::Config;

    #[tokio::test]
    async fn unknown_nodes_are_not_found() {
        let (state, db) = AppState::for_tests(Config::default());
        db.register_node(&NodeInfo {
            node_name: "capture02".to_string(),
            view_url: "http://capture02:8005".to_string(),
            ca_trust_file: None,
        })
        .await
        .unwrap();
        assert!(node_info(&state, "capture02").await.is_ok());
        assert!(node_info(&state, "ghost").await.is_err());
    }
}
