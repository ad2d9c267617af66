use serde::{Deserialize, Serialize};

/// Fleet-map row: where a capture node's viewer listens.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NodeInfo {
    #[serde(rename = "nodeName", default)]
    pub node_name: String,

    /// Base URL peers use to reach this node's viewer.
    #[serde(rename = "viewUrl", default)]
    pub view_url: String,

    /// CA bundle to trust when dialing this node over HTTPS.
    #[serde(rename = "caTrustFile", default, skip_serializing_if = "Option::is_none")]
    pub ca_trust_file: Option<String>,
}

impl NodeInfo {
    /// `https` or `http`, derived from the view URL.
    pub fn scheme(&self) -> &str {
        if self.view_url.starts_with("https:") {
            "https"
        } else {
            "http"
        }
    }
}
