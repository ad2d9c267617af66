use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A PCAP file registered by the capture process. The expiry engine deletes
/// these oldest-first; a locked file is never deleted.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PcapFileDoc {
    #[serde(skip)]
    pub id: String,

    #[serde(default)]
    pub node: String,

    #[serde(default)]
    pub num: i64,

    /// Full path on the owning node's disk.
    #[serde(default)]
    pub name: String,

    /// First packet time (seconds). The expiry sort key.
    #[serde(default)]
    pub first: u64,

    #[serde(default)]
    pub filesize: u64,

    #[serde(default)]
    pub locked: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PcapFileDoc {
    /// Document id convention: `<node>-<num>`.
    pub fn doc_id(node: &str, num: i64) -> String {
        format!("{node}-{num}")
    }
}
