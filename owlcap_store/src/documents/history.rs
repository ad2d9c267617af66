use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One authenticated API request, appended to the history index.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Seconds since epoch.
    pub timestamp: u64,

    #[serde(rename = "userId")]
    pub user_id: String,

    /// Request path.
    pub api: String,

    /// Query string, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// Request body with password fields scrubbed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,

    /// Wall time the request took, milliseconds.
    #[serde(rename = "queryTime", default)]
    pub query_time: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<u64>,

    #[serde(rename = "recordsReturned", default, skip_serializing_if = "Option::is_none")]
    pub records_returned: Option<u64>,

    #[serde(rename = "recordsFiltered", default, skip_serializing_if = "Option::is_none")]
    pub records_filtered: Option<u64>,

    #[serde(rename = "recordsTotal", default, skip_serializing_if = "Option::is_none")]
    pub records_total: Option<u64>,
}

/// Replaces password-ish keys in a logged body. The history index must
/// never hold credentials.
pub fn scrub_passwords(body: &mut Value) {
    if let Value::Object(map) = body {
        for (key, value) in map.iter_mut() {
            let lower = key.to_ascii_lowercase();
            if lower.contains("password") || lower == "currentpassword" || lower == "newpassword" {
                *value = Value::String("********".to_string());
            } else {
                scrub_passwords(value);
            }
        }
    } else if let Value::Array(items) = body {
        for item in items.iter_mut() {
            scrub_passwords(item);
        }
    }
}
