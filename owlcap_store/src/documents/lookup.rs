use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A shared shortcut list usable from expressions (`$name`).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Lookup {
    #[serde(skip)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "userId", default)]
    pub user_id: String,

    /// The values the shortcut expands to.
    #[serde(default)]
    pub values: Vec<String>,

    #[serde(default)]
    pub shared: bool,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
