use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What a cron query does with its matches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CronAction {
    /// Append the configured tags to each matched session.
    Tag,
    /// Ship SPI + packets to the named remote cluster.
    Forward(String),
}

/// A repeating, time-windowed query. Runs forever while enabled; `lp_value`
/// is the low watermark of session time already processed.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CronQuery {
    #[serde(skip)]
    pub id: String,

    #[serde(default)]
    pub creator: String,

    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub name: String,

    /// The user expression matched against each window.
    #[serde(default)]
    pub query: String,

    /// Comma-delimited tag list for the tag action.
    #[serde(default)]
    pub tags: String,

    /// `"tag"` or `"forward:<cluster>"` on the wire.
    #[serde(default)]
    pub action: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifier: Option<String>,

    /// Seconds since epoch. Never reads windows newer than `now - cronDelay`.
    #[serde(rename = "lpValue", default)]
    pub lp_value: u64,

    #[serde(rename = "lastRun", default)]
    pub last_run: u64,

    #[serde(default)]
    pub count: u64,

    #[serde(rename = "lastNotified", default)]
    pub last_notified: u64,

    #[serde(rename = "lastNotifiedCount", default)]
    pub last_notified_count: u64,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CronQuery {
    /// Parses the wire `action` field. Unknown strings are `None`, which a
    /// tick skips the same way it skips compile failures.
    pub fn parsed_action(&self) -> Option<CronAction> {
        if self.action == "tag" {
            Some(CronAction::Tag)
        } else {
            self.action
                .strip_prefix("forward:")
                .filter(|c| !c.is_empty())
                .map(|c| CronAction::Forward(c.to_string()))
        }
    }
}

#[cfg(test)]
mod test {
    use super::{CronAction, CronQuery};

    #[test]
    fn action_parsing() {
        let mut q = CronQuery {
            action: "tag".to_string(),
            ..Default::default()
        };
        assert_eq!(q.parsed_action(), Some(CronAction::Tag));
        q.action = "forward:dc2".to_string();
        assert_eq!(q.parsed_action(), Some(CronAction::Forward("dc2".to_string())));
        q.action = "forward:".to_string();
        assert_eq!(q.parsed_action(), None);
        q.action = "explode".to_string();
        assert_eq!(q.parsed_action(), None);
    }
}
