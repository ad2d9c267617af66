use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lifecycle of a hunt job.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HuntStatus {
    #[default]
    Queued,
    Running,
    Paused,
    Finished,
}

/// How packets are presented to the matcher.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HuntType {
    #[default]
    Raw,
    Reassembled,
}

/// How the search string is interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    Ascii,
    #[serde(rename = "asciicase")]
    AsciiCase,
    Hex,
    Regex,
    #[serde(rename = "hexregex")]
    HexRegex,
    Wildcard,
}

/// The session query a hunt scans over.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HuntQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,

    /// Seconds since epoch.
    #[serde(rename = "startTime", default)]
    pub start_time: u64,

    /// Seconds since epoch.
    #[serde(rename = "stopTime", default)]
    pub stop_time: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
}

/// An error captured while a hunt ran. The job pauses; the record stays.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HuntError {
    pub value: String,
    pub time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unrunnable: Option<bool>,
}

/// A packet-content search job over a session query result set.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Hunt {
    #[serde(skip)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "userId", default)]
    pub user_id: String,

    /// Extra users allowed to see this hunt's results.
    #[serde(default)]
    pub users: Vec<String>,

    #[serde(default)]
    pub status: HuntStatus,

    /// Absent in redacted listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<HuntQuery>,

    /// Match client-to-server bytes.
    #[serde(default)]
    pub src: bool,

    /// Match server-to-client bytes.
    #[serde(default)]
    pub dst: bool,

    #[serde(rename = "type", default)]
    pub hunt_type: HuntType,

    #[serde(rename = "searchType", default)]
    pub search_type: SearchType,

    #[serde(default)]
    pub search: String,

    /// Per-session byte budget for reassembled searches.
    #[serde(default)]
    pub size: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifier: Option<String>,

    #[serde(rename = "totalSessions", default)]
    pub total_sessions: u64,

    #[serde(rename = "searchedSessions", default)]
    pub searched_sessions: u64,

    #[serde(rename = "matchedSessions", default)]
    pub matched_sessions: u64,

    /// Resume point: the lastPacket of the newest session already visited.
    #[serde(rename = "lastPacketTime", default, skip_serializing_if = "Option::is_none")]
    pub last_packet_time: Option<u64>,

    #[serde(rename = "failedSessionIds", default, skip_serializing_if = "Vec::is_empty")]
    pub failed_session_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<HuntError>,

    /// Latched on expression/pattern compile failure. Never auto-resumes.
    #[serde(default)]
    pub unrunnable: bool,

    #[serde(default)]
    pub started: u64,

    #[serde(rename = "lastUpdated", default)]
    pub last_updated: u64,

    #[serde(default)]
    pub created: u64,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Hunt {
    /// Can `user` see this hunt's details?
    pub fn visible_to(&self, user_id: &str, is_admin: bool) -> bool {
        is_admin || self.user_id == user_id || self.users.iter().any(|u| u == user_id)
    }

    /// The listing shown to users who can't see the details: search
    /// parameters and ownership blanked, query removed.
    pub fn redacted(&self) -> Hunt {
        let mut out = self.clone();
        out.id = String::new();
        out.user_id = String::new();
        out.search = String::new();
        out.search_type = SearchType::default();
        out.query = None;
        out
    }

    /// Record a failure and pause the job.
    pub fn fail(&mut self, text: String, now: u64, unrunnable: bool) {
        self.errors.push(HuntError {
            value: text,
            time: now,
            unrunnable: if unrunnable { Some(true) } else { None },
        });
        self.status = HuntStatus::Paused;
        if unrunnable {
            self.unrunnable = true;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_wire_names_are_lowercase() {
        assert_eq!(
            serde_json::to_string(&HuntStatus::Running).unwrap(),
            "\"running\""
        );
        let t: SearchType = serde_json::from_str("\"hexregex\"").unwrap();
        assert_eq!(t, SearchType::HexRegex);
    }

    #[test]
    fn visibility() {
        let hunt = Hunt {
            user_id: "alice".to_string(),
            users: vec!["bob".to_string()],
            ..Default::default()
        };
        assert!(hunt.visible_to("alice", false));
        assert!(hunt.visible_to("bob", false));
        assert!(hunt.visible_to("eve", true));
        assert!(!hunt.visible_to("eve", false));
    }

    #[test]
    fn redaction_blanks_the_sensitive_fields() {
        let hunt = Hunt {
            id: "h1".to_string(),
            user_id: "alice".to_string(),
            search: "GET /".to_string(),
            query: Some(HuntQuery::default()),
            ..Default::default()
        };
        let red = hunt.redacted();
        assert!(red.id.is_empty());
        assert!(red.user_id.is_empty());
        assert!(red.search.is_empty());
        assert!(red.query.is_none());
    }

    #[test]
    fn unrunnable_failure_latches() {
        let mut hunt = Hunt::default();
        hunt.fail("bad regex".to_string(), 1000, true);
        assert_eq!(hunt.status, HuntStatus::Paused);
        assert!(hunt.unrunnable);
        assert_eq!(hunt.errors.len(), 1);
    }
}
