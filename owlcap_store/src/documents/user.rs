use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A viewer user. CRUD happens elsewhere; the daemon reads these for
/// authentication and permission gates.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "userId", default)]
    pub user_id: String,

    #[serde(rename = "userName", default)]
    pub user_name: String,

    #[serde(default)]
    pub enabled: bool,

    /// May manage users; doubles as the admin flag.
    #[serde(rename = "createEnabled", default)]
    pub create_enabled: bool,

    #[serde(rename = "webEnabled", default)]
    pub web_enabled: bool,

    #[serde(rename = "headerAuthEnabled", default)]
    pub header_auth_enabled: bool,

    #[serde(rename = "removeEnabled", default)]
    pub remove_enabled: bool,

    #[serde(rename = "packetSearch", default)]
    pub packet_search: bool,

    #[serde(rename = "hideStats", default)]
    pub hide_stats: bool,

    #[serde(rename = "hideFiles", default)]
    pub hide_files: bool,

    #[serde(rename = "hidePcap", default)]
    pub hide_pcap: bool,

    #[serde(rename = "disablePcapDownload", default)]
    pub disable_pcap_download: bool,

    /// Digest HA1 store: `md5(user:realm:password)` hex.
    #[serde(rename = "passStore", default)]
    pub pass_store: String,

    /// Forced expression ANDed into every query this user runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,

    /// Maximum query range in hours, when set.
    #[serde(rename = "timeLimit", default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u64>,

    /// Role names granted to this user.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.create_enabled
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

#[cfg(test)]
mod test {
    use super::User;

    #[test]
    fn roles_round_trip() {
        let raw = r#"{"userId":"alice","enabled":true,"roles":["viewerUser","clusterAdmin"]}"#;
        let user: User = serde_json::from_str(raw).unwrap();
        assert!(user.has_role("clusterAdmin"));
        assert!(!user.has_role("superAdmin"));
        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["roles"][0], "viewerUser");
    }
}
