//! Top-level configuration file for the viewer daemon.

use crate::free_space::FreeSpaceTarget;
use crate::remote_clusters::RemoteCluster;
use crate::ConfigError;
use serde::{Deserialize, Serialize};
use sha2::digest::Update;
use sha2::Digest;
use std::collections::HashMap;
use uuid::Uuid;

/// Top-level configuration file for an owlcap viewer node.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Version number for the configuration file format.
    pub version: String,

    /// Node name - identifies this capture node in the fleet. Session
    /// documents carry the name of the node that owns their PCAP bytes.
    pub node_name: String,

    /// Host/interface the HTTP API binds to.
    pub view_host: String,

    /// Port the HTTP API binds to.
    pub view_port: u16,

    /// TLS key file. HTTPS is derived from key + cert both being present.
    pub key_file: Option<String>,

    /// TLS certificate file.
    pub cert_file: Option<String>,

    /// Realm sent in digest-auth challenges.
    pub http_realm: String,

    /// Secret shared by every viewer in the fleet. Used to seal peer
    /// tokens when a per-cluster secret isn't configured.
    pub password_secret: String,

    /// Overrides `password_secret` for node-to-node traffic when set.
    pub server_secret: Option<String>,

    /// Trust this header as the authenticated user name (reverse-proxy auth).
    pub user_name_header: Option<String>,

    /// When header auth is on, also require this header to be present...
    pub required_auth_header: Option<String>,

    /// ...with this exact value.
    pub required_auth_header_val: Option<String>,

    /// JSON template for auto-creating users seen via header auth.
    pub user_auto_create_tmpl: Option<String>,

    /// X-Frame-Options policy: "deny", "sameorigin", or an allowed origin.
    pub iframe: String,

    /// Emit a Strict-Transport-Security header.
    pub hsts_header: bool,

    /// Elasticsearch base URL.
    pub elasticsearch: String,

    /// Running against multiple Elasticsearch clusters.
    pub multi_es: bool,

    /// Regression-test mode: anonymous auth and clean exit are allowed.
    pub regression_tests: bool,

    /// Semicolon-delimited list of directories holding PCAP files.
    pub pcap_dirs: String,

    /// How PCAP files are written on this node. The expiry engine only
    /// runs where this is "simple" (local disk).
    pub pcap_write_method: String,

    /// Free-space target per device: absolute gigabytes ("200") or a
    /// percentage of the device ("5%").
    pub free_space_g: String,

    /// This node runs the hunt and cron engines. Exactly one viewer in the
    /// fleet should have this set.
    pub cron_queries: bool,

    /// Seconds behind the present that cron queries are allowed to read.
    pub cron_delay_secs: u64,

    /// Hunt size cap for admin users.
    pub hunt_admin_limit: u64,

    /// Hunt size cap for everyone else.
    pub hunt_limit: u64,

    /// Warn in the UI above this many sessions.
    pub hunt_warn: u64,

    /// Users allowed to use the /esadmin endpoints.
    pub es_admin_users: Vec<String>,

    /// Remote clusters that cron forward actions may target.
    pub remote_clusters: HashMap<String, RemoteCluster>,
}

impl Config {
    /// Derive a node name from the machine ID when the operator didn't
    /// pick one. Random UUID if the machine ID is unavailable.
    pub fn calculate_node_name() -> String {
        if let Ok(machine_id) = std::fs::read_to_string("/etc/machine-id") {
            let hash = sha2::Sha256::new().chain(machine_id).finalize();
            format!("{:x}", hash)
        } else {
            Uuid::new_v4().to_string()
        }
    }

    /// HTTPS is on iff both halves of the keypair are configured.
    pub fn is_https(&self) -> bool {
        self.key_file.is_some() && self.cert_file.is_some()
    }

    /// The secret that seals node-to-node tokens.
    pub fn server_secret_or_password(&self) -> &str {
        self.server_secret.as_deref().unwrap_or(&self.password_secret)
    }

    /// The `pcap_dirs` key, split on semicolons.
    pub fn pcap_dir_list(&self) -> Vec<String> {
        self.pcap_dirs
            .split(';')
            .map(|d| d.trim())
            .filter(|d| !d.is_empty())
            .map(|d| d.to_string())
            .collect()
    }

    /// Parsed free-space target.
    pub fn free_space_target(&self) -> Result<FreeSpaceTarget, ConfigError> {
        self.free_space_g.parse()
    }

    /// The expiry engine only runs where capture writes land on local disk.
    pub fn writes_pcap_locally(&self) -> bool {
        self.pcap_write_method == "simple"
    }

    /// Test if a configuration is valid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version.trim() != "1.0" {
            return Err(ConfigError::Invalid(format!(
                "Configuration file is at version [{}], but this build only supports version 1.0",
                self.version
            )));
        }
        if self.node_name.is_empty() {
            return Err(ConfigError::Invalid("node_name must be set".to_string()));
        }
        if self.password_secret.is_empty() {
            return Err(ConfigError::Invalid(
                "password_secret must be set; the fleet cannot authenticate without it".to_string(),
            ));
        }
        if self.writes_pcap_locally() && self.pcap_dir_list().is_empty() {
            return Err(ConfigError::Invalid(
                "pcap_dirs must name at least one directory when pcap_write_method is simple"
                    .to_string(),
            ));
        }
        self.free_space_target()?;
        Ok(())
    }

    /// Loads a config file from a string.
    pub fn load_from_string(s: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(s).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            node_name: Self::calculate_node_name(),
            view_host: "0.0.0.0".to_string(),
            view_port: 8005,
            key_file: None,
            cert_file: None,
            http_realm: "Owlcap".to_string(),
            password_secret: String::new(),
            server_secret: None,
            user_name_header: None,
            required_auth_header: None,
            required_auth_header_val: None,
            user_auto_create_tmpl: None,
            iframe: "deny".to_string(),
            hsts_header: false,
            elasticsearch: "http://localhost:9200".to_string(),
            multi_es: false,
            regression_tests: false,
            pcap_dirs: "/opt/owlcap/raw".to_string(),
            pcap_write_method: "simple".to_string(),
            free_space_g: "5%".to_string(),
            cron_queries: false,
            cron_delay_secs: 90,
            hunt_admin_limit: 10_000_000,
            hunt_limit: 1_000_000,
            hunt_warn: 100_000,
            es_admin_users: Vec::new(),
            remote_clusters: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::Config;

    #[test]
    fn load_example() {
        let config = Config::load_from_string(include_str!("example.toml")).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.node_name, "capture01");
        assert!(config.cron_queries);
        assert_eq!(config.pcap_dir_list(), vec!["/data/pcap0", "/data/pcap1"]);
        let remote = config.remote_clusters.get("dc2").unwrap();
        assert_eq!(remote.url, "https://viewer.dc2.example.com:8005");
    }

    #[test]
    fn https_requires_both_halves() {
        let mut config = Config::default();
        config.key_file = Some("/etc/owlcap/key.pem".to_string());
        assert!(!config.is_https());
        config.cert_file = Some("/etc/owlcap/cert.pem".to_string());
        assert!(config.is_https());
    }

    #[test]
    fn server_secret_falls_back() {
        let mut config = Config::default();
        config.password_secret = "fleet".to_string();
        assert_eq!(config.server_secret_or_password(), "fleet");
        config.server_secret = Some("s2s".to_string());
        assert_eq!(config.server_secret_or_password(), "s2s");
    }

    #[test]
    fn rejects_missing_secret() {
        let config = Config::default();
        assert!(config.validate().is_err());
    }
}
