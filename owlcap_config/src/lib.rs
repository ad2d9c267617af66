//! Manages the viewer's TOML configuration file.

mod free_space;
mod remote_clusters;
mod top_config;

pub use free_space::FreeSpaceTarget;
pub use remote_clusters::RemoteCluster;
pub use top_config::Config;

use std::path::Path;
use thiserror::Error;

/// Default search locations for the config file, tried in order.
const CONFIG_PATHS: [&str; 2] = ["/etc/owlcap.conf", "owlcap.conf"];

/// Loads the daemon configuration from the first path that exists.
pub fn load_config() -> Result<Config, ConfigError> {
    for path in CONFIG_PATHS.iter() {
        if Path::new(path).exists() {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| ConfigError::ReadError(path.to_string(), e.to_string()))?;
            return Config::load_from_string(&raw);
        }
    }
    Err(ConfigError::NotFound)
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No configuration file found")]
    NotFound,
    #[error("Unable to read {0}: {1}")]
    ReadError(String, String),
    #[error("Unable to parse configuration: {0}")]
    ParseError(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
