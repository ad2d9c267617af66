use serde::{Deserialize, Serialize};

/// A remote viewer cluster that cron "forward" actions may ship sessions to.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RemoteCluster {
    /// Base URL of the remote cluster's viewer.
    pub url: String,

    /// Seals tokens sent to this cluster. Falls back to `password_secret`.
    pub server_secret: Option<String>,

    /// The remote cluster's own fleet secret, when it differs.
    pub password_secret: Option<String>,
}

impl RemoteCluster {
    /// The secret used to seal tokens for this cluster, if any is set here
    /// rather than inherited from the top-level config.
    pub fn secret(&self) -> Option<&str> {
        self.server_secret
            .as_deref()
            .or(self.password_secret.as_deref())
    }
}
