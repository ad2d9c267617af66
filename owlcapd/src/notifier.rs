//! Webhook notifier. Hunts fire on completion; cron queries fire when
//! their match count grows (throttled by the engine).

use serde_json::json;
use tracing::{info, warn};

pub struct Notifier {
    client: reqwest::Client,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Posts a Slack-shaped JSON message to the job's webhook. A notifier
    /// value that isn't a URL is ignored with a warning; alert delivery
    /// must never fail the job that triggered it.
    pub async fn send(&self, notifier: &str, text: &str) {
        if !notifier.starts_with("http://") && !notifier.starts_with("https://") {
            warn!("Notifier '{notifier}' is not a webhook URL, dropping alert: {text}");
            return;
        }
        let payload = json!({ "text": text });
        match self.client.post(notifier).json(&payload).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("Notified {notifier}");
            }
            Ok(resp) => {
                warn!("Notifier {notifier} answered HTTP {}", resp.status());
            }
            Err(e) => {
                warn!("Unable to reach notifier {notifier}: {e}");
            }
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
