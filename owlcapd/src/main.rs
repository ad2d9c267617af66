mod app;
mod cron;
#[cfg(test)]
mod testutil;
mod errors;
mod expire;
mod expression;
mod hunt;
mod notifier;
mod pcaps;
mod peer;
mod web;

use anyhow::Result;
use app::AppState;
use owlcap_store::{Datastore, EsDatastore, NodeInfo};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Log level from RUST_LOG, the usual way.
    tracing_subscriber::fmt::init();

    let config = match owlcap_config::load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };
    info!("Owlcap viewer starting as node {}", config.node_name);

    let db: Arc<dyn Datastore> = match EsDatastore::new(&config.elasticsearch) {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Unable to build the session store client: {e}");
            std::process::exit(1);
        }
    };

    let (state, hunt_rx, cron_rx) = AppState::build(config, db);

    // Publish ourselves into the fleet map so peers can route to us.
    let scheme = if state.config.is_https() { "https" } else { "http" };
    let me = NodeInfo {
        node_name: state.cluster.node_name.clone(),
        view_url: format!(
            "{scheme}://{}:{}",
            state.cluster.node_name, state.config.view_port
        ),
        ca_trust_file: None,
    };
    if let Err(e) = state.stores.db.register_node(&me).await {
        error!("Unable to register this node in the fleet map: {e}");
    }

    // The background singletons run on the cron-elected node only.
    if state.config.cron_queries {
        tokio::spawn(hunt::engine::start(state.clone(), hunt_rx));
        tokio::spawn(cron::engine::start(state.clone(), cron_rx));
    }
    tokio::spawn(expire::start(state.clone()));

    if let Err(e) = web::serve(state.clone()).await {
        error!("Viewer failed to serve: {e}");
        std::process::exit(1);
    }

    // Only a regression run shuts down cleanly.
    if state.config.regression_tests {
        Ok(())
    } else {
        std::process::exit(1);
    }
}
