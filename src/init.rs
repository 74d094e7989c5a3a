//! Initialization helpers for the application startup.

use crate::config::Config;
use crate::engine::CheckEngine;
use crate::reload::EnvFileSource;
use crate::resolver::{SequentialResolver, UdpLookup};
use crate::store::{CheckConfig, ConfigStore};
use std::sync::Arc;
use tracing::{info, warn};

/// Sets up the tracing subscriber with the configured filters.
pub fn setup_logging(config: &Config) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut filter = config.logging.level.clone();

        // Suppress hickory logs unless explicitly enabled/overridden
        if !filter.contains("hickory_proto") {
            filter.push_str(",hickory_proto=off");
        }
        if !filter.contains("hickory_resolver") {
            filter.push_str(",hickory_resolver=off");
        }

        tracing_subscriber::EnvFilter::new(filter)
    });

    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);
    if config.logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Builds the store from built-in defaults and applies the env file once.
///
/// A failing initial load is logged and the defaults stay active.
pub async fn init_store(source: &EnvFileSource) -> Arc<ConfigStore> {
    let store = ConfigStore::new(CheckConfig::default());
    if let Err(e) = source.load(&store).await {
        warn!(
            "Initial configuration load from {} failed, using defaults: {}",
            source.path().display(),
            e
        );
    }

    let snapshot = store.snapshot();
    info!("DNS servers: {:?}", snapshot.resolvers());
    info!("Blocked IPs: {:?}", snapshot.sentinels());
    info!("Server location: {}", snapshot.location());
    store
}

/// Wires the UDP resolver client into a check engine.
pub fn init_engine(config: &Config, store: Arc<ConfigStore>) -> Arc<CheckEngine> {
    let resolver = SequentialResolver::new(Arc::new(UdpLookup::new()), config.lookup_timeout());
    Arc::new(CheckEngine::new(store, resolver))
}
