use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use blockcheck::api::{start_api_server, ApiState};
use blockcheck::config::Config;
use blockcheck::init::{init_engine, init_store, setup_logging};
use blockcheck::logger::CheckLogger;
use blockcheck::reload::{spawn_watcher, EnvFileSource};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load Config
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or("blockcheck.toml".to_string());
    let config_exists = std::path::Path::new(&config_path).exists();
    let config = if config_exists {
        Config::load(&config_path).await?
    } else {
        Config::default()
    }
    .with_env_port()?;

    // 2. Setup Logging
    setup_logging(&config);
    info!("Starting blockcheck...");

    if !config_exists {
        info!("Config file not found, using defaults.");
    }

    // 3. Initial load of resolvers / sentinels / location
    let source = EnvFileSource::new(&config.reload.env_file);
    let store = init_store(&source).await;

    // 4. Hot reload
    if config.reload.enable {
        spawn_watcher(store.clone(), source, config.reload_interval());
    }

    // 5. Check engine
    let engine = init_engine(&config, store);

    // 6. Start API Server
    let host = config.host.parse().context("Invalid host address")?;
    let addr = SocketAddr::new(host, config.port);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    let state = ApiState::new(engine, CheckLogger::new(config.logging.clone()), config);

    // 7. Graceful Shutdown
    tokio::select! {
        res = start_api_server(state, listener) => res.context("API server failed")?,
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received.");
        }
    }

    Ok(())
}
