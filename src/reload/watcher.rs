use super::source::EnvFileSource;
use crate::store::ConfigStore;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use tracing::{info, warn};

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Polls the source file and reloads the store whenever it gets newer.
///
/// Intervals below 10ms are raised to 10ms.
pub fn spawn_watcher(
    store: Arc<ConfigStore>,
    source: EnvFileSource,
    interval: Duration,
) -> JoinHandle<()> {
    let interval = interval.max(MIN_POLL_INTERVAL);
    tokio::spawn(async move {
        let mut last_modified = modified(source.path()).await;
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately
        ticker.tick().await;

        info!(
            "Watching {} for changes every {:?}",
            source.path().display(),
            interval
        );

        loop {
            ticker.tick().await;

            let Some(current) = modified(source.path()).await else {
                continue;
            };
            if last_modified.is_some_and(|last| current <= last) {
                continue;
            }
            last_modified = Some(current);

            info!("{} changed, reloading configuration...", source.path().display());
            if let Err(e) = source.load(&store).await {
                warn!("Configuration reload failed, keeping previous: {}", e);
            }
        }
    })
}

async fn modified(path: &Path) -> Option<SystemTime> {
    tokio::fs::metadata(path).await.ok()?.modified().ok()
}
