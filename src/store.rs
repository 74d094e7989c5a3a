//! Hot-swappable check configuration.
//!
//! The active [`CheckConfig`] lives behind an [`ArcSwap`]. Readers take an
//! `Arc` snapshot without locking; a reload builds a complete new value and
//! swaps the pointer, so a reader sees either the old or the new
//! configuration and never a mix of the two.

use arc_swap::ArcSwap;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_RESOLVERS: [&str; 2] = ["195.175.39.39:53", "195.175.39.40:53"];
pub const DEFAULT_SENTINELS: [&str; 2] = ["195.175.254.2", "2a01:358:4014:a00::3"];
pub const DEFAULT_LOCATION: &str = "Unknown";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("resolver list must not be empty")]
    NoResolvers,
}

/// Resolvers, sentinel IPs and location label used by every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConfig {
    resolvers: Vec<String>,
    sentinels: Vec<String>,
    location: String,
}

impl CheckConfig {
    /// Builds a configuration. The resolver list order is the fallback order.
    pub fn new(
        resolvers: Vec<String>,
        sentinels: Vec<String>,
        location: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        if resolvers.is_empty() {
            return Err(ConfigError::NoResolvers);
        }
        Ok(Self {
            resolvers,
            sentinels,
            location: location.into(),
        })
    }

    pub fn resolvers(&self) -> &[String] {
        &self.resolvers
    }

    pub fn sentinels(&self) -> &[String] {
        &self.sentinels
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            resolvers: DEFAULT_RESOLVERS.iter().map(|s| s.to_string()).collect(),
            sentinels: DEFAULT_SENTINELS.iter().map(|s| s.to_string()).collect(),
            location: DEFAULT_LOCATION.to_string(),
        }
    }
}

/// Shared store for the active [`CheckConfig`].
#[derive(Debug)]
pub struct ConfigStore {
    current: ArcSwap<CheckConfig>,
}

impl ConfigStore {
    pub fn new(initial: CheckConfig) -> Arc<Self> {
        Arc::new(Self {
            current: ArcSwap::from_pointee(initial),
        })
    }

    /// Returns the configuration active at the time of the call.
    pub fn snapshot(&self) -> Arc<CheckConfig> {
        self.current.load_full()
    }

    /// Replaces the whole configuration at once.
    pub fn reload(&self, next: CheckConfig) {
        info!(
            resolvers = ?next.resolvers,
            sentinels = ?next.sentinels,
            location = %next.location,
            "Check configuration updated"
        );
        self.current.store(Arc::new(next));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    fn config(tag: &str) -> CheckConfig {
        CheckConfig::new(
            vec![format!("{tag}-a:53"), format!("{tag}-b:53")],
            vec![format!("{tag}-sentinel")],
            tag,
        )
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let store = ConfigStore::new(CheckConfig::default());
        let snap = store.snapshot();
        assert_eq!(snap.resolvers(), ["195.175.39.39:53", "195.175.39.40:53"]);
        assert_eq!(snap.sentinels(), ["195.175.254.2", "2a01:358:4014:a00::3"]);
        assert_eq!(snap.location(), "Unknown");
    }

    #[test]
    fn test_empty_resolvers_rejected() {
        let err = CheckConfig::new(vec![], vec!["1.2.3.4".into()], "x").unwrap_err();
        assert_eq!(err, ConfigError::NoResolvers);
    }

    #[test]
    fn test_snapshot_survives_reload() {
        let store = ConfigStore::new(config("old"));
        let before = store.snapshot();
        store.reload(config("new"));

        assert_eq!(before.location(), "old");
        assert_eq!(store.snapshot().location(), "new");
    }

    #[test]
    fn test_concurrent_reload_never_mixes_fields() {
        let store = ConfigStore::new(config("one"));
        let stop = Arc::new(AtomicBool::new(false));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                let stop = stop.clone();
                thread::spawn(move || {
                    let mut seen = 0u64;
                    while seen < 1000 || !stop.load(Ordering::Relaxed) {
                        let snap = store.snapshot();
                        let tag = snap.location().to_string();
                        assert_eq!(snap.resolvers()[0], format!("{tag}-a:53"));
                        assert_eq!(snap.resolvers()[1], format!("{tag}-b:53"));
                        assert_eq!(snap.sentinels()[0], format!("{tag}-sentinel"));
                        seen += 1;
                    }
                    seen
                })
            })
            .collect();

        for i in 0..2000 {
            store.reload(config(if i % 2 == 0 { "two" } else { "one" }));
        }
        stop.store(true, Ordering::Relaxed);

        for reader in readers {
            assert!(reader.join().unwrap() >= 1000);
        }
    }
}
