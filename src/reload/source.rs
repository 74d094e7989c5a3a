//! Reading check configuration from a dotenv-style file.
//!
//! Recognised keys are [`RESOLVERS_KEY`], [`SENTINELS_KEY`] and
//! [`LOCATION_KEY`]. A process environment variable of the same name wins over
//! the file. Keys that are missing or blank keep the value currently active in
//! the store.

use crate::store::{CheckConfig, ConfigError, ConfigStore};
use std::io::ErrorKind;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const RESOLVERS_KEY: &str = "BTK_DNS_SERVERS";
pub const SENTINELS_KEY: &str = "BTK_BLOCKED_IPS";
pub const LOCATION_KEY: &str = "SERVER_LOCATION";
pub const DEFAULT_DNS_PORT: u16 = 53;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: dotenvy::Error,
    },

    #[error("configuration rejected: {0}")]
    Rejected(#[from] ConfigError),
}

/// Splits on commas, trims each entry and drops empty ones.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Like [`parse_list`], with [`DEFAULT_DNS_PORT`] added to entries lacking a port.
pub fn parse_resolvers(raw: &str) -> Vec<String> {
    parse_list(raw)
        .into_iter()
        .map(|entry| with_default_port(&entry))
        .collect()
}

fn with_default_port(entry: &str) -> String {
    if entry.parse::<SocketAddr>().is_ok() {
        return entry.to_string();
    }

    let bare = entry
        .strip_prefix('[')
        .and_then(|e| e.strip_suffix(']'))
        .unwrap_or(entry);
    if let Ok(ip) = bare.parse::<IpAddr>() {
        return SocketAddr::new(ip, DEFAULT_DNS_PORT).to_string();
    }

    if entry.contains(':') {
        entry.to_string()
    } else {
        format!("{}:{}", entry, DEFAULT_DNS_PORT)
    }
}

/// Trims the label and replaces each whitespace character with `_`.
pub fn parse_location(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Raw values found in a source; `None` means the key was not supplied.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SourceValues {
    pub resolvers: Option<String>,
    pub sentinels: Option<String>,
    pub location: Option<String>,
}

impl SourceValues {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut values = Self::default();
        for (key, value) in pairs {
            let value = value.into();
            if value.trim().is_empty() {
                continue;
            }
            match key.as_ref() {
                RESOLVERS_KEY => values.resolvers = Some(value),
                SENTINELS_KEY => values.sentinels = Some(value),
                LOCATION_KEY => values.location = Some(value),
                _ => {}
            }
        }
        values
    }

    /// Process environment variables take precedence over file values.
    fn overlay_env(mut self) -> Self {
        let env = [RESOLVERS_KEY, SENTINELS_KEY, LOCATION_KEY]
            .into_iter()
            .filter_map(|key| std::env::var(key).ok().map(|value| (key, value)));
        let overrides = Self::from_pairs(env);

        if overrides.resolvers.is_some() {
            self.resolvers = overrides.resolvers;
        }
        if overrides.sentinels.is_some() {
            self.sentinels = overrides.sentinels;
        }
        if overrides.location.is_some() {
            self.location = overrides.location;
        }
        self
    }

    /// Builds the next configuration on top of `current`.
    ///
    /// A supplied resolver list that parses to nothing rejects the whole
    /// update. An empty sentinel list keeps the current sentinels.
    pub fn apply(&self, current: &CheckConfig) -> Result<CheckConfig, ConfigError> {
        let resolvers = match &self.resolvers {
            Some(raw) => parse_resolvers(raw),
            None => current.resolvers().to_vec(),
        };

        let sentinels = self
            .sentinels
            .as_deref()
            .map(parse_list)
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| current.sentinels().to_vec());

        let location = self
            .location
            .as_deref()
            .map(parse_location)
            .unwrap_or_else(|| current.location().to_string());

        CheckConfig::new(resolvers, sentinels, location)
    }
}

/// A dotenv file read fresh on every load.
#[derive(Debug, Clone)]
pub struct EnvFileSource {
    path: PathBuf,
}

impl EnvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file. A missing file yields no values besides the environment.
    pub async fn read(&self) -> Result<SourceValues, SourceError> {
        let path = self.path.display().to_string();
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(source) => return Err(SourceError::Read { path, source }),
        };

        let pairs = dotenvy::from_read_iter(contents.as_bytes())
            .collect::<Result<Vec<(String, String)>, _>>()
            .map_err(|source| SourceError::Parse {
                path: path.clone(),
                source,
            })?;

        Ok(SourceValues::from_pairs(pairs).overlay_env())
    }

    /// Reads the source and swaps the result into `store`.
    ///
    /// On any error the store keeps its previous configuration.
    pub async fn load(&self, store: &ConfigStore) -> Result<(), SourceError> {
        let values = self.read().await?;
        let next = values.apply(&store.snapshot())?;
        store.reload(next);
        Ok(())
    }
}
