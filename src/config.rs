use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::fs;

/// Process settings, read once at startup. Resolvers and sentinels are not
/// here; they come from the hot-reloaded env file (see [`crate::reload`]).
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,

    #[serde(default)]
    pub reload: ReloadConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReloadConfig {
    #[serde(default = "default_reload_enable")]
    pub enable: bool,
    #[serde(default = "default_env_file")]
    pub env_file: String,
    #[serde(default = "default_reload_interval_ms")]
    pub interval_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_checks")]
    pub log_checks: bool,
}

// Defaults
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_lookup_timeout_ms() -> u64 {
    5000
}
fn default_reload_enable() -> bool {
    true
}
fn default_env_file() -> String {
    ".env".to_string()
}
fn default_reload_interval_ms() -> u64 {
    2000
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}
fn default_log_checks() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            lookup_timeout_ms: default_lookup_timeout_ms(),
            reload: ReloadConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            enable: default_reload_enable(),
            env_file: default_env_file(),
            interval_ms: default_reload_interval_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_checks: default_log_checks(),
        }
    }
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .context("Failed to read config file")?;
        let config: Config = toml::from_str(&contents).context("Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lookup_timeout_ms == 0 {
            bail!("lookup_timeout_ms must be greater than zero");
        }
        if self.reload.interval_ms == 0 {
            bail!("reload.interval_ms must be greater than zero");
        }
        Ok(())
    }

    /// Applies the `PORT` environment override.
    pub fn with_env_port(mut self) -> Result<Self> {
        if let Ok(port) = std::env::var("PORT") {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT value '{}'", port))?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    pub fn reload_interval(&self) -> Duration {
        Duration::from_millis(self.reload.interval_ms)
    }
}
