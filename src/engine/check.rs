use super::matcher::match_sentinel;
use super::normalize::normalize;
use crate::resolver::SequentialResolver;
use crate::store::ConfigStore;
use chrono::{DateTime, Local, Utc};
use serde::{Serialize, Serializer};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

pub const EMPTY_DOMAIN_ERROR: &str = "domain parameter must not be empty";

/// Result of one domain check. Empty fields are left out of the JSON form.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub domain: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub is_blocked: bool,
    #[serde(
        rename = "dns_server",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_endpoint"
    )]
    pub resolver_used: Option<String>,
    #[serde(rename = "resolved_ips", skip_serializing_if = "Vec::is_empty")]
    pub resolved_addresses: Vec<String>,
    #[serde(rename = "blocked_ip", skip_serializing_if = "Option::is_none")]
    pub matched_sentinel: Option<String>,
    #[serde(rename = "error", skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_time: Option<String>,
    #[serde(
        rename = "response_time_ms",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_millis"
    )]
    pub elapsed: Option<Duration>,
    #[serde(rename = "server_location", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl CheckResult {
    fn new(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            timestamp: Utc::now(),
            success: false,
            is_blocked: false,
            resolver_used: None,
            resolved_addresses: Vec::new(),
            matched_sentinel: None,
            error_detail: None,
            query_time: None,
            elapsed: None,
            location: None,
        }
    }
}

// The default DNS port is implied in the wire form.
fn serialize_endpoint<S: Serializer>(endpoint: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
    match endpoint {
        Some(ep) => s.serialize_str(ep.strip_suffix(":53").unwrap_or(ep)),
        None => s.serialize_none(),
    }
}

fn serialize_millis<S: Serializer>(elapsed: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
    match elapsed {
        Some(d) => s.serialize_f64(d.as_micros() as f64 / 1000.0),
        None => s.serialize_none(),
    }
}

/// Normalizes, resolves and matches one domain against the active configuration.
pub struct CheckEngine {
    store: Arc<ConfigStore>,
    resolver: SequentialResolver,
}

impl CheckEngine {
    pub fn new(store: Arc<ConfigStore>, resolver: SequentialResolver) -> Self {
        Self { store, resolver }
    }

    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    /// Runs a single check. Never fails; problems are reported in the result.
    pub async fn check(&self, raw: &str) -> CheckResult {
        let domain = normalize(raw);
        let mut result = CheckResult::new(domain);

        if domain.is_empty() {
            result.error_detail = Some(EMPTY_DOMAIN_ERROR.to_string());
            return result;
        }

        // One snapshot per check: fallback order, sentinels and location agree.
        let config = self.store.snapshot();
        let start = Instant::now();

        let resolution = match self.resolver.resolve(domain, config.resolvers()).await {
            Ok(resolution) => resolution,
            Err(e) => {
                result.error_detail = Some(format!("DNS resolution failed: {}", e));
                return result;
            }
        };

        let matched = match_sentinel(&resolution.addresses, config.sentinels());
        result.success = true;
        result.is_blocked = matched.is_some();
        result.matched_sentinel = matched.map(str::to_string);
        result.resolver_used = Some(resolution.resolver);
        result.resolved_addresses = resolution.addresses;

        result.elapsed = Some(start.elapsed());
        result.query_time = Some(Local::now().format("%H:%M:%S%.3f").to_string());
        result.location = Some(config.location().to_string());
        result
    }
}
