use std::time::Duration;
use thiserror::Error;

/// Why a single resolver produced no answer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("invalid resolver endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("resolver {endpoint} timed out after {timeout:?}")]
    Timeout { endpoint: String, timeout: Duration },

    #[error("resolver {endpoint}: {message}")]
    Failed { endpoint: String, message: String },
}

/// One host-address lookup against one named resolver.
///
/// Implementations must not retry; fallback belongs to the caller.
#[async_trait::async_trait]
pub trait DnsLookup: Send + Sync {
    async fn lookup(
        &self,
        domain: &str,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<Vec<String>, LookupError>;
}
