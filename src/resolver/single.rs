use super::types::{DnsLookup, LookupError};
use hickory_resolver::config::{LookupIpStrategy, NameServerConfig, ResolverConfig, ResolverOpts};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::xfer::Protocol;
use hickory_resolver::proto::ProtoErrorKind;
use hickory_resolver::{ResolveError, Resolver};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Queries exactly one resolver over UDP, once, with no cache.
#[derive(Debug, Default, Clone)]
pub struct UdpLookup;

impl UdpLookup {
    pub fn new() -> Self {
        Self
    }

    async fn socket_addr(endpoint: &str) -> Result<SocketAddr, LookupError> {
        if let Ok(addr) = endpoint.parse() {
            return Ok(addr);
        }

        let invalid = |reason: String| LookupError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason,
        };
        tokio::net::lookup_host(endpoint)
            .await
            .map_err(|e| invalid(e.to_string()))?
            .next()
            .ok_or_else(|| invalid("host has no addresses".to_string()))
    }

    /// Endpoint resolution and the query itself. Bounded by the caller.
    async fn query(
        domain: &str,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<Vec<String>, LookupError> {
        let socket_addr = Self::socket_addr(endpoint).await?;

        let mut resolver_config = ResolverConfig::new();
        resolver_config.add_name_server(NameServerConfig::new(socket_addr, Protocol::Udp));

        let mut opts = ResolverOpts::default();
        opts.cache_size = 0;
        opts.attempts = 0;
        opts.timeout = timeout;
        opts.ip_strategy = LookupIpStrategy::Ipv4AndIpv6;

        let resolver =
            Resolver::builder_with_config(resolver_config, TokioConnectionProvider::default())
                .with_options(opts)
                .build();

        match resolver.lookup_ip(domain).await {
            Ok(lookup) => Ok(lookup.iter().map(|ip| ip.to_string()).collect()),
            // NOERROR with an empty answer section
            Err(e) if is_empty_answer(&e) => Ok(Vec::new()),
            Err(e) => Err(LookupError::Failed {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

fn is_empty_answer(error: &ResolveError) -> bool {
    error.proto().is_some_and(|proto| {
        matches!(
            proto.kind(),
            ProtoErrorKind::NoRecordsFound {
                response_code: ResponseCode::NoError,
                ..
            }
        )
    })
}

#[async_trait::async_trait]
impl DnsLookup for UdpLookup {
    async fn lookup(
        &self,
        domain: &str,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<Vec<String>, LookupError> {
        let start = Instant::now();
        let res = tokio::time::timeout(timeout, Self::query(domain, endpoint, timeout)).await;
        let latency = start.elapsed().as_millis() as u64;

        match res {
            Ok(Ok(addresses)) => {
                debug!(
                    domain,
                    endpoint,
                    count = addresses.len(),
                    latency_ms = latency,
                    "Lookup answered"
                );
                Ok(addresses)
            }
            Ok(Err(e)) => {
                debug!(domain, endpoint, error = %e, latency_ms = latency, "Lookup failed");
                Err(e)
            }
            Err(_) => Err(LookupError::Timeout {
                endpoint: endpoint.to_string(),
                timeout,
            }),
        }
    }
}
