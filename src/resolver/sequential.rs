use super::types::{DnsLookup, LookupError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Outcome of walking the whole resolver list without an answer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// At least one resolver failed; carries the last failure seen.
    #[error("{0}")]
    Exhausted(LookupError),

    /// Every resolver answered, but none returned an address.
    #[error("no IP addresses found")]
    NoAddresses,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub addresses: Vec<String>,
    pub resolver: String,
}

/// Tries resolvers strictly in list order; the first non-empty answer wins.
pub struct SequentialResolver {
    lookup: Arc<dyn DnsLookup>,
    timeout: Duration,
}

impl SequentialResolver {
    pub fn new(lookup: Arc<dyn DnsLookup>, timeout: Duration) -> Self {
        Self { lookup, timeout }
    }

    pub async fn resolve(
        &self,
        domain: &str,
        resolvers: &[String],
    ) -> Result<Resolution, ResolutionError> {
        let mut last_error = None;

        for resolver in resolvers {
            match self.lookup.lookup(domain, resolver, self.timeout).await {
                Ok(addresses) if !addresses.is_empty() => {
                    return Ok(Resolution {
                        addresses,
                        resolver: resolver.clone(),
                    });
                }
                Ok(_) => {
                    warn!("Resolver {} returned no addresses for {}", resolver, domain);
                }
                Err(e) => {
                    warn!("Resolver {} failed for {}: {}", resolver, domain, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.map_or(ResolutionError::NoAddresses, ResolutionError::Exhausted))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Scripted answers keyed by resolver endpoint; records call order.
    #[derive(Default)]
    pub(crate) struct MockLookup {
        answers: HashMap<String, Result<Vec<String>, LookupError>>,
        calls: Mutex<Vec<String>>,
    }

    impl MockLookup {
        pub(crate) fn answer(mut self, endpoint: &str, addresses: &[&str]) -> Self {
            self.answers.insert(
                endpoint.to_string(),
                Ok(addresses.iter().map(|s| s.to_string()).collect()),
            );
            self
        }

        pub(crate) fn timeout(mut self, endpoint: &str) -> Self {
            self.answers.insert(
                endpoint.to_string(),
                Err(LookupError::Timeout {
                    endpoint: endpoint.to_string(),
                    timeout: Duration::from_secs(5),
                }),
            );
            self
        }

        pub(crate) fn fail(mut self, endpoint: &str, message: &str) -> Self {
            self.answers.insert(
                endpoint.to_string(),
                Err(LookupError::Failed {
                    endpoint: endpoint.to_string(),
                    message: message.to_string(),
                }),
            );
            self
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl DnsLookup for MockLookup {
        async fn lookup(
            &self,
            _domain: &str,
            endpoint: &str,
            _timeout: Duration,
        ) -> Result<Vec<String>, LookupError> {
            self.calls.lock().unwrap().push(endpoint.to_string());
            self.answers
                .get(endpoint)
                .cloned()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn resolvers(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn sequential(mock: MockLookup) -> (SequentialResolver, Arc<MockLookup>) {
        let mock = Arc::new(mock);
        let resolver = SequentialResolver::new(mock.clone(), Duration::from_secs(5));
        (resolver, mock)
    }

    #[tokio::test]
    async fn test_first_success_stops_iteration() {
        let (resolver, mock) = sequential(
            MockLookup::default()
                .answer("a:53", &["1.1.1.1"])
                .answer("b:53", &["2.2.2.2"]),
        );

        let res = resolver
            .resolve("example.com", &resolvers(&["a:53", "b:53"]))
            .await
            .unwrap();
        assert_eq!(res.resolver, "a:53");
        assert_eq!(res.addresses, ["1.1.1.1"]);
        assert_eq!(mock.calls(), ["a:53"]);
    }

    #[tokio::test]
    async fn test_falls_back_after_failure() {
        let (resolver, mock) = sequential(
            MockLookup::default()
                .timeout("a:53")
                .answer("b:53", &["2.2.2.2", "3.3.3.3"]),
        );

        let res = resolver
            .resolve("example.com", &resolvers(&["a:53", "b:53"]))
            .await
            .unwrap();
        assert_eq!(res.resolver, "b:53");
        assert_eq!(res.addresses, ["2.2.2.2", "3.3.3.3"]);
        assert_eq!(mock.calls(), ["a:53", "b:53"]);
    }

    #[tokio::test]
    async fn test_empty_answer_falls_through() {
        let (resolver, _) = sequential(
            MockLookup::default()
                .answer("a:53", &[])
                .answer("b:53", &["2.2.2.2"]),
        );

        let res = resolver
            .resolve("example.com", &resolvers(&["a:53", "b:53"]))
            .await
            .unwrap();
        assert_eq!(res.resolver, "b:53");
    }

    #[tokio::test]
    async fn test_exhausted_reports_last_error() {
        let (resolver, _) = sequential(
            MockLookup::default()
                .fail("a:53", "connection refused")
                .timeout("b:53")
                .answer("c:53", &[]),
        );

        let err = resolver
            .resolve("example.com", &resolvers(&["a:53", "b:53", "c:53"]))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ResolutionError::Exhausted(LookupError::Timeout {
                endpoint: "b:53".into(),
                timeout: Duration::from_secs(5),
            })
        );
    }

    #[tokio::test]
    async fn test_all_empty_is_distinct_cause() {
        let (resolver, _) = sequential(
            MockLookup::default()
                .answer("a:53", &[])
                .answer("b:53", &[]),
        );

        let err = resolver
            .resolve("example.com", &resolvers(&["a:53", "b:53"]))
            .await
            .unwrap_err();
        assert_eq!(err, ResolutionError::NoAddresses);
        assert_eq!(err.to_string(), "no IP addresses found");
    }
}
