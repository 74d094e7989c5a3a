use crate::config::LoggingConfig;
use crate::engine::CheckResult;
use tracing::info;

/// Console sink for completed checks.
#[derive(Debug, Clone)]
pub struct CheckLogger {
    config: LoggingConfig,
}

impl CheckLogger {
    pub fn new(config: LoggingConfig) -> Self {
        Self { config }
    }

    pub fn log(&self, result: &CheckResult) {
        if !self.config.log_checks {
            return;
        }

        if self.config.format == "json" {
            let latency_ms = result.elapsed.map(|d| d.as_millis() as u64);
            // Structured JSON logging via tracing
            info!(
                target: "domain_check",
                domain = %result.domain,
                success = result.success,
                blocked = result.is_blocked,
                resolver = ?result.resolver_used,
                sentinel = ?result.matched_sentinel,
                error = ?result.error_detail,
                lat = latency_ms
            );
        } else {
            info!("{}", text_line(result));
        }
    }
}

fn text_line(result: &CheckResult) -> String {
    let outcome = match (&result.error_detail, &result.matched_sentinel) {
        (Some(err), _) => format!("failed: {}", err),
        (None, Some(sentinel)) => format!("BLOCKED via sentinel {}", sentinel),
        (None, None) => "not blocked".to_string(),
    };
    let resolver = result.resolver_used.as_deref().unwrap_or("-");

    match result.elapsed {
        Some(d) => format!(
            "{} -> {} [resolver {}] [{}ms]",
            result.domain,
            outcome,
            resolver,
            d.as_millis()
        ),
        None => format!("{} -> {} [resolver {}]", result.domain, outcome, resolver),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;

    fn result(domain: &str) -> CheckResult {
        CheckResult {
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

    #[test]
    fn test_text_line_blocked_with_latency() {
        let mut r = result("example.com");
        r.success = true;
        r.is_blocked = true;
        r.resolver_used = Some("195.175.39.39:53".to_string());
        r.matched_sentinel = Some("195.175.254.2".to_string());
        r.elapsed = Some(Duration::from_millis(42));

        assert_eq!(
            text_line(&r),
            "example.com -> BLOCKED via sentinel 195.175.254.2 [resolver 195.175.39.39:53] [42ms]"
        );
    }

    #[test]
    fn test_text_line_without_measurement_has_no_latency() {
        let mut r = result("");
        r.error_detail = Some("domain parameter must not be empty".to_string());

        let line = text_line(&r);
        assert_eq!(line, " -> failed: domain parameter must not be empty [resolver -]");
        assert!(!line.contains("ms]"));
    }
}
