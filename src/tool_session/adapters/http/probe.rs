//! HTTP readiness probe for tool-provider servers.

use crate::tool_session::domain::{HealthSnapshot, ToolServerDescriptor};
use mockable::Clock;
use reqwest::{Client, Url};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Probes `/health` style endpoints derived from a server address.
#[derive(Debug, Clone)]
pub struct HttpHealthProbe<C> {
    client: Client,
    timeout: Duration,
    clock: Arc<C>,
}

impl<C> HttpHealthProbe<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a probe issuing GETs with `timeout`.
    #[must_use]
    pub const fn new(client: Client, timeout: Duration, clock: Arc<C>) -> Self {
        Self {
            client,
            timeout,
            clock,
        }
    }

    /// Tries each candidate endpoint until one answers with a 2xx status.
    pub async fn check(&self, server: &ToolServerDescriptor) -> HealthSnapshot {
        let mut last_failure = String::from("no health endpoint candidates");
        for url in candidate_urls(server) {
            match self.client.get(url.clone()).timeout(self.timeout).send().await {
                Ok(response) if response.status().is_success() => {
                    return HealthSnapshot::healthy(self.clock.utc(), url.as_str());
                }
                Ok(response) => {
                    last_failure = format!("{url} answered {}", response.status());
                }
                Err(err) => {
                    last_failure = format!("{url} unreachable: {err}");
                }
            }
            debug!(server = %server.name(), reason = %last_failure, "health candidate failed");
        }
        HealthSnapshot::unhealthy(self.clock.utc(), last_failure)
    }
}

/// Returns the health URLs to try for `server`, in order, without repeats.
#[must_use]
pub fn candidate_urls(server: &ToolServerDescriptor) -> Vec<Url> {
    let address = server.address();
    let path = address.path().trim_end_matches('/');
    let candidates = [
        format!("{path}/health"),
        format!("/health/{}", server.name()),
        "/health".to_owned(),
    ];

    let mut urls: Vec<Url> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let mut url = address.clone();
        url.set_path(&candidate);
        url.set_query(None);
        if !urls.contains(&url) {
            urls.push(url);
        }
    }
    urls
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool_session::domain::ToolServerName;
    use rstest::rstest;

    fn descriptor(name: &str, address: &str) -> ToolServerDescriptor {
        ToolServerDescriptor::new(
            ToolServerName::new(name).expect("valid name"),
            address.parse().expect("valid url"),
        )
    }

    #[rstest]
    #[case(
        "http://tools.local:8801/mcp",
        &["http://tools.local:8801/mcp/health", "http://tools.local:8801/health/date", "http://tools.local:8801/health"],
    )]
    #[case(
        "http://tools.local:8801/",
        &["http://tools.local:8801/health", "http://tools.local:8801/health/date"],
    )]
    #[case(
        "https://tools.local/date/mcp/?session=1",
        &["https://tools.local/date/mcp/health", "https://tools.local/health/date", "https://tools.local/health"],
    )]
    fn candidates_follow_address(#[case] address: &str, #[case] expected: &[&str]) {
        let urls: Vec<String> = candidate_urls(&descriptor("date", address))
            .into_iter()
            .map(String::from)
            .collect();

        assert_eq!(urls, expected);
    }
}
