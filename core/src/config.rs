//! Client configuration.

use std::time::Duration;

use crate::error::RetryAfterPolicy;
use crate::pagination::DEFAULT_PAGE_SIZE;

pub const DEFAULT_BASE_URL: &str = "https://app.asana.com/api/1.0";

/// Settings shared by every request an `AsanaClient` makes.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root; resource paths are appended to it. No trailing slash.
    pub base_url: String,
    pub user_agent: String,
    /// Sent on every request, after the client's own headers.
    pub default_headers: Vec<(String, String)>,
    /// Opt-in API changes, sent as `Asana-Enable`.
    pub enabled_features: Vec<String>,
    /// Opt-out API changes, sent as `Asana-Disable`.
    pub disabled_features: Vec<String>,
    /// Page size used by the `all_*` methods.
    pub page_size: u32,
    pub retry_after_policy: RetryAfterPolicy,
    /// Overall request timeout for transports that honor one.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: format!("asana-core/{}", env!("CARGO_PKG_VERSION")),
            default_headers: Vec::new(),
            enabled_features: Vec::new(),
            disabled_features: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
            retry_after_policy: RetryAfterPolicy::default(),
            timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: &str) -> Self {
        self.config.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.push((name.into(), value.into()));
        self
    }

    pub fn enable(mut self, feature: impl Into<String>) -> Self {
        self.config.enabled_features.push(feature.into());
        self
    }

    pub fn disable(mut self, feature: impl Into<String>) -> Self {
        self.config.disabled_features.push(feature.into());
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.config.page_size = page_size;
        self
    }

    pub fn retry_after_policy(mut self, policy: RetryAfterPolicy) -> Self {
        self.config.retry_after_policy = policy;
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_production_api() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://app.asana.com/api/1.0");
        assert_eq!(config.page_size, 50);
        assert_eq!(config.retry_after_policy, RetryAfterPolicy::Seconds);
        assert!(config.user_agent.starts_with("asana-core/"));
    }

    #[test]
    fn builder_trims_trailing_slash_and_collects_features() {
        let config = ClientConfig::builder()
            .base_url("http://localhost:3000/api/1.0/")
            .enable("new_goal_memberships")
            .enable("new_user_task_lists")
            .disable("string_ids")
            .header("Authorization", "Bearer 0/abc")
            .page_size(100)
            .build();
        assert_eq!(config.base_url, "http://localhost:3000/api/1.0");
        assert_eq!(config.enabled_features.len(), 2);
        assert_eq!(config.disabled_features, vec!["string_ids"]);
        assert_eq!(config.default_headers[0].0, "Authorization");
        assert_eq!(config.page_size, 100);
    }
}
