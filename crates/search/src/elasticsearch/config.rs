//! Elasticsearch connection configuration.

use std::time::Duration;

/// Elasticsearch configuration.
#[derive(Debug, Clone)]
pub struct ElasticsearchConfig {
    /// Node URL, e.g. `http://localhost:9200`.
    pub url: String,
    /// Basic-auth user. No authentication when unset.
    pub username: Option<String>,
    pub password: Option<String>,
    /// Per-request timeout, including `refresh=wait_for`.
    pub timeout: Duration,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            username: None,
            password: None,
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl ElasticsearchConfig {
    /// Configuration for `url` without credentials.
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Default::default()
        }
    }

    /// Set basic-auth credentials. Empty usernames are ignored.
    pub fn with_credentials(mut self, username: Option<String>, password: Option<String>) -> Self {
        self.username = username.filter(|u| !u.is_empty());
        self.password = password;
        self
    }
}
