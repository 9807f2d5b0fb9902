//! Elasticsearch client implementing the `SearchIndex` port.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, instrument, trace};

use conductor_core::error::{SearchError, SearchResult};
use conductor_core::ports::SearchIndex;

use super::config::ElasticsearchConfig;
use super::requests::{
    CountResponse, GetResponse, base_url, count_url, delete_url, get_url, request_error,
    transport_error, update_url, upsert_body,
};

/// Elasticsearch document store.
#[derive(Clone)]
pub struct ElasticsearchIndex {
    client: Client,
    base: Url,
    credentials: Option<(String, Option<String>)>,
}

impl ElasticsearchIndex {
    /// Build a client for the configured node.
    ///
    /// No request is made; use [`ElasticsearchIndex::is_healthy`] to probe.
    pub fn connect(config: &ElasticsearchConfig) -> SearchResult<Self> {
        let base = base_url(&config.url)?;
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| SearchError::ConnectionError(e.to_string()))?;

        debug!(
            host = base.host_str().unwrap_or_default(),
            auth = config.username.is_some(),
            "Search client created"
        );

        Ok(Self {
            client,
            base,
            credentials: config
                .username
                .clone()
                .map(|user| (user, config.password.clone())),
        })
    }

    /// Check that the node answers.
    pub async fn is_healthy(&self) -> bool {
        match self.send(self.client.get(self.base.clone())).await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn send(&self, request: RequestBuilder) -> SearchResult<Response> {
        let request = match &self.credentials {
            Some((user, password)) => request.basic_auth(user, password.as_deref()),
            None => request,
        };
        request.send().await.map_err(transport_error)
    }

    /// Fail on any status outside `2xx`, keeping the error body.
    async fn check(response: Response) -> SearchResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(request_error(status, &body))
    }
}

#[async_trait]
impl SearchIndex for ElasticsearchIndex {
    #[instrument(skip(self, doc))]
    async fn upsert(&self, index: &str, id: &str, doc: Value) -> SearchResult<()> {
        let request = self
            .client
            .post(update_url(&self.base, index, id))
            .json(&upsert_body(doc));

        let response = Self::check(self.send(request).await?).await?;
        trace!(status = %response.status(), "Update acknowledged");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, index: &str, id: &str) -> SearchResult<Option<Value>> {
        let response = self.send(self.client.get(get_url(&self.base, index, id))).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body: GetResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| SearchError::SerializationError(e.to_string()))?;

        Ok(if body.found { body.source } else { None })
    }

    #[instrument(skip(self))]
    async fn delete(&self, index: &str, id: &str) -> SearchResult<bool> {
        let response = self
            .send(self.client.delete(delete_url(&self.base, index, id)))
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            trace!("Document already absent");
            return Ok(false);
        }

        Self::check(response).await?;
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn count(&self, index: &str) -> SearchResult<u64> {
        let response = self.send(self.client.get(count_url(&self.base, index))).await?;
        // Index not created yet
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(0);
        }

        let body: CountResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| SearchError::SerializationError(e.to_string()))?;

        Ok(body.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_connect_validates_url() {
        let err = ElasticsearchIndex::connect(&ElasticsearchConfig::new("::bad")).err();
        assert!(matches!(err, Some(SearchError::ConnectionError(_))));
    }

    #[test]
    fn test_connect_keeps_credentials() {
        let config = ElasticsearchConfig::new("http://localhost:9200")
            .with_credentials(Some("elastic".into()), Some("changeme".into()));
        let index = ElasticsearchIndex::connect(&config).unwrap();
        assert_eq!(
            index.credentials,
            Some(("elastic".to_string(), Some("changeme".to_string())))
        );

        let anonymous = ElasticsearchConfig::new("http://localhost:9200")
            .with_credentials(Some(String::new()), None);
        assert!(ElasticsearchIndex::connect(&anonymous).unwrap().credentials.is_none());
    }

    // Test critique: un nœud injoignable est une erreur de connexion, donc réessayable
    #[tokio::test]
    async fn test_unreachable_node_is_retryable() {
        let config = ElasticsearchConfig {
            connect_timeout: Duration::from_millis(200),
            timeout: Duration::from_millis(500),
            ..ElasticsearchConfig::new("http://127.0.0.1:1")
        };
        let index = ElasticsearchIndex::connect(&config).unwrap();

        let err = index.count("labs").await.unwrap_err();
        assert!(err.is_retryable());
        let err = index.get("labs", "0x01").await.unwrap_err();
        assert!(err.is_retryable());
        assert!(!index.is_healthy().await);
    }
}
