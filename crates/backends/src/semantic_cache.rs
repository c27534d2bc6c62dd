//! HTTP client for the semantic response cache.
//!
//! Bearer-authenticated. Writes carry the configured TTL in milliseconds;
//! lookups carry the configured similarity threshold and request the
//! semantic match strategy. Hit ordering is whatever the backend returns;
//! consumers sort before trusting it.

use async_trait::async_trait;
use mnemo_core::cache::{CacheHit, ResponseCache};
use mnemo_core::error::CacheError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const SEARCH_STRATEGY_SEMANTIC: &str = "semantic";

/// Client for the remote semantic cache API.
pub struct SemanticCacheClient {
    base_url: String,
    api_key: Option<String>,
    cache_id: String,
    similarity_threshold: f32,
    ttl: Duration,
    client: reqwest::Client,
}

impl SemanticCacheClient {
    /// Create a new client for one cache on the backend.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        cache_id: impl Into<String>,
        similarity_threshold: f32,
        ttl: Duration,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            cache_id: cache_id.into(),
            similarity_threshold,
            ttl,
            client,
        }
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("Authorization", format!("Bearer {key}")),
            None => request,
        }
    }
}

#[async_trait]
impl ResponseCache for SemanticCacheClient {
    async fn store(&self, prompt: &str, response: &str) -> std::result::Result<(), CacheError> {
        let url = format!("{}/v1/caches/{}/entries", self.base_url, self.cache_id);
        let body = StoreRequest {
            prompt,
            response,
            ttl_millis: self.ttl.as_millis() as u64,
        };

        debug!(cache_id = %self.cache_id, "Storing cache entry");

        let reply = self
            .authorized(self.client.post(&url).json(&body))
            .send()
            .await
            .map_err(|e| CacheError::Transport(e.to_string()))?;

        let status = reply.status();
        if !status.is_success() {
            let message = reply.text().await.unwrap_or_default();
            return Err(CacheError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }

    async fn lookup(&self, prompt: &str) -> std::result::Result<Vec<CacheHit>, CacheError> {
        let url = format!(
            "{}/v1/caches/{}/entries/search",
            self.base_url, self.cache_id
        );
        let body = SearchRequest {
            prompt,
            similarity_threshold: self.similarity_threshold,
            search_strategies: vec![SEARCH_STRATEGY_SEMANTIC],
        };

        let reply = self
            .authorized(self.client.post(&url).json(&body))
            .send()
            .await
            .map_err(|e| CacheError::Transport(e.to_string()))?;

        let status = reply.status();
        if !status.is_success() {
            let message = reply.text().await.unwrap_or_default();
            return Err(CacheError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        // A body without a `data` field means no match, not an error.
        let found: SearchResponse = reply
            .json()
            .await
            .map_err(|e| CacheError::Parse(e.to_string()))?;

        Ok(found.data)
    }
}

// --- Wire format ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoreRequest<'a> {
    prompt: &'a str,
    response: &'a str,
    ttl_millis: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    prompt: &'a str,
    similarity_threshold: f32,
    search_strategies: Vec<&'static str>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<CacheHit>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> SemanticCacheClient {
        SemanticCacheClient::new(
            base_url,
            Some("test-key".into()),
            "test-cache",
            0.7,
            Duration::from_secs(60),
            Duration::from_secs(2),
        )
    }

    #[tokio::test]
    async fn store_sends_ttl_and_bearer_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/caches/test-cache/entries"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_json(serde_json::json!({
                "prompt": "what time is standup",
                "response": "9:30 in the main channel",
                "ttlMillis": 60000
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "entryId": "e-1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client
            .store("what time is standup", "9:30 in the main channel")
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn lookup_sends_threshold_and_strategy() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/caches/test-cache/entries/search"))
            .and(body_json(serde_json::json!({
                "prompt": "what time is standup",
                "similarityThreshold": 0.7,
                "searchStrategies": ["semantic"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{
                    "id": "e-1",
                    "prompt": "when is standup",
                    "response": "9:30 in the main channel",
                    "searchStrategy": "semantic",
                    "similarity": 0.92,
                    "attributes": {}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let hits = client.lookup("what time is standup").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].response, "9:30 in the main channel");
        assert!(hits[0].similarity > 0.9);
    }

    #[tokio::test]
    async fn lookup_treats_missing_data_as_no_match() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/caches/test-cache/entries/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let hits = client.lookup("anything").await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn lookup_maps_auth_failure_to_rejection() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/caches/test-cache/entries/search"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.lookup("anything").await;
        assert!(matches!(
            result,
            Err(CacheError::Rejected { status: 401, .. })
        ));
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let client = test_client("http://127.0.0.1:1");
        let result = client.store("p", "r").await;
        assert!(matches!(result, Err(CacheError::Transport(_))));
    }
}
