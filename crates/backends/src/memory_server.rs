//! HTTP client for the durable memory store.
//!
//! Protocol:
//! - `POST {base}/v1/long-term-memory/` with `{"memories": [...]}`. The
//!   write counts as successful only when the backend answers 200 with a
//!   body reporting `{"status": "ok"}`.
//! - `POST {base}/v1/long-term-memory/search?optimize_query=false` with a
//!   filter body; the response carries `{"memories": [{"text": ...}, ...]}`.
//!
//! A single-namespace filter serializes as `{"eq": ...}`, a multi-namespace
//! filter as `{"any": [...]}`.

use async_trait::async_trait;
use mnemo_core::backend::{MemoryBackend, SearchFilter};
use mnemo_core::entry::{MemoryEntry, Namespace};
use mnemo_core::error::MemoryError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Client for the remote memory store API.
pub struct MemoryServerClient {
    base_url: String,
    client: reqwest::Client,
}

impl MemoryServerClient {
    /// Create a new client against the given base URL.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl MemoryBackend for MemoryServerClient {
    async fn create(&self, entries: Vec<MemoryEntry>) -> std::result::Result<(), MemoryError> {
        let url = format!("{}/v1/long-term-memory/", self.base_url);
        let body = CreateRequest { memories: entries };

        debug!(count = body.memories.len(), "Submitting memory entries");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| MemoryError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let message = response.text().await.unwrap_or_default();
            return Err(MemoryError::Rejected { status, message });
        }

        let ack: CreateResponse = response
            .json()
            .await
            .map_err(|e| MemoryError::Parse(e.to_string()))?;

        if ack.status != "ok" {
            return Err(MemoryError::Rejected {
                status,
                message: format!("backend status: {}", ack.status),
            });
        }

        Ok(())
    }

    async fn search(&self, filter: SearchFilter) -> std::result::Result<Vec<String>, MemoryError> {
        let url = format!(
            "{}/v1/long-term-memory/search?optimize_query=false",
            self.base_url
        );
        let body = SearchRequest::from(&filter);

        debug!(
            namespaces = ?filter.namespaces,
            limit = filter.limit,
            "Searching memory store"
        );

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| MemoryError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let message = response.text().await.unwrap_or_default();
            return Err(MemoryError::Rejected { status, message });
        }

        let found: SearchResponse = response
            .json()
            .await
            .map_err(|e| MemoryError::Parse(e.to_string()))?;

        Ok(found
            .memories
            .into_iter()
            .map(|m| m.text)
            .filter(|t| !t.is_empty())
            .collect())
    }
}

// --- Wire format ---

#[derive(Serialize)]
struct CreateRequest {
    memories: Vec<MemoryEntry>,
}

#[derive(Deserialize)]
struct CreateResponse {
    #[serde(default)]
    status: String,
}

#[derive(Serialize)]
struct EqClause<'a> {
    eq: &'a str,
}

#[derive(Serialize)]
#[serde(untagged)]
enum NamespaceClause {
    Eq { eq: Namespace },
    Any { any: Vec<Namespace> },
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<EqClause<'a>>,
    namespace: NamespaceClause,
    text: &'a str,
    limit: usize,
}

impl<'a> From<&'a SearchFilter> for SearchRequest<'a> {
    fn from(filter: &'a SearchFilter) -> Self {
        let namespace = if filter.namespaces.len() == 1 {
            NamespaceClause::Eq {
                eq: filter.namespaces[0],
            }
        } else {
            NamespaceClause::Any {
                any: filter.namespaces.clone(),
            }
        };

        Self {
            session_id: filter.session_id.as_deref().map(|eq| EqClause { eq }),
            namespace,
            text: &filter.text,
            limit: filter.limit,
        }
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    memories: Vec<FoundMemory>,
}

#[derive(Deserialize)]
struct FoundMemory {
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> MemoryServerClient {
        MemoryServerClient::new(base_url, Duration::from_secs(2))
    }

    #[tokio::test]
    async fn create_succeeds_on_ok_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/long-term-memory/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ok"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let entry = MemoryEntry::user_fact("u-1", "prefers window seats");
        assert!(client.create(vec![entry]).await.is_ok());
    }

    #[tokio::test]
    async fn create_rejects_non_ok_body_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/long-term-memory/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "error"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.create(vec![MemoryEntry::knowledge(
            "a fact long enough to matter",
        )])
        .await;
        assert!(matches!(result, Err(MemoryError::Rejected { .. })));
    }

    #[tokio::test]
    async fn create_maps_http_error_to_rejection() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/long-term-memory/"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.create(vec![MemoryEntry::knowledge("fact")]).await;
        match result {
            Err(MemoryError::Rejected { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn search_sends_eq_clause_for_single_namespace() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/long-term-memory/search"))
            .and(query_param("optimize_query", "false"))
            .and(body_json(serde_json::json!({
                "namespace": { "eq": "knowledge-base" },
                "text": "shipping schedule",
                "limit": 1
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "memories": [{ "text": "Ships on Thursdays." }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let texts = client
            .search(SearchFilter::knowledge("shipping schedule", 1))
            .await
            .unwrap();
        assert_eq!(texts, vec!["Ships on Thursdays.".to_string()]);
    }

    #[tokio::test]
    async fn search_sends_any_clause_and_session_scope() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/long-term-memory/search"))
            .and(body_json(serde_json::json!({
                "session_id": { "eq": "u-42" },
                "namespace": { "any": ["short-term", "long-term"] },
                "text": "coffee",
                "limit": 5
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "memories": [
                    { "text": "User: I only drink decaf" },
                    { "text": "" },
                    { "text": "prefers oat milk" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let texts = client
            .search(SearchFilter::user_memories("u-42", "coffee", 5))
            .await
            .unwrap();

        // Empty texts are filtered at the protocol edge.
        assert_eq!(texts.len(), 2);
        assert!(texts.iter().all(|t| !t.is_empty()));
    }

    #[tokio::test]
    async fn search_maps_malformed_body_to_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/long-term-memory/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.search(SearchFilter::knowledge("q", 1)).await;
        assert!(matches!(result, Err(MemoryError::Parse(_))));
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let client = test_client("http://127.0.0.1:1");
        let result = client.search(SearchFilter::knowledge("q", 1)).await;
        assert!(matches!(result, Err(MemoryError::Transport(_))));
    }
}
