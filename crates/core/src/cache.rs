//! The semantic response cache seam.
//!
//! Lookups match by similarity, not string equality, and entries expire
//! after a TTL. Threshold and TTL are implementation configuration; the
//! trait surface only moves prompts, responses, and scored hits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// A scored match returned by a similarity lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheHit {
    pub id: String,

    /// The prompt the cached response was stored under.
    pub prompt: String,

    /// The cached response text.
    pub response: String,

    /// Which strategy matched (e.g. "semantic").
    #[serde(rename = "searchStrategy", default)]
    pub search_strategy: String,

    /// Similarity score of this hit against the query prompt.
    #[serde(default)]
    pub similarity: f32,

    /// Backend-defined extra attributes.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

/// The semantic response cache.
///
/// Hit ordering is backend-defined; callers that only want the best match
/// must sort by similarity themselves.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Store a prompt/response pair under the cache's configured TTL.
    async fn store(&self, prompt: &str, response: &str) -> std::result::Result<(), CacheError>;

    /// Scored matches at or above the configured similarity threshold.
    async fn lookup(&self, prompt: &str) -> std::result::Result<Vec<CacheHit>, CacheError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_hit_deserializes_from_wire_shape() {
        let json = r#"{
            "id": "e-1",
            "prompt": "what time is standup",
            "response": "9:30 in the main channel",
            "searchStrategy": "semantic",
            "similarity": 0.91,
            "attributes": {}
        }"#;
        let hit: CacheHit = serde_json::from_str(json).unwrap();
        assert_eq!(hit.search_strategy, "semantic");
        assert!(hit.similarity > 0.9);
    }

    #[test]
    fn cache_hit_tolerates_missing_optional_fields() {
        let json = r#"{"id": "e-2", "prompt": "p", "response": "r"}"#;
        let hit: CacheHit = serde_json::from_str(json).unwrap();
        assert_eq!(hit.similarity, 0.0);
        assert!(hit.attributes.is_empty());
    }
}
