//! Semantic response cache facade.
//!
//! Policy wrapper over a [`ResponseCache`] implementation: lookups fail
//! open and consume only the top match after an explicit similarity sort;
//! stores are best-effort. The primary response path never blocks on a
//! misbehaving cache.

use mnemo_core::cache::ResponseCache;
use std::sync::Arc;
use tracing::{debug, warn};

/// Fail-open, best-effort view of the semantic response cache.
#[derive(Clone)]
pub struct SemanticCache {
    backend: Arc<dyn ResponseCache>,
}

impl SemanticCache {
    pub fn new(backend: Arc<dyn ResponseCache>) -> Self {
        Self { backend }
    }

    /// Best cached response for a prompt, if any. Any failure is a miss.
    pub async fn lookup(&self, prompt: &str) -> Option<String> {
        let mut hits = match self.backend.lookup(prompt).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!("Cache lookup failed, treating as miss: {e}");
                return None;
            }
        };

        // Backend sort order is not contractual; sort before taking the top.
        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let top = hits.into_iter().next()?;
        debug!(similarity = top.similarity, "Semantic cache hit");
        Some(top.response)
    }

    /// Store a prompt/response pair. Returns whether the write was
    /// acknowledged; failures are logged and dropped.
    pub async fn store(&self, prompt: &str, response: &str) -> bool {
        match self.backend.store(prompt, response).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Cache write dropped: {e}");
                false
            }
        }
    }
}
