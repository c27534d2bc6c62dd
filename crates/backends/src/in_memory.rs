//! In-memory implementations of the backend seams.
//!
//! Used by tests and local runs without remote services. Search is naive
//! keyword overlap and similarity is word-set overlap: enough to exercise
//! policy, not a semantic index. The cache uses `tokio::time::Instant` so
//! TTL expiry is observable under the paused test clock.

use async_trait::async_trait;
use mnemo_core::backend::{MemoryBackend, SearchFilter};
use mnemo_core::cache::{CacheHit, ResponseCache};
use mnemo_core::entry::MemoryEntry;
use mnemo_core::error::{CacheError, MemoryError};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};
use uuid::Uuid;

/// Volatile memory store.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    entries: Arc<RwLock<Vec<MemoryEntry>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Snapshot of all entries, oldest first.
    pub async fn entries(&self) -> Vec<MemoryEntry> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl MemoryBackend for InMemoryBackend {
    async fn create(&self, entries: Vec<MemoryEntry>) -> std::result::Result<(), MemoryError> {
        self.entries.write().await.extend(entries);
        Ok(())
    }

    async fn search(&self, filter: SearchFilter) -> std::result::Result<Vec<String>, MemoryError> {
        let entries = self.entries.read().await;

        let mut scored: Vec<(f32, &MemoryEntry)> = entries
            .iter()
            .filter(|e| filter.namespaces.contains(&e.namespace))
            .filter(|e| match &filter.session_id {
                Some(session) => e.session_id.as_deref() == Some(session.as_str()),
                None => true,
            })
            .filter_map(|e| {
                let score = keyword_score(&filter.text, &e.text);
                (score > 0.0).then_some((score, e))
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(filter.limit);

        Ok(scored
            .into_iter()
            .map(|(_, e)| e.text.clone())
            .filter(|t| !t.is_empty())
            .collect())
    }
}

/// Fraction of query words that appear in the text.
fn keyword_score(query: &str, text: &str) -> f32 {
    let text_lower = text.to_lowercase();
    let mut hits = 0usize;
    let mut total = 0usize;

    for word in query.to_lowercase().split_whitespace() {
        total += 1;
        if text_lower.contains(word) {
            hits += 1;
        }
    }

    if total == 0 {
        0.0
    } else {
        hits as f32 / total as f32
    }
}

struct StoredResponse {
    id: String,
    prompt: String,
    response: String,
    stored_at: Instant,
}

/// Volatile TTL'd response cache.
#[derive(Clone)]
pub struct InMemoryCache {
    entries: Arc<RwLock<Vec<StoredResponse>>>,
    similarity_threshold: f32,
    ttl: Duration,
}

impl InMemoryCache {
    pub fn new(similarity_threshold: f32, ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            similarity_threshold,
            ttl,
        }
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl ResponseCache for InMemoryCache {
    async fn store(&self, prompt: &str, response: &str) -> std::result::Result<(), CacheError> {
        self.entries.write().await.push(StoredResponse {
            id: Uuid::new_v4().to_string(),
            prompt: prompt.to_string(),
            response: response.to_string(),
            stored_at: Instant::now(),
        });
        Ok(())
    }

    async fn lookup(&self, prompt: &str) -> std::result::Result<Vec<CacheHit>, CacheError> {
        let now = Instant::now();
        let entries = self.entries.read().await;

        let mut hits: Vec<CacheHit> = entries
            .iter()
            .filter(|e| now.duration_since(e.stored_at) < self.ttl)
            .filter_map(|e| {
                let similarity = prompt_similarity(prompt, &e.prompt);
                (similarity >= self.similarity_threshold).then(|| CacheHit {
                    id: e.id.clone(),
                    prompt: e.prompt.clone(),
                    response: e.response.clone(),
                    search_strategy: "semantic".into(),
                    similarity,
                    attributes: serde_json::Map::new(),
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(hits)
    }
}

/// Word-set overlap (Jaccard): 1.0 for identical word sets, 0.0 for
/// disjoint prompts.
fn prompt_similarity(a: &str, b: &str) -> f32 {
    use std::collections::HashSet;

    let set_a: HashSet<String> = a.to_lowercase().split_whitespace().map(str::to_string).collect();
    let set_b: HashSet<String> = b.to_lowercase().split_whitespace().map(str::to_string).collect();

    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }

    let shared = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    shared as f32 / union as f32
}
