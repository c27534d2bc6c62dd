//! Long-term memory facade: durable user facts and shared knowledge.
//!
//! This layer owns the degradation policy. Reads fail open to an empty
//! result, writes are logged and dropped on failure, and result sizes are
//! clamped client-side so a misbehaving backend can never hand back more
//! than the configured limits.

use mnemo_core::backend::{MemoryBackend, SearchFilter};
use mnemo_core::entry::MemoryEntry;
use std::sync::Arc;
use tracing::warn;

/// Most user-personal memories a single recall returns.
pub const USER_MEMORY_LIMIT: usize = 5;

/// Knowledge lookups return the best single fact, not a ranked list.
pub const KNOWLEDGE_LIMIT: usize = 1;

/// Fail-open client for the durable memory tiers.
#[derive(Clone)]
pub struct LongTermMemory {
    backend: Arc<dyn MemoryBackend>,
}

impl LongTermMemory {
    pub fn new(backend: Arc<dyn MemoryBackend>) -> Self {
        Self { backend }
    }

    /// Store an explicit "remember this" fact for a session.
    ///
    /// Returns whether the backend acknowledged the write. Failures are
    /// logged, never raised.
    pub async fn remember(&self, session_id: &str, fact: &str) -> bool {
        let entry = MemoryEntry::user_fact(session_id, fact);
        match self.backend.create(vec![entry]).await {
            Ok(()) => true,
            Err(e) => {
                warn!(session_id = %session_id, "Failed to store user memory: {e}");
                false
            }
        }
    }

    /// Store one knowledge-base entry. Ingestion must not stop on a single
    /// bad write, so failures are logged and swallowed.
    pub async fn store_knowledge(&self, text: &str) -> bool {
        let entry = MemoryEntry::knowledge(text);
        match self.backend.create(vec![entry]).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to store knowledge entry: {e}");
                false
            }
        }
    }

    /// Personal context for a session: short-term plus long-term matches,
    /// at most [`USER_MEMORY_LIMIT`] of them.
    pub async fn recall(&self, session_id: &str, query: &str) -> Vec<String> {
        let filter = SearchFilter::user_memories(session_id, query, USER_MEMORY_LIMIT);
        self.search_fail_open(filter, USER_MEMORY_LIMIT).await
    }

    /// Best single knowledge-base fact for a query.
    pub async fn search_knowledge(&self, query: &str) -> Vec<String> {
        let filter = SearchFilter::knowledge(query, KNOWLEDGE_LIMIT);
        self.search_fail_open(filter, KNOWLEDGE_LIMIT).await
    }

    async fn search_fail_open(&self, filter: SearchFilter, limit: usize) -> Vec<String> {
        match self.backend.search(filter).await {
            Ok(mut texts) => {
                texts.truncate(limit);
                texts
            }
            Err(e) => {
                warn!("Memory search failed, continuing without context: {e}");
                Vec::new()
            }
        }
    }
}
