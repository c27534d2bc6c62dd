//! The durable memory store seam.
//!
//! All three memory tiers live behind one backend: the store partitions by
//! namespace, searches semantically within a filter, and owns persistence.
//! This layer never sees embeddings or index internals.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::entry::{MemoryEntry, Namespace};
use crate::error::MemoryError;

/// Scope and shape of a memory search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchFilter {
    /// Exact-match session scope; `None` searches across sessions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Namespaces to search. A single namespace is an exact match, several
    /// are an any-of match.
    pub namespaces: Vec<Namespace>,

    /// Free-text query.
    pub text: String,

    /// Maximum number of results.
    pub limit: usize,
}

impl SearchFilter {
    /// Personal recall: short-term plus long-term entries for one session.
    pub fn user_memories(
        session_id: impl Into<String>,
        text: impl Into<String>,
        limit: usize,
    ) -> Self {
        Self {
            session_id: Some(session_id.into()),
            namespaces: vec![Namespace::ShortTerm, Namespace::LongTerm],
            text: text.into(),
            limit,
        }
    }

    /// Knowledge lookup, unscoped by session.
    pub fn knowledge(text: impl Into<String>, limit: usize) -> Self {
        Self {
            session_id: None,
            namespaces: vec![Namespace::KnowledgeBase],
            text: text.into(),
            limit,
        }
    }
}

/// The durable memory store.
///
/// Implementations: remote HTTP store, in-memory (for testing and local
/// runs). Create succeeds only when the backend explicitly acknowledges;
/// everything else is an error for the caller to downgrade as policy
/// dictates.
#[async_trait]
pub trait MemoryBackend: Send + Sync {
    /// Store a batch of entries.
    async fn create(&self, entries: Vec<MemoryEntry>) -> std::result::Result<(), MemoryError>;

    /// Search entries, returning matched texts in backend order with empty
    /// texts filtered out.
    async fn search(&self, filter: SearchFilter) -> std::result::Result<Vec<String>, MemoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_memory_filter_spans_both_personal_namespaces() {
        let filter = SearchFilter::user_memories("u-7", "coffee preferences", 5);
        assert_eq!(filter.session_id.as_deref(), Some("u-7"));
        assert_eq!(
            filter.namespaces,
            vec![Namespace::ShortTerm, Namespace::LongTerm]
        );
        assert_eq!(filter.limit, 5);
    }

    #[test]
    fn knowledge_filter_is_unscoped() {
        let filter = SearchFilter::knowledge("shipping schedule", 1);
        assert!(filter.session_id.is_none());
        assert_eq!(filter.namespaces, vec![Namespace::KnowledgeBase]);
        assert_eq!(filter.limit, 1);
    }
}
