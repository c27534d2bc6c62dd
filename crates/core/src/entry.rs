//! Memory entry domain types.
//!
//! A [`MemoryEntry`] is the unit stored in the durable memory backend.
//! Entries are partitioned by [`Namespace`] so conversational turns, durable
//! user facts, and shared document knowledge never cross-contaminate a
//! search. `(namespace, id)` is unique; entries are immutable once written,
//! so updates are modeled as new entries, not in-place edits.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Classification tag understood by the backend's own indexing. Opaque to
/// this layer.
pub const MEMORY_TYPE_SEMANTIC: &str = "semantic";

const KNOWLEDGE_ID_PREFIX: &str = "knowledge.entry";

/// Partition key separating the three memory tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Namespace {
    /// Turns of an ongoing conversation, pruned by token budget.
    ShortTerm,
    /// Durable user-specific facts.
    LongTerm,
    /// Shared document knowledge fed by ingestion.
    KnowledgeBase,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::ShortTerm => "short-term",
            Namespace::LongTerm => "long-term",
            Namespace::KnowledgeBase => "knowledge-base",
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single entry in the durable memory store.
///
/// Field names match the backend wire format, so this struct serializes
/// directly into the `memories` array of a create request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// Unique within its namespace.
    pub id: String,

    /// Owning conversation/user; absent for knowledge entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Partition this entry lives in.
    pub namespace: Namespace,

    /// Sanitized free text.
    pub text: String,

    /// Indexing tag, normally [`MEMORY_TYPE_SEMANTIC`].
    pub memory_type: String,
}

impl MemoryEntry {
    /// A durable fact about a user, scoped to their session id.
    pub fn user_fact(session_id: impl Into<String>, text: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id: Some(session_id.into()),
            namespace: Namespace::LongTerm,
            text: sanitize(text),
            memory_type: MEMORY_TYPE_SEMANTIC.into(),
        }
    }

    /// A knowledge-base entry with a freshly generated id.
    pub fn knowledge(text: &str) -> Self {
        Self {
            id: format!("{KNOWLEDGE_ID_PREFIX}.{}", Uuid::new_v4()),
            session_id: None,
            namespace: Namespace::KnowledgeBase,
            text: sanitize(text),
            memory_type: MEMORY_TYPE_SEMANTIC.into(),
        }
    }

    /// A conversational turn persisted to the short-term namespace.
    pub fn turn(session_id: impl Into<String>, text: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id: Some(session_id.into()),
            namespace: Namespace::ShortTerm,
            text: sanitize(text),
            memory_type: MEMORY_TYPE_SEMANTIC.into(),
        }
    }
}

/// Collapse CR/LF runs to a single space, then strip remaining control
/// characters except tab. Applied to all text before storage.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_newline_run = false;
    for ch in text.chars() {
        if ch == '\r' || ch == '\n' {
            if !in_newline_run {
                out.push(' ');
                in_newline_run = true;
            }
            continue;
        }
        in_newline_run = false;
        if ch.is_control() && ch != '\t' {
            continue;
        }
        out.push(ch);
    }
    out
}
