//! Error types for the mnemo domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant. Degradation policy
//! (fail-open reads, best-effort writes) lives in the facades, not here:
//! these types report what actually happened at a backend boundary.

use thiserror::Error;

/// The top-level error type for all mnemo operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Memory store errors ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    // --- Semantic cache errors ---
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    // --- Model errors ---
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    // --- Ingestion errors ---
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures at the durable memory store boundary.
#[derive(Debug, Clone, Error)]
pub enum MemoryError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Backend rejected request: {message} (status: {status})")]
    Rejected { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Parse(String),
}

/// Failures at the semantic response cache boundary.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Backend rejected request: {message} (status: {status})")]
    Rejected { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Parse(String),
}

/// Failures invoking the chat model collaborator.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Model endpoint rejected request: {message} (status: {status})")]
    Rejected { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Parse(String),
}

/// Failures while turning a source document into knowledge entries.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Document parse failed: {0}")]
    Parse(String),

    #[error("Document contains no extractable text")]
    EmptyDocument,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_error_displays_correctly() {
        let err = Error::Memory(MemoryError::Rejected {
            status: 503,
            message: "index rebuilding".into(),
        });
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("index rebuilding"));
    }

    #[test]
    fn ingest_error_displays_correctly() {
        let err = Error::Ingest(IngestError::Io {
            path: "notes/q3.txt".into(),
            reason: "permission denied".into(),
        });
        assert!(err.to_string().contains("notes/q3.txt"));
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn cache_transport_wraps_into_top_level() {
        let err: Error = CacheError::Transport("connection refused".into()).into();
        assert!(matches!(err, Error::Cache(_)));
        assert!(err.to_string().contains("connection refused"));
    }
}
