//! # mnemo Backends
//!
//! Implementations of the core backend seams: HTTP clients for the remote
//! memory store, the semantic response cache, and an OpenAI-compatible chat
//! model, plus in-memory counterparts for tests and local runs.
//!
//! The clients here are honest: they return typed errors for transport
//! failures, backend rejections, and malformed responses. Degradation
//! policy (fail-open reads, best-effort writes) belongs to the facades in
//! `mnemo-memory`, not to this crate.

pub mod memory_server;
pub mod semantic_cache;
pub mod chat_model;
pub mod in_memory;

pub use memory_server::MemoryServerClient;
pub use semantic_cache::SemanticCacheClient;
pub use chat_model::OpenAiCompatModel;
pub use in_memory::{InMemoryBackend, InMemoryCache};
