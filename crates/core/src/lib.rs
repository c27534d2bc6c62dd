//! # mnemo Core
//!
//! Domain types, traits, and error definitions for the mnemo tiered-memory
//! runtime. This crate carries no runtime or HTTP dependencies; it defines
//! the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is defined as a trait here: the durable
//! memory store, the semantic response cache, the chat model, the token
//! estimator, and the document parser/splitter pair. Implementations live in
//! their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with in-memory implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod entry;
pub mod turn;
pub mod backend;
pub mod cache;
pub mod model;
pub mod token;
pub mod document;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use entry::{MemoryEntry, Namespace, sanitize};
pub use turn::{Turn, TurnRole};
pub use backend::{MemoryBackend, SearchFilter};
pub use cache::{CacheHit, ResponseCache};
pub use model::{ChatModel, ChatPrompt};
pub use token::{HeuristicTokenEstimator, TokenEstimator};
pub use document::{DocumentParser, DocumentSegment, DocumentSplitter};
