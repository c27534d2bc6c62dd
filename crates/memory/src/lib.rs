//! # mnemo Memory
//!
//! The three memory tiers as the orchestrator sees them:
//!
//! - [`window::SessionWindows`] — bounded short-term conversation windows,
//!   one per session, pruned oldest-first by token budget.
//! - [`recall::LongTermMemory`] — fail-open access to durable user facts
//!   and the shared knowledge base.
//! - [`cache::SemanticCache`] — best-effort, fail-open wrapper over the
//!   semantic response cache.
//!
//! Degradation policy lives here: reads degrade to empty results, writes
//! are logged and dropped, and nothing in this crate can take down the
//! primary response path.

pub mod window;
pub mod recall;
pub mod cache;

pub use window::{ConversationWindow, SessionWindows};
pub use recall::{KNOWLEDGE_LIMIT, LongTermMemory, USER_MEMORY_LIMIT};
pub use cache::SemanticCache;
