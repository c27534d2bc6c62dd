//! # mnemo Agent
//!
//! Retrieval-augmented chat orchestration. The [`ChatOrchestrator`] wires
//! the semantic cache, the memory tiers, and the chat model into a single
//! query path; the [`QueryRouter`] decides which memory sources a given
//! query consults.

pub mod orchestrator;
pub mod router;

pub use orchestrator::{ChatOrchestrator, ChatReply, ChatRequest, ChatTrace, ReplySource};
pub use router::{QueryRouter, RouteDecision, RouteTargets};
