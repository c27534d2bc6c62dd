//! Pluggable routing between the personal memory tiers and the knowledge
//! base.
//!
//! The routing decision is a first-class value, so "no router configured"
//! is the explicit [`QueryRouter::AlwaysBoth`] policy rather than a missing
//! dependency, and call sites never change when the strategy does.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// Which durable sources one query should consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteTargets {
    /// Session-scoped user memories.
    pub long_term: bool,
    /// The shared knowledge base.
    pub knowledge: bool,
}

impl RouteTargets {
    pub const BOTH: RouteTargets = RouteTargets {
        long_term: true,
        knowledge: true,
    };
}

/// An external routing decision, typically model-backed.
#[async_trait]
pub trait RouteDecision: Send + Sync {
    async fn route(&self, message: &str) -> mnemo_core::Result<RouteTargets>;
}

/// Strategy for choosing retrieval sources on a cache miss.
#[derive(Clone, Default)]
pub enum QueryRouter {
    /// Consult both sources unconditionally and merge.
    #[default]
    AlwaysBoth,
    /// Personal memories only.
    LongTermOnly,
    /// Shared knowledge only.
    KnowledgeOnly,
    /// Delegate per query. A failed decision falls back to both sources,
    /// never to none.
    ModelRouted(Arc<dyn RouteDecision>),
}

impl QueryRouter {
    /// Resolve the sources to consult for one message.
    pub async fn targets(&self, message: &str) -> RouteTargets {
        match self {
            QueryRouter::AlwaysBoth => RouteTargets::BOTH,
            QueryRouter::LongTermOnly => RouteTargets {
                long_term: true,
                knowledge: false,
            },
            QueryRouter::KnowledgeOnly => RouteTargets {
                long_term: false,
                knowledge: true,
            },
            QueryRouter::ModelRouted(decision) => match decision.route(message).await {
                Ok(targets) => targets,
                Err(e) => {
                    warn!("Route decision failed, consulting both sources: {e}");
                    RouteTargets::BOTH
                }
            },
        }
    }
}

impl std::fmt::Debug for QueryRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryRouter::AlwaysBoth => write!(f, "AlwaysBoth"),
            QueryRouter::LongTermOnly => write!(f, "LongTermOnly"),
            QueryRouter::KnowledgeOnly => write!(f, "KnowledgeOnly"),
            QueryRouter::ModelRouted(_) => write!(f, "ModelRouted"),
        }
    }
}
