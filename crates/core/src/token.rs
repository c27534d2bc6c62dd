//! Token cost estimation for window budgeting.
//!
//! Rule of thumb: roughly 4 characters per token for English text. Close
//! enough for pruning decisions; exact counts are the model's business.

use crate::turn::Turn;

/// Per-turn framing overhead added on top of the raw text estimate.
pub const TURN_OVERHEAD_TOKENS: usize = 4;

/// Pluggable token cost estimator.
pub trait TokenEstimator: Send + Sync {
    /// Estimated token cost of a piece of text.
    fn estimate(&self, text: &str) -> usize;

    /// Estimated cost of a full turn, including framing overhead.
    fn estimate_turn(&self, turn: &Turn) -> usize {
        self.estimate(&turn.text) + TURN_OVERHEAD_TOKENS
    }
}

/// Character-count heuristic: ~4 chars per token, rounded up.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTokenEstimator;

impl TokenEstimator for HeuristicTokenEstimator {
    fn estimate(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        (text.len() + 3) / 4
    }
}
