//! Short-term conversation window.
//!
//! A bounded, session-scoped, ordered record of the current conversation.
//! The token budget is enforced on append: oldest turns are evicted first,
//! never the most recent. Appended turns are written through to the durable
//! store under the short-term namespace; eviction is local only, so older
//! turns stay reachable through long-term search.

use mnemo_core::backend::MemoryBackend;
use mnemo_core::entry::MemoryEntry;
use mnemo_core::token::TokenEstimator;
use mnemo_core::turn::Turn;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

struct WindowSlot {
    turn: Turn,
    cost: usize,
}

/// One session's bounded conversation window.
pub struct ConversationWindow {
    session_id: String,
    slots: VecDeque<WindowSlot>,
    total_tokens: usize,
    max_tokens: usize,
    estimator: Arc<dyn TokenEstimator>,
}

impl ConversationWindow {
    pub fn new(
        session_id: impl Into<String>,
        max_tokens: usize,
        estimator: Arc<dyn TokenEstimator>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            slots: VecDeque::new(),
            total_tokens: 0,
            max_tokens,
            estimator,
        }
    }

    /// Append a turn, then evict oldest turns until the total estimated
    /// cost fits the budget again. A turn costlier than the whole budget
    /// empties the window, itself included; the retained turns are always
    /// a suffix of everything appended.
    ///
    /// Returns the evicted turns, oldest first.
    pub fn append(&mut self, turn: Turn) -> Vec<Turn> {
        let cost = self.estimator.estimate_turn(&turn);
        self.total_tokens += cost;
        self.slots.push_back(WindowSlot { turn, cost });

        let mut evicted = Vec::new();
        while self.total_tokens > self.max_tokens {
            let Some(oldest) = self.slots.pop_front() else {
                break;
            };
            self.total_tokens -= oldest.cost;
            evicted.push(oldest.turn);
        }

        if !evicted.is_empty() {
            debug!(
                session_id = %self.session_id,
                evicted = evicted.len(),
                retained_tokens = self.total_tokens,
                "Evicted oldest turns over token budget"
            );
        }

        evicted
    }

    /// Ordered turns, oldest first.
    pub fn contents(&self) -> Vec<Turn> {
        self.slots.iter().map(|s| s.turn.clone()).collect()
    }

    /// Current estimated token cost of retained turns.
    pub fn total_tokens(&self) -> usize {
        self.total_tokens
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Per-session window registry.
///
/// Appends for one session serialize on that session's lock; distinct
/// sessions never contend. No lock is held across the durable write.
#[derive(Clone)]
pub struct SessionWindows {
    windows: Arc<RwLock<HashMap<String, Arc<Mutex<ConversationWindow>>>>>,
    backend: Arc<dyn MemoryBackend>,
    estimator: Arc<dyn TokenEstimator>,
    max_tokens: usize,
}

impl SessionWindows {
    pub fn new(
        backend: Arc<dyn MemoryBackend>,
        estimator: Arc<dyn TokenEstimator>,
        max_tokens: usize,
    ) -> Self {
        Self {
            windows: Arc::new(RwLock::new(HashMap::new())),
            backend,
            estimator,
            max_tokens,
        }
    }

    async fn window(&self, session_id: &str) -> Arc<Mutex<ConversationWindow>> {
        if let Some(window) = self.windows.read().await.get(session_id) {
            return window.clone();
        }

        let mut windows = self.windows.write().await;
        windows
            .entry(session_id.to_string())
            .or_insert_with(|| {
                Arc::new(Mutex::new(ConversationWindow::new(
                    session_id,
                    self.max_tokens,
                    self.estimator.clone(),
                )))
            })
            .clone()
    }

    /// Append a turn to the session's window, then write it through to the
    /// durable store. The write-through is best-effort; the in-process
    /// window stays authoritative for the current exchange.
    pub async fn append(&self, session_id: &str, turn: Turn) {
        let window = self.window(session_id).await;
        {
            let mut window = window.lock().await;
            window.append(turn.clone());
        }

        let entry = MemoryEntry::turn(session_id, &turn.render());
        if let Err(e) = self.backend.create(vec![entry]).await {
            warn!(session_id = %session_id, "Failed to persist turn: {e}");
        }
    }

    /// Ordered turns for a session, oldest first. Unknown sessions are
    /// empty, not errors.
    pub async fn contents(&self, session_id: &str) -> Vec<Turn> {
        if let Some(window) = self.windows.read().await.get(session_id) {
            return window.lock().await.contents();
        }
        Vec::new()
    }

    /// Retained token total for a session's window.
    pub async fn total_tokens(&self, session_id: &str) -> usize {
        if let Some(window) = self.windows.read().await.get(session_id) {
            return window.lock().await.total_tokens();
        }
        0
    }
}
