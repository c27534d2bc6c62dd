//! The retrieval augmentation orchestrator.
//!
//! One query flows cache check, context gathering, model invocation,
//! write-back. A cache hit short-circuits straight to the reply with no
//! retrieval and no model call. Context gathering is timeout-bounded per
//! source and fails open: partial context is fine, no context falls back
//! to answering the bare message. Write-backs run as detached tasks with
//! one bounded retry; the caller never waits on them.

use crate::router::QueryRouter;
use mnemo_core::model::{ChatModel, ChatPrompt};
use mnemo_core::turn::Turn;
use mnemo_memory::{LongTermMemory, SemanticCache, SessionWindows};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Delay before the single write-back retry.
const WRITE_BACK_RETRY_DELAY: Duration = Duration::from_millis(250);

const DEFAULT_GATHER_TIMEOUT: Duration = Duration::from_secs(2);

/// One incoming chat query.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Conversation/user scope for short-term and personal memory.
    pub session_id: String,

    /// The user's message, verbatim. Doubles as the cache key.
    pub message: String,

    /// Also store the message as a durable user fact.
    pub remember: bool,
}

impl ChatRequest {
    pub fn new(session_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            message: message.into(),
            remember: false,
        }
    }

    pub fn with_remember(mut self, remember: bool) -> Self {
        self.remember = remember;
        self
    }
}

/// Where a reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    /// Served from the semantic response cache.
    Cache,
    /// Freshly generated by the model.
    Model,
}

/// What one query consulted on its way to a reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChatTrace {
    pub cache_hit: bool,
    pub short_term_turns: usize,
    pub user_memories: usize,
    pub knowledge_facts: usize,
    pub gather_timed_out: bool,
}

/// The assistant's answer plus provenance.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub text: String,
    pub source: ReplySource,
    pub trace: ChatTrace,
}

/// Coordinates the cache, the memory tiers, and the model for one query
/// at a time per call. Holds no contested state of its own; per-session
/// window ordering is the windows registry's concern.
pub struct ChatOrchestrator {
    cache: SemanticCache,
    memory: LongTermMemory,
    windows: SessionWindows,
    model: Arc<dyn ChatModel>,
    router: QueryRouter,
    gather_timeout: Duration,
    system_prompt: Option<String>,
}

impl ChatOrchestrator {
    pub fn new(
        cache: SemanticCache,
        memory: LongTermMemory,
        windows: SessionWindows,
        model: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            cache,
            memory,
            windows,
            model,
            router: QueryRouter::default(),
            gather_timeout: DEFAULT_GATHER_TIMEOUT,
            system_prompt: None,
        }
    }

    /// Swap the retrieval routing strategy.
    pub fn with_router(mut self, router: QueryRouter) -> Self {
        self.router = router;
        self
    }

    /// Bound each remote context fetch.
    pub fn with_gather_timeout(mut self, timeout: Duration) -> Self {
        self.gather_timeout = timeout;
        self
    }

    /// Set the assistant persona sent with every model call.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Answer one user message.
    ///
    /// Only a model failure surfaces as an error; every retrieval source
    /// degrades to absence instead.
    pub async fn chat(
        &self,
        request: ChatRequest,
    ) -> Result<ChatReply, mnemo_core::Error> {
        info!(
            session_id = %request.session_id,
            remember = request.remember,
            "Handling chat query"
        );

        // ── Cache check ──
        if let Some(cached) = self.cache.lookup(&request.message).await {
            debug!(session_id = %request.session_id, "Returning cached response");
            self.record_exchange(&request.session_id, &request.message, &cached)
                .await;
            return Ok(ChatReply {
                text: cached,
                source: ReplySource::Cache,
                trace: ChatTrace {
                    cache_hit: true,
                    ..ChatTrace::default()
                },
            });
        }

        // ── Context gathering ──
        let (contents, trace) = self.gather_context(&request).await;

        // ── Model invocation ──
        let mut prompt = ChatPrompt::new(augment(&request.message, &contents));
        if let Some(system) = &self.system_prompt {
            prompt = prompt.with_system(system.clone());
        }
        let reply = self.model.complete(prompt).await?;

        // ── Record and write back ──
        self.record_exchange(&request.session_id, &request.message, &reply)
            .await;
        self.spawn_write_backs(request, reply.clone());

        Ok(ChatReply {
            text: reply,
            source: ReplySource::Model,
            trace,
        })
    }

    /// Assemble the ordered context block: window turns first, then
    /// personal memories, then knowledge facts.
    async fn gather_context(&self, request: &ChatRequest) -> (Vec<String>, ChatTrace) {
        let mut trace = ChatTrace::default();

        let turns = self.windows.contents(&request.session_id).await;
        trace.short_term_turns = turns.len();

        let targets = self.router.targets(&request.message).await;
        let (personal, knowledge) = tokio::join!(
            self.fetch_personal(request, targets.long_term),
            self.fetch_knowledge(&request.message, targets.knowledge),
        );
        trace.gather_timed_out = personal.1 || knowledge.1;
        trace.user_memories = personal.0.len();
        trace.knowledge_facts = knowledge.0.len();

        let mut contents: Vec<String> = turns.iter().map(Turn::render).collect();
        contents.extend(personal.0);
        contents.extend(knowledge.0);
        (contents, trace)
    }

    async fn fetch_personal(&self, request: &ChatRequest, enabled: bool) -> (Vec<String>, bool) {
        if !enabled {
            return (Vec::new(), false);
        }
        match tokio::time::timeout(
            self.gather_timeout,
            self.memory.recall(&request.session_id, &request.message),
        )
        .await
        {
            Ok(memories) => (memories, false),
            Err(_) => {
                warn!(
                    session_id = %request.session_id,
                    "Personal memory recall timed out, proceeding without it"
                );
                (Vec::new(), true)
            }
        }
    }

    async fn fetch_knowledge(&self, query: &str, enabled: bool) -> (Vec<String>, bool) {
        if !enabled {
            return (Vec::new(), false);
        }
        match tokio::time::timeout(self.gather_timeout, self.memory.search_knowledge(query)).await
        {
            Ok(facts) => (facts, false),
            Err(_) => {
                warn!("Knowledge search timed out, proceeding without it");
                (Vec::new(), true)
            }
        }
    }

    /// Append both sides of the exchange to the session window, in order.
    async fn record_exchange(&self, session_id: &str, message: &str, reply: &str) {
        self.windows.append(session_id, Turn::user(message)).await;
        self.windows
            .append(session_id, Turn::assistant(reply))
            .await;
    }

    /// Dispatch the post-reply writes without blocking the caller.
    fn spawn_write_backs(&self, request: ChatRequest, reply: String) {
        let cache = self.cache.clone();
        let memory = self.memory.clone();

        tokio::spawn(async move {
            if !retry_once(|| cache.store(&request.message, &reply)).await {
                warn!("Dropped cache write-back after retry");
            }
            if request.remember
                && !retry_once(|| memory.remember(&request.session_id, &request.message)).await
            {
                warn!(
                    session_id = %request.session_id,
                    "Dropped user memory write-back after retry"
                );
            }
        });
    }
}

/// Inject gathered context into the fixed prompt template. An empty
/// context block leaves the message untouched.
fn augment(message: &str, contents: &[String]) -> String {
    if contents.is_empty() {
        return message.to_string();
    }
    format!("{message}\n\n[Context]\n{}", contents.join("\n"))
}

/// Run a best-effort write, retrying once after a short delay.
async fn retry_once<F, Fut>(op: F) -> bool
where
    F: Fn() -> Fut,
    Fut: Future<Output = bool>,
{
    if op().await {
        return true;
    }
    tokio::time::sleep(WRITE_BACK_RETRY_DELAY).await;
    op().await
}
