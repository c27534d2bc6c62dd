//! Command implementations, one module per subcommand, plus the shared
//! wiring that assembles the memory stack from configuration.

pub mod chat;
pub mod config_cmd;
pub mod daemon;
pub mod ingest;
pub mod remember;

use mnemo_agent::ChatOrchestrator;
use mnemo_backends::{MemoryServerClient, OpenAiCompatModel, SemanticCacheClient};
use mnemo_config::AppConfig;
use mnemo_core::backend::MemoryBackend;
use mnemo_core::token::HeuristicTokenEstimator;
use mnemo_ingest::{IngestPipeline, ParagraphSplitter, PlainTextParser};
use mnemo_memory::{LongTermMemory, SemanticCache, SessionWindows};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Load configuration from the explicit path when given, otherwise from
/// the default location with environment overrides.
pub(crate) fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
    .map_err(|e| format!("Failed to load config: {e}"))?;
    Ok(config)
}

/// The three memory tiers, wired against the configured remote services.
pub(crate) struct MemoryStack {
    pub memory: LongTermMemory,
    pub windows: SessionWindows,
    pub cache: SemanticCache,
}

pub(crate) fn build_memory_stack(config: &AppConfig) -> MemoryStack {
    let backend: Arc<dyn MemoryBackend> = Arc::new(MemoryServerClient::new(
        &config.memory_server.base_url,
        Duration::from_secs(config.memory_server.request_timeout_secs),
    ));

    let cache_client = SemanticCacheClient::new(
        &config.cache.base_url,
        config.cache.api_key.clone(),
        &config.cache.cache_id,
        config.cache.similarity_threshold,
        Duration::from_secs(config.cache.ttl_secs),
        Duration::from_secs(config.cache.request_timeout_secs),
    );

    MemoryStack {
        memory: LongTermMemory::new(backend.clone()),
        windows: SessionWindows::new(
            backend,
            Arc::new(HeuristicTokenEstimator),
            config.window.max_tokens,
        ),
        cache: SemanticCache::new(Arc::new(cache_client)),
    }
}

pub(crate) fn build_orchestrator(config: &AppConfig, stack: MemoryStack) -> ChatOrchestrator {
    let model = Arc::new(OpenAiCompatModel::new(
        &config.model.base_url,
        config.model.api_key.clone(),
        &config.model.model,
        config.model.temperature,
        Duration::from_secs(config.model.request_timeout_secs),
    ));

    let mut orchestrator = ChatOrchestrator::new(stack.cache, stack.memory, stack.windows, model)
        .with_gather_timeout(Duration::from_millis(config.retrieval.gather_timeout_ms));

    if let Some(prompt) = &config.model.system_prompt {
        orchestrator = orchestrator.with_system_prompt(prompt.clone());
    }

    orchestrator
}

pub(crate) fn build_pipeline(config: &AppConfig, memory: LongTermMemory) -> Arc<IngestPipeline> {
    Arc::new(IngestPipeline::new(
        memory,
        Arc::new(PlainTextParser),
        Arc::new(ParagraphSplitter::default()),
        config.ingest.watch_dir.clone(),
        &config.ingest.extension,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_stack_builds_from_default_config() {
        let config = AppConfig::default();
        let stack = build_memory_stack(&config);
        let _pipeline = build_pipeline(&config, stack.memory.clone());
        let _orchestrator = build_orchestrator(&config, stack);
    }
}
