//! Configuration loading, validation, and management for mnemo.
//!
//! Loads configuration from `~/.mnemo/config.toml` with environment
//! variable overrides for secrets. Validates all settings at startup;
//! validation failure is the only fatal error class in the system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.mnemo/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Durable memory store connection
    #[serde(default)]
    pub memory_server: MemoryServerConfig,

    /// Semantic response cache connection
    #[serde(default)]
    pub cache: CacheConfig,

    /// Short-term conversation window
    #[serde(default)]
    pub window: WindowConfig,

    /// Knowledge ingestion pipeline
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Context gathering bounds
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Chat model collaborator
    #[serde(default)]
    pub model: ModelConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryServerConfig {
    /// Base URL of the memory store API
    #[serde(default = "default_memory_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_memory_url() -> String {
    "http://localhost:8000".into()
}
fn default_request_timeout() -> u64 {
    10
}

impl Default for MemoryServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_memory_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Base URL of the semantic cache API
    #[serde(default = "default_cache_url")]
    pub base_url: String,

    /// Bearer token; also read from `MNEMO_CACHE_API_KEY`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Which cache on the backend to use
    #[serde(default = "default_cache_id")]
    pub cache_id: String,

    /// Minimum similarity for a lookup to count as a hit
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// How long a stored entry stays visible
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_cache_url() -> String {
    "http://localhost:8080".into()
}
fn default_cache_id() -> String {
    "mnemo".into()
}
fn default_similarity_threshold() -> f32 {
    0.7
}
fn default_cache_ttl() -> u64 {
    60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            base_url: default_cache_url(),
            api_key: None,
            cache_id: default_cache_id(),
            similarity_threshold: default_similarity_threshold(),
            ttl_secs: default_cache_ttl(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl std::fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .field("cache_id", &self.cache_id)
            .field("similarity_threshold", &self.similarity_threshold)
            .field("ttl_secs", &self.ttl_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Token budget for retained conversation turns
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

fn default_max_tokens() -> usize {
    1000
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Directory scanned for new documents
    #[serde(default = "default_watch_dir")]
    pub watch_dir: PathBuf,

    /// Seconds between scans
    #[serde(default = "default_scan_interval")]
    pub scan_interval_secs: u64,

    /// File extension picked up by the scanner (without the dot)
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_watch_dir() -> PathBuf {
    PathBuf::from("./knowledge-inbox")
}
fn default_scan_interval() -> u64 {
    5
}
fn default_extension() -> String {
    "txt".into()
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            watch_dir: default_watch_dir(),
            scan_interval_secs: default_scan_interval(),
            extension: default_extension(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Upper bound on context gathering per query, in milliseconds
    #[serde(default = "default_gather_timeout")]
    pub gather_timeout_ms: u64,
}

fn default_gather_timeout() -> u64 {
    2000
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            gather_timeout_ms: default_gather_timeout(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// OpenAI-compatible base URL
    #[serde(default = "default_model_url")]
    pub base_url: String,

    /// Bearer token; also read from `MNEMO_MODEL_API_KEY` / `OPENAI_API_KEY`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model name
    #[serde(default = "default_model_name")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Assistant persona sent as the system prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_model_timeout")]
    pub request_timeout_secs: u64,
}

fn default_model_url() -> String {
    "http://localhost:11434/v1".into()
}
fn default_model_name() -> String {
    "llama3.2".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_model_timeout() -> u64 {
    120
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_model_url(),
            api_key: None,
            model: default_model_name(),
            temperature: default_temperature(),
            system_prompt: None,
            request_timeout_secs: default_model_timeout(),
        }
    }
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("system_prompt", &self.system_prompt)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.mnemo/config.toml).
    ///
    /// Also checks environment variables for secrets:
    /// - `MNEMO_CACHE_API_KEY` for the cache bearer token
    /// - `MNEMO_MODEL_API_KEY`, then `OPENAI_API_KEY`, for the model
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        // Environment variable overrides (highest priority)
        if config.cache.api_key.is_none() {
            config.cache.api_key = std::env::var("MNEMO_CACHE_API_KEY").ok();
        }

        if config.model.api_key.is_none() {
            config.model.api_key = std::env::var("MNEMO_MODEL_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(url) = std::env::var("MNEMO_MEMORY_URL") {
            config.memory_server.base_url = url;
        }

        if let Ok(model) = std::env::var("MNEMO_MODEL") {
            config.model.model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".mnemo")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.similarity_threshold <= 0.0 || self.cache.similarity_threshold > 1.0 {
            return Err(ConfigError::ValidationError(
                "cache.similarity_threshold must be in (0.0, 1.0]".into(),
            ));
        }

        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::ValidationError(
                "cache.ttl_secs must be greater than zero".into(),
            ));
        }

        if self.window.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "window.max_tokens must be greater than zero".into(),
            ));
        }

        if self.ingest.scan_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "ingest.scan_interval_secs must be greater than zero".into(),
            ));
        }

        let extension = self.ingest.extension.trim_start_matches('.');
        if extension.is_empty() {
            return Err(ConfigError::ValidationError(
                "ingest.extension must not be empty".into(),
            ));
        }
        // Watching the marker extension would re-ingest forever.
        if extension.eq_ignore_ascii_case("processed") {
            return Err(ConfigError::ValidationError(
                "ingest.extension must not be the processed marker".into(),
            ));
        }

        if self.model.temperature < 0.0 || self.model.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "model.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.retrieval.gather_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.gather_timeout_ms must be greater than zero".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `mnemo config --init`).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache.similarity_threshold, 0.7);
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.ingest.scan_interval_secs, 5);
        assert_eq!(config.window.max_tokens, 1000);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.memory_server.base_url, config.memory_server.base_url);
        assert_eq!(parsed.cache.cache_id, config.cache.cache_id);
        assert_eq!(parsed.window.max_tokens, config.window.max_tokens);
    }

    #[test]
    fn invalid_threshold_rejected() {
        let mut config = AppConfig::default();
        config.cache.similarity_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn watching_the_marker_extension_rejected() {
        let mut config = AppConfig::default();
        config.ingest.extension = ".processed".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_token_budget_rejected() {
        let mut config = AppConfig::default();
        config.window.max_tokens = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        let config = result.unwrap();
        assert_eq!(config.cache.cache_id, "mnemo");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let toml_str = r#"
[window]
max_tokens = 500

[ingest]
watch_dir = "/srv/docs"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.window.max_tokens, 500);
        assert_eq!(config.ingest.watch_dir, PathBuf::from("/srv/docs"));
        assert_eq!(config.ingest.extension, "txt");
        assert_eq!(config.cache.similarity_threshold, 0.7);
    }

    #[test]
    fn debug_output_redacts_api_keys() {
        let mut config = AppConfig::default();
        config.cache.api_key = Some("sk-cache-secret".into());
        config.model.api_key = Some("sk-model-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-cache-secret"));
        assert!(!debug.contains("sk-model-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("knowledge-inbox"));
        assert!(toml_str.contains("similarity_threshold"));
    }
}
