//! OpenAI-compatible chat model client.
//!
//! Works with any endpoint speaking `POST {base}/chat/completions`
//! (OpenAI, OpenRouter, Ollama, vLLM, and friends). Non-streaming: the
//! orchestrator needs the whole response before it can cache it.

use async_trait::async_trait;
use mnemo_core::error::ModelError;
use mnemo_core::model::{ChatModel, ChatPrompt};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// An OpenAI-compatible chat completion client.
pub struct OpenAiCompatModel {
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

impl OpenAiCompatModel {
    /// Create a new client. `base_url` should include the `/v1` segment.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        temperature: f32,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
            temperature,
            client,
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatModel {
    async fn complete(&self, prompt: ChatPrompt) -> std::result::Result<String, ModelError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut messages = Vec::new();
        if let Some(system) = &prompt.system {
            messages.push(serde_json::json!({ "role": "system", "content": system }));
        }
        messages.push(serde_json::json!({ "role": "user", "content": prompt.message }));

        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
            "stream": false,
        });

        debug!(model = %self.model, "Sending completion request");

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let message = response.text().await.unwrap_or_default();
            warn!(status, body = %message, "Model endpoint returned error");
            return Err(ModelError::Rejected { status, message });
        }

        let api_response: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Parse(e.to_string()))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::Parse("no choices in response".into()))?;

        Ok(choice.message.content)
    }
}

// --- Wire format ---

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<ApiChoice>,
}

#[derive(Deserialize)]
struct ApiChoice {
    message: ApiChoiceMessage,
}

#[derive(Deserialize)]
struct ApiChoiceMessage {
    #[serde(default)]
    content: String,
}
