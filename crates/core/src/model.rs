//! The chat model seam.
//!
//! Prompt execution is an external collaborator. The orchestration layer
//! only needs to hand over an assembled prompt and get text back; streaming,
//! sampling, and token accounting stay on the other side of this trait.

use async_trait::async_trait;

use crate::error::ModelError;

/// A fully assembled prompt ready for the model.
#[derive(Debug, Clone)]
pub struct ChatPrompt {
    /// Optional assistant persona.
    pub system: Option<String>,

    /// The (possibly context-augmented) user message.
    pub message: String,
}

impl ChatPrompt {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            system: None,
            message: message.into(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// The language model collaborator.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Produce a completion for the prompt.
    async fn complete(&self, prompt: ChatPrompt) -> std::result::Result<String, ModelError>;
}
