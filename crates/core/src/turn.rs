//! Conversation turn value objects.
//!
//! A turn is one utterance in a session: user query or assistant reply.
//! Turns flow into the short-term window and, rendered, into the context
//! block of an augmented prompt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// The end user
    User,
    /// The AI assistant
    Assistant,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "User",
            TurnRole::Assistant => "Assistant",
        }
    }
}

/// A single turn in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Who sent this turn
    pub role: TurnRole,

    /// The text content
    pub text: String,

    /// Timestamp
    pub at: DateTime<Utc>,
}

impl Turn {
    /// Create a new user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
            at: Utc::now(),
        }
    }

    /// Create a new assistant turn.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            text: text.into(),
            at: Utc::now(),
        }
    }

    /// Render as a context line (`User: ...` / `Assistant: ...`).
    pub fn render(&self) -> String {
        format!("{}: {}", self.role.as_str(), self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turns_render_with_role_prefix() {
        assert_eq!(Turn::user("hi").render(), "User: hi");
        assert_eq!(Turn::assistant("hello").render(), "Assistant: hello");
    }

    #[test]
    fn role_serializes_lowercase() {
        let turn = Turn::user("x");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["role"], "user");
    }
}
