//! Common types for code generation

use serde::{Deserialize, Serialize};

/// Who authored a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// Text part of a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// Chat message in the provider's `{role, parts}` shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl ChatMessage {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part { text: text.into() }],
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, text)
    }

    /// All text parts joined
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .map(|part| part.text.as_str())
            .collect::<Vec<_>>()
            .join("")
    }
}

/// A validated model reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeGeneration {
    /// Markdown explanation shown in the chat
    pub explanation: String,
    /// Complete replacement component source
    pub code: String,
}

/// Everything needed for one generation call
#[derive(Debug, Clone)]
pub struct CodegenRequest {
    /// Conversation so far, ending with the user's latest message
    pub history: Vec<ChatMessage>,
    pub system_prompt: String,
    /// Source the model is asked to modify
    pub current_code: String,
    /// Code fence language tag (`jsx`, `vue`)
    pub language: String,
    /// Framework name used in the response schema description (`React`, `Vue`)
    pub framework: String,
}

impl CodegenRequest {
    /// History plus a trailing model turn carrying the current code
    pub fn contents(&self) -> Vec<ChatMessage> {
        let mut contents = self.history.clone();
        contents.push(ChatMessage::model(format!(
            "Here is the current code to be modified:\n```{}\n{}\n```",
            self.language, self.current_code
        )));
        contents
    }
}
