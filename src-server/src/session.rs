//! Builder session state
//!
//! One conversation with the model plus the working source for each platform.
//! A generation turn is split in two so the session lock is not held while the
//! model request is in flight: [`Session::begin_turn`] records the user's
//! message and builds the request, [`Session::complete_turn`] applies the reply.

use codegen::{ChatMessage, CodeGeneration, CodegenError, CodegenRequest};
use preview_pipeline::Platform;
use serde::Serialize;

use crate::prompts;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("A generation is already in progress")]
    Busy,
}

/// A generation started by [`Session::begin_turn`]
#[derive(Debug)]
pub struct PendingTurn {
    pub request: CodegenRequest,
    /// Platform whose code the reply replaces
    platform: Platform,
}

/// Serializable view of the session for the UI
#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub platform: Platform,
    pub code: String,
    pub messages: Vec<ChatMessage>,
    pub draft: String,
    pub busy: bool,
}

pub struct Session {
    messages: Vec<ChatMessage>,
    react_code: String,
    vue_code: String,
    platform: Platform,
    draft: String,
    busy: bool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::model(prompts::GREETING)],
            react_code: prompts::initial_code(Platform::React).to_string(),
            vue_code: prompts::initial_code(Platform::Vue).to_string(),
            platform: Platform::default(),
            draft: String::new(),
            busy: false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Switch the active platform; each platform keeps its own code
    pub fn set_platform(&mut self, platform: Platform) -> bool {
        if self.platform == platform {
            return false;
        }
        self.platform = platform;
        true
    }

    /// Code of the active platform
    pub fn code(&self) -> &str {
        self.code_for(self.platform)
    }

    pub fn code_for(&self, platform: Platform) -> &str {
        match platform {
            Platform::React => &self.react_code,
            Platform::Vue => &self.vue_code,
        }
    }

    /// Replace the active platform's code (manual edit)
    pub fn set_code(&mut self, code: impl Into<String>) {
        let platform = self.platform;
        *self.code_slot(platform) = code.into();
    }

    fn code_slot(&mut self, platform: Platform) -> &mut String {
        match platform {
            Platform::React => &mut self.react_code,
            Platform::Vue => &mut self.vue_code,
        }
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    /// Append `placeholder` to the chat draft, space-separated, leaving a
    /// trailing space for the next word
    pub fn insert_placeholder(&mut self, placeholder: &str) -> &str {
        self.draft = append_to_draft(&self.draft, placeholder);
        &self.draft
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Record the user's message and build the model request.
    ///
    /// Blank input is ignored and returns `Ok(None)`.
    pub fn begin_turn(&mut self, input: &str) -> Result<Option<PendingTurn>, SessionError> {
        let message = input.trim();
        if message.is_empty() {
            return Ok(None);
        }
        if self.is_busy() {
            return Err(SessionError::Busy);
        }

        self.busy = true;
        self.draft.clear();
        self.messages.push(ChatMessage::user(message));

        let platform = self.platform;
        let request = CodegenRequest {
            history: self.messages.clone(),
            system_prompt: prompts::system_prompt(platform).to_string(),
            current_code: self.code_for(platform).to_string(),
            language: platform.code_language().to_string(),
            framework: prompts::framework_name(platform).to_string(),
        };
        Ok(Some(PendingTurn { request, platform }))
    }

    /// Apply the outcome of a turn.
    ///
    /// On success the explanation joins the conversation and the code of the
    /// platform the turn started on is replaced. Returns that code when it is
    /// still the active platform, so the caller can refresh the preview. On
    /// failure the error is reported in the conversation and no code changes.
    pub fn complete_turn(
        &mut self,
        turn: PendingTurn,
        result: Result<CodeGeneration, CodegenError>,
    ) -> Option<String> {
        self.busy = false;
        match result {
            Ok(generation) => {
                self.messages.push(ChatMessage::model(generation.explanation));
                *self.code_slot(turn.platform) = generation.code;
                (turn.platform == self.platform).then(|| self.code().to_string())
            }
            Err(e) => {
                log::error!("Generation failed: {}", e);
                self.messages.push(ChatMessage::model(error_reply(&e.to_string())));
                None
            }
        }
    }

    /// End a turn whose generation task died without a result
    pub fn abandon_turn(&mut self, reason: &str) {
        log::error!("Generation turn abandoned: {}", reason);
        self.busy = false;
        self.messages.push(ChatMessage::model(error_reply(reason)));
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            platform: self.platform,
            code: self.code().to_string(),
            messages: self.messages().to_vec(),
            draft: self.draft.clone(),
            busy: self.busy,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

fn append_to_draft(draft: &str, placeholder: &str) -> String {
    let separator = if draft.is_empty() { "" } else { " " };
    format!("{}{}{}", draft, separator, placeholder).trim().to_string() + " "
}

/// Chat message shown when a generation fails
pub fn error_reply(details: &str) -> String {
    format!(
        "Sorry, I encountered an error. \n\n**Details:**\n```\n{}\n```",
        details
    )
}
