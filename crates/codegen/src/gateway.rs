//! Codegen Gateway - single entry point for generation calls
//!
//! Holds the active backend behind a lock so it can be swapped at runtime,
//! and validates every response into a [`CodeGeneration`].

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::backend::{CodegenBackend, GeminiBackend};
use crate::error::CodegenError;
use crate::parse::parse_generation;
use crate::types::{CodeGeneration, CodegenRequest};

pub struct CodegenGateway {
    backend: Arc<RwLock<Box<dyn CodegenBackend>>>,
}

impl CodegenGateway {
    /// Gateway using Gemini with the key from the environment
    pub fn new() -> Self {
        Self::with_backend(Box::new(GeminiBackend::from_env()))
    }

    pub fn with_backend(backend: Box<dyn CodegenBackend>) -> Self {
        Self {
            backend: Arc::new(RwLock::new(backend)),
        }
    }

    /// Replace the active backend
    pub async fn set_backend(&self, backend: Box<dyn CodegenBackend>) {
        let mut guard = self.backend.write().await;
        log::info!("Switched code generation backend: {} -> {}", guard.name(), backend.name());
        *guard = backend;
    }

    pub async fn backend_name(&self) -> &'static str {
        self.backend.read().await.name()
    }

    pub async fn is_configured(&self) -> bool {
        self.backend.read().await.is_configured()
    }

    /// Run one generation call and validate the reply
    pub async fn generate(&self, request: &CodegenRequest) -> Result<CodeGeneration, CodegenError> {
        let guard = self.backend.read().await;
        let started = std::time::Instant::now();
        let text = guard.generate(request).await?;
        log::info!(
            "{} ({}) replied in {:?}",
            guard.name(),
            guard.model(),
            started.elapsed()
        );
        parse_generation(text.as_deref())
    }
}

impl Default for CodegenGateway {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared gateway type for application state
pub type SharedGateway = Arc<CodegenGateway>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;
    use async_trait::async_trait;

    struct CannedBackend {
        reply: Option<&'static str>,
    }

    #[async_trait]
    impl CodegenBackend for CannedBackend {
        fn name(&self) -> &'static str {
            "canned"
        }

        fn model(&self) -> &str {
            "canned-1"
        }

        fn is_configured(&self) -> bool {
            true
        }

        async fn generate(&self, _request: &CodegenRequest) -> Result<Option<String>, CodegenError> {
            Ok(self.reply.map(str::to_string))
        }
    }

    fn request() -> CodegenRequest {
        CodegenRequest {
            history: vec![ChatMessage::user("hi")],
            system_prompt: String::new(),
            current_code: String::new(),
            language: "jsx".to_string(),
            framework: "React".to_string(),
        }
    }

    #[tokio::test]
    async fn test_generate_validates_reply() {
        let gateway = CodegenGateway::with_backend(Box::new(CannedBackend {
            reply: Some(r#"{"explanation": "ok", "code": "x"}"#),
        }));
        let generation = gateway.generate(&request()).await.unwrap();
        assert_eq!(generation.code, "x");
    }

    #[tokio::test]
    async fn test_empty_reply_is_error() {
        let gateway = CodegenGateway::with_backend(Box::new(CannedBackend { reply: None }));
        let err = gateway.generate(&request()).await.unwrap_err();
        assert!(matches!(err, CodegenError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_set_backend() {
        let gateway = CodegenGateway::with_backend(Box::new(GeminiBackend::new(None)));
        assert!(!gateway.is_configured().await);
        gateway
            .set_backend(Box::new(CannedBackend { reply: None }))
            .await;
        assert_eq!(gateway.backend_name().await, "canned");
        assert!(gateway.is_configured().await);
    }
}
