//! Pluggable model backend abstraction
//!
//! A backend turns a [`CodegenRequest`] into the model's raw response text.
//! Parsing and validation happen in the gateway.

pub mod gemini;

use async_trait::async_trait;

use crate::error::CodegenError;
use crate::types::CodegenRequest;

pub use gemini::GeminiBackend;

#[async_trait]
pub trait CodegenBackend: Send + Sync {
    // ─── IDENTITY ───────────────────────────────────────────────────

    /// Human-readable name for logs
    fn name(&self) -> &'static str;

    /// Model identifier requests are sent to
    fn model(&self) -> &str;

    /// Whether credentials are available
    fn is_configured(&self) -> bool;

    // ─── GENERATION ─────────────────────────────────────────────────

    /// Run one generation call, returning the response text if there was any
    async fn generate(&self, request: &CodegenRequest) -> Result<Option<String>, CodegenError>;
}
