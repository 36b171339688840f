//! Conversational code generation
//!
//! Sends the chat history, a system prompt and the current component source
//! to a hosted model and gets back `{explanation, code}`:
//! - **Gemini**: `generateContent` with a JSON response schema (default)
//!
//! Backends only return the raw response text; [`CodegenGateway`] owns the
//! validation so every backend fails the same way on bad output.
//!
//! # Example
//!
//! ```rust,ignore
//! use codegen::{ChatMessage, CodegenGateway, CodegenRequest, GeminiBackend};
//!
//! let gateway = CodegenGateway::with_backend(Box::new(GeminiBackend::from_env()));
//! let request = CodegenRequest {
//!     history: vec![ChatMessage::user("Add a reset button")],
//!     system_prompt: prompt.to_string(),
//!     current_code: code.to_string(),
//!     language: "jsx".to_string(),
//!     framework: "React".to_string(),
//! };
//! let generation = gateway.generate(&request).await?;
//! ```

pub mod backend;
pub mod error;
pub mod gateway;
pub mod parse;
pub mod types;

// Re-exports for convenience
pub use backend::{CodegenBackend, GeminiBackend};
pub use error::CodegenError;
pub use gateway::{CodegenGateway, SharedGateway};
pub use parse::parse_generation;
pub use types::{ChatMessage, CodeGeneration, CodegenRequest, Part, Role};
