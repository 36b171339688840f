//! Preview pipeline for generated UI components
//!
//! Turns untrusted, model-generated component source into a self-contained
//! document that renders inside an isolated `iframe`:
//!
//! 1. **Placeholder resolution**: `%%asset_N%%` tokens become asset content locators
//! 2. **Transformation**: JSX components and single-file components are lowered
//!    to plain script by the Babel compiler hosted in `boa_engine`
//! 3. **Host generation**: the script is wrapped with runtime libraries, a
//!    restricted `require`, and a `postMessage` error channel
//! 4. **Rendering**: [`IsolatedRenderer`] owns the pane content and filters the
//!    messages coming back out of the sandbox
//! 5. **Dispatch**: [`PreviewDispatcher`] picks the pipeline for the active
//!    [`Platform`] and discards superseded renders
//!
//! # Example
//!
//! ```rust,ignore
//! use preview_pipeline::{BabelCompiler, PipelineConfig, Platform, PreviewPipeline};
//! use std::sync::Arc;
//!
//! let config = PipelineConfig::default();
//! let compiler = Arc::new(BabelCompiler::from_config(&config));
//! let pipeline = PreviewPipeline::new(compiler, config);
//!
//! let document = pipeline.export_document(Platform::React, source).await?;
//! std::fs::write("preview.html", document.html)?;
//! ```

pub mod config;
pub mod diagnostics;
pub mod dispatch;
pub mod host;
pub mod placeholder;
pub mod platform;
pub mod renderer;
pub mod sfc;
pub mod transform;

// Re-exports for convenience
pub use config::PipelineConfig;
pub use diagnostics::PreviewWarning;
pub use dispatch::{PreviewDispatcher, PreviewPipeline, RenderOutcome};
pub use host::{GeneratedDocument, HostContext};
pub use placeholder::{resolve_placeholders, unresolved_placeholders};
pub use platform::{Platform, SandboxModule};
pub use renderer::{
    ChannelMessage, ErrorSurface, IsolatedRenderer, MessageDisposition, MountState, PaneId,
};
pub use sfc::SfcSections;
pub use transform::{BabelCompiler, Compiler, TransformError, TransformOptions};
