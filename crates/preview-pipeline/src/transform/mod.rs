//! Source transformation
//!
//! Lowers component source to plain script with a down-level compiler. The
//! [`Compiler`] trait is the seam; [`BabelCompiler`] is the production
//! implementation running Babel standalone inside `boa_engine`.

mod babel;

pub use babel::BabelCompiler;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::diagnostics::PreviewWarning;
use crate::sfc::SfcSections;

/// Errors raised while transforming source
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransformError {
    /// The compiler bundle is missing or did not define `Babel`
    #[error("{0}")]
    CompilerUnavailable(String),

    /// Compiler diagnostic, passed through verbatim
    #[error("{0}")]
    Syntax(String),

    #[error("Transform timed out after {0}ms")]
    Timeout(u64),

    #[error("Compiler worker failed: {0}")]
    Worker(String),
}

impl TransformError {
    pub(crate) fn not_loaded() -> Self {
        TransformError::CompilerUnavailable("Babel is not loaded.".to_string())
    }
}

/// Options handed to the compiler, serialized as Babel's options object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransformOptions {
    pub presets: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<String>,
}

impl TransformOptions {
    /// JSX component profile: JSX and ES2015 lowering, wrapped as a UMD module
    pub fn component() -> Self {
        Self {
            presets: vec!["react".to_string(), "es2015".to_string()],
            plugins: vec!["transform-modules-umd".to_string()],
        }
    }

    /// Single-file component script profile
    pub fn sfc_script(jsx: bool) -> Self {
        let mut presets = vec!["es2015".to_string()];
        if jsx {
            presets.push("react".to_string());
        }
        Self {
            presets,
            plugins: Vec::new(),
        }
    }
}

/// A down-level compiler
#[async_trait]
pub trait Compiler: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Transform `source` with `options`, returning the emitted script
    async fn transform(
        &self,
        source: &str,
        options: &TransformOptions,
    ) -> Result<String, TransformError>;
}

/// A transformed single-file component
#[derive(Debug, Clone)]
pub struct TransformedSfc {
    pub sections: SfcSections,
    pub script: String,
    pub warnings: Vec<PreviewWarning>,
}

/// Transform a JSX component
pub async fn transform_component(
    compiler: &dyn Compiler,
    source: &str,
) -> Result<String, TransformError> {
    compiler
        .transform(source, &TransformOptions::component())
        .await
}

/// Split a single-file component and transform only its script section
pub async fn transform_sfc(
    compiler: &dyn Compiler,
    source: &str,
    jsx: bool,
) -> Result<TransformedSfc, TransformError> {
    let (sections, warnings) = SfcSections::parse_with_warnings(source);
    let script = compiler
        .transform(&sections.script, &TransformOptions::sfc_script(jsx))
        .await?;
    Ok(TransformedSfc {
        sections,
        script,
        warnings,
    })
}
