//! Dual-platform dispatch
//!
//! [`PreviewPipeline`] is the uniform "source in, document out" operation for
//! both dialects. [`PreviewDispatcher`] adds the per-pane concerns: the active
//! platform, fresh asset resolution on every render, and a generation counter
//! so a slow render never overwrites a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use asset_library::AssetStore;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use crate::config::PipelineConfig;
use crate::diagnostics::PreviewWarning;
use crate::host::{self, GeneratedDocument, HostContext};
use crate::placeholder::{resolve_placeholders, unresolved_placeholders};
use crate::platform::Platform;
use crate::renderer::IsolatedRenderer;
use crate::transform::{self, Compiler, TransformError};

/// Turns resolved source into a sandbox document for either platform
pub struct PreviewPipeline {
    compiler: Arc<dyn Compiler>,
    config: PipelineConfig,
}

impl PreviewPipeline {
    pub fn new(compiler: Arc<dyn Compiler>, config: PipelineConfig) -> Self {
        Self { compiler, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn compiler(&self) -> &Arc<dyn Compiler> {
        &self.compiler
    }

    /// Produce the document for `resolved_source` tagged with `ctx`
    pub async fn produce_document(
        &self,
        platform: Platform,
        resolved_source: &str,
        ctx: &HostContext,
    ) -> Result<GeneratedDocument, TransformError> {
        log::debug!(
            "Producing {} document with {} ({} bytes of source)",
            platform,
            self.compiler.name(),
            resolved_source.len()
        );
        match platform {
            Platform::React => {
                let script =
                    transform::transform_component(self.compiler.as_ref(), resolved_source).await?;
                Ok(host::generate_react_document(&script, ctx))
            }
            Platform::Vue => {
                let transformed = transform::transform_sfc(
                    self.compiler.as_ref(),
                    resolved_source,
                    self.config.sfc_script_jsx,
                )
                .await?;
                let mut document =
                    host::generate_vue_document(&transformed.script, &transformed.sections, ctx);
                let mut warnings = transformed.warnings;
                warnings.append(&mut document.warnings);
                document.warnings = warnings;
                Ok(document)
            }
        }
    }

    /// Untagged document for viewing outside the builder
    pub async fn export_document(
        &self,
        platform: Platform,
        resolved_source: &str,
    ) -> Result<GeneratedDocument, TransformError> {
        self.produce_document(platform, resolved_source, &HostContext::standalone())
            .await
    }
}

/// Result of a render request that did not fail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RenderOutcome {
    /// The document was loaded into the pane
    Rendered {
        generation: u64,
        warnings: Vec<PreviewWarning>,
    },
    /// A newer render or a platform switch started while this one was running
    Superseded { generation: u64 },
}

/// Routes a pane's source to the pipeline for the active platform
pub struct PreviewDispatcher {
    pipeline: PreviewPipeline,
    renderer: Arc<IsolatedRenderer>,
    platform: RwLock<Platform>,
    generation: AtomicU64,
    commit: Mutex<()>,
}

impl PreviewDispatcher {
    pub fn new(pipeline: PreviewPipeline, renderer: Arc<IsolatedRenderer>, platform: Platform) -> Self {
        Self {
            pipeline,
            renderer,
            platform: RwLock::new(platform),
            generation: AtomicU64::new(0),
            commit: Mutex::new(()),
        }
    }

    pub fn platform(&self) -> Platform {
        *self.platform.read()
    }

    pub fn renderer(&self) -> &Arc<IsolatedRenderer> {
        &self.renderer
    }

    pub fn pipeline(&self) -> &PreviewPipeline {
        &self.pipeline
    }

    /// Latest generation handed out
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Change the active platform. In-flight renders for the old platform are discarded.
    pub fn switch_platform(&self, platform: Platform) -> bool {
        let mut current = self.platform.write();
        if *current == platform {
            return false;
        }
        log::info!("Switching preview platform {} -> {}", *current, platform);
        *current = platform;
        self.generation.fetch_add(1, Ordering::SeqCst);
        true
    }

    /// Resolve, transform and load `source` into the pane.
    ///
    /// On a transform failure the previous document stays loaded and the
    /// error is shown on the pane's surface.
    pub async fn render(
        &self,
        source: &str,
        assets: &AssetStore,
    ) -> Result<RenderOutcome, TransformError> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let platform = self.platform();

        let table = assets.snapshot();
        let unresolved = unresolved_placeholders(source, &table);
        for id in &unresolved {
            log::warn!("Placeholder %%{}%% has no matching asset", id);
        }
        let resolved = resolve_placeholders(source, &table);

        let ctx = HostContext::for_pane(self.renderer.pane_id().as_str(), ticket);
        let result = self.pipeline.produce_document(platform, &resolved, &ctx).await;

        let _commit = self.commit.lock();
        if self.generation.load(Ordering::SeqCst) != ticket {
            log::debug!("Render {} superseded before it finished", ticket);
            return Ok(RenderOutcome::Superseded { generation: ticket });
        }

        match result {
            Ok(mut document) => {
                document.warnings.extend(
                    unresolved
                        .into_iter()
                        .map(|id| PreviewWarning::UnresolvedPlaceholder { id }),
                );
                let warnings = document.warnings.clone();
                self.renderer.load(document);
                Ok(RenderOutcome::Rendered {
                    generation: ticket,
                    warnings,
                })
            }
            Err(e) => {
                log::info!("Render {} failed: {}", ticket, e);
                self.renderer.surface().show_error(&e.to_string());
                Err(e)
            }
        }
    }

    /// Standalone document for the current source, resolved against a fresh asset snapshot
    pub async fn export(
        &self,
        source: &str,
        assets: &AssetStore,
    ) -> Result<GeneratedDocument, TransformError> {
        let resolved = resolve_placeholders(source, &assets.snapshot());
        self.pipeline.export_document(self.platform(), &resolved).await
    }
}
