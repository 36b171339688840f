//! Shared application state
//!
//! Wires the session, the code generation gateway, the asset library and the
//! preview pane together. Code changes reach the preview through the edit
//! debouncer; the mount watchdog runs alongside.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use asset_library::{
    backend::api_key_from_env, AssetStore, FileKeyValueStore, ImageGenerator, SharedAssetStore,
    SpeechGenerator, StockPhotoSearch,
};
use codegen::{CodegenGateway, GeminiBackend, SharedGateway};
use parking_lot::Mutex;
use preview_pipeline::{
    BabelCompiler, Compiler, IsolatedRenderer, Platform, PreviewDispatcher, PreviewPipeline,
};

use crate::config::AppConfig;
use crate::constants::{api_keys, timeouts};
use crate::debounce::EditDebouncer;
use crate::session::Session;
use crate::surface::ErrorBanner;

/// External services the state is built from
pub struct Services {
    pub gateway: SharedGateway,
    pub assets: SharedAssetStore,
    pub compiler: Arc<dyn Compiler>,
    pub images: ImageGenerator,
    pub speech: SpeechGenerator,
    pub stock: StockPhotoSearch,
}

impl Services {
    /// Production services: Gemini, ElevenLabs and Pexels keyed from the
    /// environment, the file-backed asset table and the Babel compiler
    pub fn from_env(config: &AppConfig, data_dir: &Path) -> Self {
        let mut backend = GeminiBackend::from_env();
        if let Some(model) = &config.codegen.model {
            backend = backend.with_model(model);
        }
        if let Some(base_url) = &config.codegen.base_url {
            backend = backend.with_base_url(base_url);
        }

        let storage_file = config.storage_file(data_dir);
        log::info!("Asset storage: {:?}", storage_file);
        let kv = Arc::new(FileKeyValueStore::open(storage_file));

        Self {
            gateway: Arc::new(CodegenGateway::with_backend(Box::new(backend))),
            assets: Arc::new(AssetStore::load(kv)),
            compiler: Arc::new(BabelCompiler::from_config(&config.preview)),
            images: ImageGenerator::new(api_key_from_env(api_keys::GEMINI)),
            speech: SpeechGenerator::new(api_key_from_env(api_keys::ELEVENLABS)),
            stock: StockPhotoSearch::new(api_key_from_env(api_keys::PEXELS)),
        }
    }
}

pub struct AppState {
    pub session: Mutex<Session>,
    pub gateway: SharedGateway,
    pub assets: SharedAssetStore,
    pub dispatcher: Arc<PreviewDispatcher>,
    pub banner: Arc<ErrorBanner>,
    pub images: ImageGenerator,
    pub speech: SpeechGenerator,
    pub stock: StockPhotoSearch,
    debouncer: EditDebouncer,
}

/// Shared state type for axum handlers
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Build the state and queue the starter code for the first render.
    /// Must be called inside a Tokio runtime.
    pub fn new(config: &AppConfig, services: Services) -> SharedState {
        let session = Session::new();
        let banner = Arc::new(ErrorBanner::new());
        let renderer = Arc::new(IsolatedRenderer::new(
            banner.clone(),
            config.preview.mount_timeout(),
        ));
        let pipeline = PreviewPipeline::new(services.compiler, config.preview.clone());
        let dispatcher = Arc::new(PreviewDispatcher::new(
            pipeline,
            renderer,
            session.platform(),
        ));

        let debouncer = {
            let dispatcher = dispatcher.clone();
            let assets = services.assets.clone();
            EditDebouncer::spawn(
                Duration::from_millis(config.editor.debounce_ms),
                move |code| {
                    let dispatcher = dispatcher.clone();
                    let assets = assets.clone();
                    async move {
                        if let Err(e) = dispatcher.render(&code, &assets).await {
                            log::debug!("Preview render failed: {}", e);
                        }
                    }
                },
            )
        };
        debouncer.submit(session.code());

        Arc::new(Self {
            session: Mutex::new(session),
            gateway: services.gateway,
            assets: services.assets,
            dispatcher,
            banner,
            images: services.images,
            speech: services.speech,
            stock: services.stock,
            debouncer,
        })
    }

    /// Queue `code` for the preview once edits settle
    pub fn schedule_render(&self, code: impl Into<String>) {
        if !self.debouncer.submit(code) {
            log::error!("Edit debouncer is not running; preview will not refresh");
        }
    }

    /// Replace the active platform's code and schedule a render
    pub fn update_code(&self, code: String) {
        self.session.lock().set_code(code.clone());
        self.schedule_render(code);
    }

    /// Switch platform in both the session and the preview pane
    pub fn switch_platform(&self, platform: Platform) -> bool {
        let code = {
            let mut session = self.session.lock();
            if !session.set_platform(platform) {
                return false;
            }
            session.code().to_string()
        };
        self.dispatcher.switch_platform(platform);
        self.schedule_render(code);
        true
    }

    /// Current code of the active platform
    pub fn current_code(&self) -> String {
        self.session.lock().code().to_string()
    }
}

/// Periodically fail documents that never report a mount
pub fn spawn_mount_watchdog(state: SharedState) {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(Duration::from_millis(timeouts::MOUNT_WATCH_INTERVAL_MS));
        loop {
            interval.tick().await;
            state
                .dispatcher
                .renderer()
                .check_mount_deadline(Instant::now());
        }
    });
}
