//! End-to-end pipeline tests: file-backed asset table, Babel bundle loaded
//! from disk, dispatcher, renderer and the sandbox message channel.

use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use asset_library::{AssetKind, AssetStore, FileKeyValueStore};
use parking_lot::Mutex;
use preview_pipeline::{
    BabelCompiler, ErrorSurface, IsolatedRenderer, MessageDisposition, MountState,
    PipelineConfig, Platform, PreviewDispatcher, PreviewPipeline, RenderOutcome,
};
use serde_json::json;

/// Small stand-in for Babel standalone: rewrites the default export to a
/// CommonJS assignment and rejects unbalanced `<<`
const BUNDLE: &str = r#"
(function (global) {
  global.Babel = {
    transform: function (code, options) {
      if (code.indexOf('<<') !== -1) {
        throw new SyntaxError('unknown: Unexpected token (1:10)');
      }
      var out = '"use strict";\n' + code.replace('export default ', 'exports.default = ');
      return { code: out, map: null, ast: null, presets: options.presets };
    }
  };
})(this);
"#;

#[derive(Default)]
struct Banner {
    errors: Mutex<Vec<String>>,
    current: Mutex<Option<String>>,
}

impl ErrorSurface for Banner {
    fn show_error(&self, message: &str) {
        self.errors.lock().push(message.to_string());
        *self.current.lock() = Some(message.to_string());
    }

    fn clear_error(&self) {
        *self.current.lock() = None;
    }
}

struct Fixture {
    _dir: tempfile::TempDir,
    _bundle: tempfile::NamedTempFile,
    assets: AssetStore,
    dispatcher: PreviewDispatcher,
    banner: Arc<Banner>,
}

fn fixture(platform: Platform) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let kv = FileKeyValueStore::open(dir.path().join("storage.json"));
    let assets = AssetStore::load(Arc::new(kv));

    let mut bundle = tempfile::NamedTempFile::new().unwrap();
    bundle.write_all(BUNDLE.as_bytes()).unwrap();

    let config = PipelineConfig {
        babel_script_path: bundle.path().to_path_buf(),
        ..PipelineConfig::default()
    };
    let compiler = Arc::new(BabelCompiler::from_config(&config));
    let banner = Arc::new(Banner::default());
    let renderer = Arc::new(IsolatedRenderer::new(banner.clone(), config.mount_timeout()));
    let pipeline = PreviewPipeline::new(compiler, config);

    Fixture {
        _dir: dir,
        _bundle: bundle,
        assets,
        dispatcher: PreviewDispatcher::new(pipeline, renderer, platform),
        banner,
    }
}

#[tokio::test]
async fn test_image_asset_renders_and_mounts_without_errors() {
    let f = fixture(Platform::React);
    let id = f.assets.create("data:image/png;base64,AAA", AssetKind::Image);
    assert_eq!(id, "asset_1");

    let source = r#"import React from 'react';

export default function App() {
  return <img src="%%asset_1%%" />;
}
"#;
    let outcome = f.dispatcher.render(source, &f.assets).await.unwrap();
    let RenderOutcome::Rendered { generation, warnings } = outcome else {
        panic!("expected a rendered outcome");
    };
    assert!(warnings.is_empty());

    let renderer = f.dispatcher.renderer();
    let document = renderer.document().unwrap();
    assert!(document.html.contains(r#"<img src="data:image/png;base64,AAA" />"#));
    assert!(!document.html.contains("%%asset_1%%"));
    assert!(document.html.contains("exports.default = function App()"));

    // The sandbox reports a successful mount
    let ready = json!({
        "type": "ready",
        "paneId": renderer.pane_id().as_str(),
        "generation": generation,
    });
    assert_eq!(renderer.handle_message(&ready), MessageDisposition::Mounted);
    assert_eq!(renderer.mount_state(), MountState::Mounted);
    assert!(!renderer.check_mount_deadline(Instant::now() + Duration::from_secs(3600)));
    assert!(f.banner.errors.lock().is_empty());
}

#[tokio::test]
async fn test_syntax_error_keeps_previous_preview() {
    let f = fixture(Platform::React);
    f.dispatcher
        .render("export default function App() { return null; }", &f.assets)
        .await
        .unwrap();

    let err = f
        .dispatcher
        .render("export default function App() { return << }", &f.assets)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "unknown: Unexpected token (1:10)");

    let document = f.dispatcher.renderer().document().unwrap();
    assert!(document.html.contains("return null;"));
    assert_eq!(
        f.banner.current.lock().as_deref(),
        Some("unknown: Unexpected token (1:10)")
    );
}

#[tokio::test]
async fn test_assets_created_between_renders_are_picked_up() {
    let f = fixture(Platform::React);
    let source = "export default () => '%%asset_1%%';";

    f.dispatcher.render(source, &f.assets).await.unwrap();
    let before = f.dispatcher.renderer().document().unwrap();
    assert!(before.html.contains("'%%asset_1%%'"));

    f.assets.create("data:audio/mpeg;base64,SUQz", AssetKind::Sound);
    f.dispatcher.render(source, &f.assets).await.unwrap();
    let after = f.dispatcher.renderer().document().unwrap();
    assert!(after.html.contains("'data:audio/mpeg;base64,SUQz'"));
}

#[tokio::test]
async fn test_stale_runtime_error_is_dropped_after_rerender() {
    let f = fixture(Platform::Vue);
    let source = "<template><p>hi</p></template><script>export default {};</script>";

    let RenderOutcome::Rendered { generation: first, .. } =
        f.dispatcher.render(source, &f.assets).await.unwrap()
    else {
        panic!("expected a rendered outcome");
    };
    f.dispatcher.render(source, &f.assets).await.unwrap();

    let renderer = f.dispatcher.renderer();
    let late = json!({
        "type": "error",
        "message": "TypeError: late",
        "paneId": renderer.pane_id().as_str(),
        "generation": first,
    });
    assert_eq!(renderer.handle_message(&late), MessageDisposition::Stale);
    assert!(f.banner.errors.lock().is_empty());
}

#[tokio::test]
async fn test_exported_vue_document_is_standalone() {
    let f = fixture(Platform::Vue);
    f.assets.create("data:image/png;base64,AAA", AssetKind::Image);
    let source = r#"<template>
  <img src="%%asset_1%%" />
</template>

<script>
export default { name: 'Gallery' };
</script>

<style>
img { width: 100%; }
</style>"#;

    let document = f.dispatcher.export(source, &f.assets).await.unwrap();
    assert!(document.pane_id.is_none());
    assert!(document
        .html
        .contains(r#"componentOptions.template = "\n  <img src=\"data:image/png;base64,AAA\" />\n";"#));
    assert!(document.html.contains("exports.default = { name: 'Gallery' };"));
    assert!(document.html.contains("img { width: 100%; }"));
    assert!(f.dispatcher.renderer().document().is_none());
}
