//! Babel standalone hosted in boa_engine
//!
//! boa contexts are not `Send`, so the compiler lives on a dedicated thread
//! that owns one [`Context`] for its whole life. Jobs arrive over a channel
//! and each reply travels back on a oneshot. The bundle is evaluated once,
//! on the first transform.
//!
//! A job that overruns the transform budget cannot be interrupted inside the
//! engine. The worker is abandoned instead (its job channel is dropped, so
//! the thread exits once the runaway script returns) and a fresh worker is
//! started on the next call.
//!
//! A bundle that overruns the load budget is handled differently: its thread
//! is kept as a pending load. Later calls report the compiler as unavailable
//! until that thread reports back, then adopt it (or start over if it failed),
//! so a slow bundle is never evaluated twice at once.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use boa_engine::{Context, Source};
use serde::Deserialize;
use tokio::sync::{oneshot, Mutex};

use super::{Compiler, TransformError, TransformOptions};
use crate::config::PipelineConfig;

/// Evaluates to `"ready"` once the bundle has installed the `Babel` global
const BABEL_PROBE: &str = r#"(typeof Babel === 'object' && Babel !== null && typeof Babel.transform === 'function') ? 'ready' : 'missing'"#;

enum BundleSource {
    File(PathBuf),
    Inline(Arc<str>),
}

struct TransformJob {
    source: String,
    options: String,
    reply: oneshot::Sender<Result<String, TransformError>>,
}

struct WorkerHandle {
    jobs: mpsc::Sender<TransformJob>,
}

enum WorkerState {
    Idle,
    /// Bundle evaluation outlived the load timeout and is still running
    Loading {
        handle: WorkerHandle,
        ready: ReadyReceiver,
    },
    Ready(WorkerHandle),
}

#[derive(Debug, Deserialize)]
struct JobOutcome {
    ok: bool,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Compiler backed by the Babel standalone bundle
pub struct BabelCompiler {
    bundle: BundleSource,
    transform_timeout: Duration,
    load_timeout: Duration,
    worker: Mutex<WorkerState>,
}

impl BabelCompiler {
    /// Compiler that loads the bundle from `path` on first use
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::with_bundle(BundleSource::File(path.into()))
    }

    /// Compiler that evaluates `script` as the bundle
    pub fn from_script(script: impl Into<Arc<str>>) -> Self {
        Self::with_bundle(BundleSource::Inline(script.into()))
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::from_path(config.babel_script_path.clone())
            .with_transform_timeout(config.transform_timeout())
            .with_load_timeout(config.load_timeout())
    }

    fn with_bundle(bundle: BundleSource) -> Self {
        let defaults = PipelineConfig::default();
        Self {
            bundle,
            transform_timeout: defaults.transform_timeout(),
            load_timeout: defaults.load_timeout(),
            worker: Mutex::new(WorkerState::Idle),
        }
    }

    pub fn with_transform_timeout(mut self, timeout: Duration) -> Self {
        self.transform_timeout = timeout;
        self
    }

    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }

    /// Path of the bundle, if it is loaded from disk
    pub fn bundle_path(&self) -> Option<&Path> {
        match &self.bundle {
            BundleSource::File(path) => Some(path),
            BundleSource::Inline(_) => None,
        }
    }

    /// Whether a worker with a loaded bundle is currently running
    pub async fn is_loaded(&self) -> bool {
        matches!(*self.worker.lock().await, WorkerState::Ready(_))
    }

    /// Whether a bundle load that overran its timeout is still running
    pub async fn is_load_pending(&self) -> bool {
        matches!(*self.worker.lock().await, WorkerState::Loading { .. })
    }

    async fn read_bundle(&self) -> Result<String, TransformError> {
        match &self.bundle {
            BundleSource::File(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
                log::error!("Cannot read Babel bundle at {:?}: {}", path, e);
                TransformError::not_loaded()
            }),
            BundleSource::Inline(script) => Ok(script.to_string()),
        }
    }

    async fn start_worker(&self) -> Result<WorkerState, TransformError> {
        let script = self.read_bundle().await?;
        log::info!("Loading Babel compiler ({} bytes)", script.len());

        let (handle, mut ready) = spawn_worker(script)?;
        match tokio::time::timeout(self.load_timeout, &mut ready).await {
            Ok(Ok(Ok(()))) => {
                log::info!("Babel compiler ready");
                Ok(WorkerState::Ready(handle))
            }
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(_)) => Err(TransformError::Worker(
                "compiler thread exited while loading".to_string(),
            )),
            Err(_) => {
                log::error!(
                    "Babel bundle did not load within {}ms; waiting for the load to finish",
                    self.load_timeout.as_millis()
                );
                Ok(WorkerState::Loading { handle, ready })
            }
        }
    }

    /// Bring the worker to `Ready`, starting or adopting a thread as needed
    async fn ensure_ready(&self, worker: &mut WorkerState) -> Result<(), TransformError> {
        if let WorkerState::Loading { ready, .. } = &mut *worker {
            match ready.try_recv() {
                Ok(Ok(())) => {
                    log::info!("Delayed Babel load finished; compiler ready");
                    if let WorkerState::Loading { handle, .. } =
                        std::mem::replace(worker, WorkerState::Idle)
                    {
                        *worker = WorkerState::Ready(handle);
                    }
                }
                Ok(Err(e)) => {
                    *worker = WorkerState::Idle;
                    return Err(e);
                }
                Err(oneshot::error::TryRecvError::Empty) => {
                    log::warn!("Babel bundle is still loading; not starting another load");
                    return Err(TransformError::CompilerUnavailable(
                        "Babel is still loading.".to_string(),
                    ));
                }
                Err(oneshot::error::TryRecvError::Closed) => {
                    *worker = WorkerState::Idle;
                }
            }
        }

        if matches!(*worker, WorkerState::Idle) {
            *worker = self.start_worker().await?;
        }
        match &*worker {
            WorkerState::Ready(_) => Ok(()),
            _ => Err(TransformError::Timeout(self.load_timeout.as_millis() as u64)),
        }
    }
}

#[async_trait]
impl Compiler for BabelCompiler {
    fn name(&self) -> &str {
        "babel"
    }

    async fn transform(
        &self,
        source: &str,
        options: &TransformOptions,
    ) -> Result<String, TransformError> {
        let source = serde_json::to_string(source)
            .map_err(|e| TransformError::Worker(format!("cannot encode source: {}", e)))?;
        let options = serde_json::to_string(options)
            .map_err(|e| TransformError::Worker(format!("cannot encode options: {}", e)))?;

        let mut worker = self.worker.lock().await;
        self.ensure_ready(&mut worker).await?;

        let (reply_tx, reply_rx) = oneshot::channel();
        let job = TransformJob {
            source,
            options,
            reply: reply_tx,
        };
        let sent = match &*worker {
            WorkerState::Ready(handle) => handle.jobs.send(job).is_ok(),
            _ => false,
        };
        if !sent {
            *worker = WorkerState::Idle;
            return Err(TransformError::Worker("compiler thread is gone".to_string()));
        }

        match tokio::time::timeout(self.transform_timeout, reply_rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => {
                *worker = WorkerState::Idle;
                Err(TransformError::Worker(
                    "compiler thread exited before replying".to_string(),
                ))
            }
            Err(_) => {
                log::warn!(
                    "Transform exceeded {}ms; abandoning compiler worker",
                    self.transform_timeout.as_millis()
                );
                *worker = WorkerState::Idle;
                Err(TransformError::Timeout(
                    self.transform_timeout.as_millis() as u64,
                ))
            }
        }
    }
}

type ReadyReceiver = oneshot::Receiver<Result<(), TransformError>>;

fn spawn_worker(script: String) -> Result<(WorkerHandle, ReadyReceiver), TransformError> {
    let (job_tx, job_rx) = mpsc::channel::<TransformJob>();
    let (ready_tx, ready_rx) = oneshot::channel();

    thread::Builder::new()
        .name("babel-compiler".to_string())
        .spawn(move || {
            let mut context = Context::default();
            let loaded = load_bundle(&mut context, &script);
            let failed = loaded.is_err();
            let _ = ready_tx.send(loaded);
            if failed {
                return;
            }

            while let Ok(job) = job_rx.recv() {
                let result = run_job(&mut context, &job.source, &job.options);
                // The caller may have timed out and dropped the receiver
                let _ = job.reply.send(result);
            }
            log::debug!("Babel compiler worker stopped");
        })
        .map_err(|e| TransformError::Worker(format!("cannot start compiler thread: {}", e)))?;

    Ok((WorkerHandle { jobs: job_tx }, ready_rx))
}

fn load_bundle(context: &mut Context, script: &str) -> Result<(), TransformError> {
    if let Err(e) = context.eval(Source::from_bytes(script)) {
        log::error!("Babel bundle failed to evaluate: {}", e);
        return Err(TransformError::not_loaded());
    }
    match eval_to_string(context, BABEL_PROBE)?.as_str() {
        "ready" => Ok(()),
        _ => {
            log::error!("Babel bundle evaluated but did not define a Babel global");
            Err(TransformError::not_loaded())
        }
    }
}

/// `source` and `options` are JSON literals, which are valid script expressions
fn run_job(context: &mut Context, source: &str, options: &str) -> Result<String, TransformError> {
    let program = format!(
        r#"(function () {{
  try {{
    var result = Babel.transform({source}, {options});
    return JSON.stringify({{ ok: true, code: result.code }});
  }} catch (e) {{
    var message = (e && e.message !== undefined) ? e.message : e;
    return JSON.stringify({{ ok: false, message: String(message) }});
  }}
}})()"#,
        source = source,
        options = options
    );

    let raw = eval_to_string(context, &program)?;
    let outcome: JobOutcome = serde_json::from_str(&raw)
        .map_err(|e| TransformError::Worker(format!("unexpected compiler output: {}", e)))?;

    if outcome.ok {
        Ok(outcome.code.unwrap_or_default())
    } else {
        Err(TransformError::Syntax(outcome.message.unwrap_or_default()))
    }
}

fn eval_to_string(context: &mut Context, code: &str) -> Result<String, TransformError> {
    let value = context
        .eval(Source::from_bytes(code))
        .map_err(|e| TransformError::Worker(e.to_string()))?;
    value
        .to_string(context)
        .map(|s| s.to_std_string_escaped())
        .map_err(|e| TransformError::Worker(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Minimal stand-in for the real bundle: prefixes the presets it was asked
    /// for, rejects `<<`, and spins on the literal source `spin`
    const FAKE_BABEL: &str = r#"
var Babel = {
  transform: function (code, options) {
    if (code === 'spin') {
      var end = Date.now() + 1500;
      while (Date.now() < end) {}
    }
    if (code.indexOf('<<') !== -1) {
      throw new SyntaxError('unknown: Unexpected token (1:0)');
    }
    return { code: '/* ' + options.presets.join(',') + ' */\n' + code };
  }
};
"#;

    #[tokio::test]
    async fn test_transform_passes_options() {
        let compiler = BabelCompiler::from_script(FAKE_BABEL);
        let code = compiler
            .transform("const a = 1;", &TransformOptions::component())
            .await
            .unwrap();
        assert_eq!(code, "/* react,es2015 */\nconst a = 1;");
        assert!(compiler.is_loaded().await);
    }

    #[tokio::test]
    async fn test_source_text_survives_embedding() {
        let compiler = BabelCompiler::from_script(FAKE_BABEL);
        let source = "const s = \"quote\" + '\\n' + `</script>`;\n// ünïcode";
        let code = compiler
            .transform(source, &TransformOptions::sfc_script(false))
            .await
            .unwrap();
        assert!(code.ends_with(source));
    }

    #[tokio::test]
    async fn test_syntax_error_is_verbatim() {
        let compiler = BabelCompiler::from_script(FAKE_BABEL);
        let err = compiler
            .transform("a << ", &TransformOptions::component())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TransformError::Syntax("unknown: Unexpected token (1:0)".to_string())
        );
        // The worker survives compiler diagnostics
        assert!(compiler.is_loaded().await);
    }

    #[tokio::test]
    async fn test_bundle_without_babel_global() {
        let compiler = BabelCompiler::from_script("var notBabel = 1;");
        let err = compiler
            .transform("x", &TransformOptions::component())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Babel is not loaded.");
        assert!(!compiler.is_loaded().await);
    }

    #[tokio::test]
    async fn test_missing_bundle_file() {
        let dir = tempfile::tempdir().unwrap();
        let compiler = BabelCompiler::from_path(dir.path().join("babel.min.js"));
        let err = compiler
            .transform("x", &TransformOptions::component())
            .await
            .unwrap_err();
        assert!(matches!(err, TransformError::CompilerUnavailable(_)));
    }

    #[tokio::test]
    async fn test_bundle_loaded_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FAKE_BABEL.as_bytes()).unwrap();
        let compiler = BabelCompiler::from_path(file.path());
        assert_eq!(compiler.bundle_path(), Some(file.path()));
        let code = compiler
            .transform("x", &TransformOptions::sfc_script(true))
            .await
            .unwrap();
        assert_eq!(code, "/* es2015,react */\nx");
    }

    #[tokio::test]
    async fn test_timeout_abandons_worker_and_recovers() {
        let compiler =
            BabelCompiler::from_script(FAKE_BABEL).with_transform_timeout(Duration::from_millis(100));
        let err = compiler
            .transform("spin", &TransformOptions::component())
            .await
            .unwrap_err();
        assert_eq!(err, TransformError::Timeout(100));
        assert!(!compiler.is_loaded().await);

        let code = compiler
            .transform("ok", &TransformOptions::component())
            .await
            .unwrap();
        assert!(code.ends_with("ok"));
    }

    /// Takes ~400ms to evaluate
    const SLOW_BABEL: &str = r#"
var end = Date.now() + 400;
while (Date.now() < end) {}
var Babel = {
  transform: function (code, options) {
    return { code: '/* slow */\n' + code };
  }
};
"#;

    #[tokio::test]
    async fn test_slow_load_is_not_restarted() {
        let compiler =
            BabelCompiler::from_script(SLOW_BABEL).with_load_timeout(Duration::from_millis(50));
        let err = compiler
            .transform("a", &TransformOptions::component())
            .await
            .unwrap_err();
        assert_eq!(err, TransformError::Timeout(50));
        assert!(compiler.is_load_pending().await);

        // Retrying while the first load runs does not start a second one
        let err = compiler
            .transform("b", &TransformOptions::component())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Babel is still loading.");
        assert!(compiler.is_load_pending().await);

        tokio::time::sleep(Duration::from_millis(800)).await;
        let code = compiler
            .transform("c", &TransformOptions::component())
            .await
            .unwrap();
        assert_eq!(code, "/* slow */\nc");
        assert!(compiler.is_loaded().await);
    }
}
