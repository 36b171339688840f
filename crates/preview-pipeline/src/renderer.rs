//! Isolated renderer
//!
//! One renderer per preview pane. It owns the document currently shown in the
//! pane's sandboxed `iframe`, and is the only consumer of the messages the
//! sandbox posts back. Reports from another pane or from a document that has
//! since been replaced are dropped; accepted errors go to the pane's
//! [`ErrorSurface`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::host::GeneratedDocument;

/// Sandbox permissions granted to every preview frame
pub const SANDBOX_PERMISSIONS: &str = "allow-scripts allow-same-origin";

/// Identity of a preview pane
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaneId(String);

impl PaneId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PaneId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PaneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a pane shows its errors (the error banner)
pub trait ErrorSurface: Send + Sync {
    fn show_error(&self, message: &str);
    fn clear_error(&self);
}

/// Messages the sandbox posts to its parent
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChannelMessage {
    Error {
        message: String,
        #[serde(default, rename = "paneId")]
        pane_id: Option<String>,
        #[serde(default)]
        generation: Option<u64>,
    },
    Ready {
        #[serde(default, rename = "paneId")]
        pane_id: Option<String>,
        #[serde(default)]
        generation: Option<u64>,
    },
}

impl ChannelMessage {
    /// Parse raw message data; anything that is not a well-formed report yields `None`
    pub fn parse(data: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(data.clone()).ok()
    }

    fn pane_id(&self) -> Option<&str> {
        match self {
            ChannelMessage::Error { pane_id, .. } | ChannelMessage::Ready { pane_id, .. } => {
                pane_id.as_deref()
            }
        }
    }

    fn generation(&self) -> Option<u64> {
        match self {
            ChannelMessage::Error { generation, .. } | ChannelMessage::Ready { generation, .. } => {
                *generation
            }
        }
    }
}

/// What happened to an incoming message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageDisposition {
    /// Not a channel message
    Ignored,
    /// Tagged for another pane
    ForeignPane,
    /// Tagged with a generation that is no longer loaded
    Stale,
    ErrorReported,
    Mounted,
}

/// Mount progress of the loaded document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountState {
    Empty,
    Pending { since: Instant },
    Mounted,
    Faulted,
    TimedOut,
}

impl MountState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MountState::Empty => "empty",
            MountState::Pending { .. } => "pending",
            MountState::Mounted => "mounted",
            MountState::Faulted => "faulted",
            MountState::TimedOut => "timed_out",
        }
    }
}

struct RendererState {
    document: Option<GeneratedDocument>,
    generation: Option<u64>,
    mount: MountState,
}

/// Owns one pane's sandboxed content
pub struct IsolatedRenderer {
    pane_id: PaneId,
    surface: Arc<dyn ErrorSurface>,
    mount_timeout: Duration,
    state: Mutex<RendererState>,
}

impl IsolatedRenderer {
    pub fn new(surface: Arc<dyn ErrorSurface>, mount_timeout: Duration) -> Self {
        Self {
            pane_id: PaneId::new(),
            surface,
            mount_timeout,
            state: Mutex::new(RendererState {
                document: None,
                generation: None,
                mount: MountState::Empty,
            }),
        }
    }

    pub fn pane_id(&self) -> &PaneId {
        &self.pane_id
    }

    pub fn surface(&self) -> &Arc<dyn ErrorSurface> {
        &self.surface
    }

    /// Replace the pane content with `document`.
    ///
    /// The previous document is discarded entirely; nothing carries over
    /// between loads. Clears the error surface.
    pub fn load(&self, document: GeneratedDocument) {
        {
            let mut state = self.state.lock();
            log::debug!(
                "Pane {} loading generation {:?} ({} bytes)",
                self.pane_id,
                document.generation,
                document.html.len()
            );
            state.generation = document.generation;
            state.document = Some(document);
            state.mount = MountState::Pending {
                since: Instant::now(),
            };
        }
        self.surface.clear_error();
    }

    pub fn document(&self) -> Option<GeneratedDocument> {
        self.state.lock().document.clone()
    }

    pub fn current_generation(&self) -> Option<u64> {
        self.state.lock().generation
    }

    pub fn mount_state(&self) -> MountState {
        self.state.lock().mount
    }

    /// The `iframe` element showing the current document
    pub fn embed_markup(&self) -> String {
        let state = self.state.lock();
        let srcdoc = state
            .document
            .as_ref()
            .map(|doc| escape_attribute(&doc.html))
            .unwrap_or_default();
        let title = match &state.document {
            Some(doc) => format!("{} Preview", capitalize(doc.platform.as_str())),
            None => "Preview".to_string(),
        };
        format!(
            "<iframe title=\"{}\" sandbox=\"{}\" data-pane-id=\"{}\" srcdoc=\"{}\"></iframe>",
            title, SANDBOX_PERMISSIONS, self.pane_id, srcdoc
        )
    }

    /// Handle a message posted by the sandbox
    pub fn handle_message(&self, data: &serde_json::Value) -> MessageDisposition {
        let Some(message) = ChannelMessage::parse(data) else {
            return MessageDisposition::Ignored;
        };

        if let Some(pane) = message.pane_id() {
            if pane != self.pane_id.as_str() {
                log::debug!("Pane {} dropping message for pane {}", self.pane_id, pane);
                return MessageDisposition::ForeignPane;
            }
        }

        let disposition = {
            let mut state = self.state.lock();
            if let Some(generation) = message.generation() {
                if state.generation != Some(generation) {
                    log::debug!(
                        "Pane {} dropping report from generation {} (current {:?})",
                        self.pane_id,
                        generation,
                        state.generation
                    );
                    return MessageDisposition::Stale;
                }
            }

            match &message {
                ChannelMessage::Error { .. } => {
                    state.mount = MountState::Faulted;
                    MessageDisposition::ErrorReported
                }
                ChannelMessage::Ready { .. } => {
                    if matches!(state.mount, MountState::Pending { .. }) {
                        state.mount = MountState::Mounted;
                    }
                    MessageDisposition::Mounted
                }
            }
        };

        if let ChannelMessage::Error { message, .. } = &message {
            log::info!("Pane {} runtime error: {}", self.pane_id, first_line(message));
            self.surface.show_error(message);
        }
        disposition
    }

    /// Surface an error if the loaded document has neither mounted nor failed
    /// within the mount timeout. Returns `true` the one time it fires.
    pub fn check_mount_deadline(&self, now: Instant) -> bool {
        {
            let mut state = self.state.lock();
            let MountState::Pending { since } = state.mount else {
                return false;
            };
            if now.saturating_duration_since(since) < self.mount_timeout {
                return false;
            }
            state.mount = MountState::TimedOut;
        }

        let message = format!(
            "Preview did not report a successful mount within {} ms",
            self.mount_timeout.as_millis()
        );
        log::warn!("Pane {}: {}", self.pane_id, message);
        self.surface.show_error(&message);
        true
    }
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + value.len() / 8);
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;
    use serde_json::json;

    #[derive(Default)]
    struct RecordingSurface {
        shown: Mutex<Vec<String>>,
        cleared: Mutex<usize>,
    }

    impl ErrorSurface for RecordingSurface {
        fn show_error(&self, message: &str) {
            self.shown.lock().push(message.to_string());
        }

        fn clear_error(&self) {
            *self.cleared.lock() += 1;
        }
    }

    fn renderer() -> (IsolatedRenderer, Arc<RecordingSurface>) {
        let surface = Arc::new(RecordingSurface::default());
        let renderer = IsolatedRenderer::new(surface.clone(), Duration::from_millis(1000));
        (renderer, surface)
    }

    fn document(generation: Option<u64>, html: &str) -> GeneratedDocument {
        GeneratedDocument {
            platform: Platform::React,
            html: html.to_string(),
            pane_id: None,
            generation,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_non_channel_messages_are_ignored() {
        let (renderer, surface) = renderer();
        renderer.load(document(None, "<p>x</p>"));
        for data in [
            json!("error"),
            json!({ "type": "log", "message": "hi" }),
            json!({ "type": "error" }),
            json!({ "type": "error", "message": 42 }),
            json!(null),
        ] {
            assert_eq!(renderer.handle_message(&data), MessageDisposition::Ignored);
        }
        assert!(surface.shown.lock().is_empty());
    }

    #[test]
    fn test_untagged_error_is_surfaced() {
        let (renderer, surface) = renderer();
        renderer.load(document(None, ""));
        let disposition =
            renderer.handle_message(&json!({ "type": "error", "message": "ReferenceError: x" }));
        assert_eq!(disposition, MessageDisposition::ErrorReported);
        assert_eq!(*surface.shown.lock(), vec!["ReferenceError: x".to_string()]);
        assert_eq!(renderer.mount_state(), MountState::Faulted);
    }

    #[test]
    fn test_foreign_pane_and_stale_generation_are_dropped() {
        let (renderer, surface) = renderer();
        renderer.load(document(Some(2), ""));
        let pane = renderer.pane_id().to_string();

        let foreign = json!({ "type": "error", "message": "boom", "paneId": "other", "generation": 2 });
        assert_eq!(renderer.handle_message(&foreign), MessageDisposition::ForeignPane);

        let stale = json!({ "type": "error", "message": "boom", "paneId": pane, "generation": 1 });
        assert_eq!(renderer.handle_message(&stale), MessageDisposition::Stale);
        assert!(surface.shown.lock().is_empty());

        let current = json!({ "type": "error", "message": "boom", "paneId": pane, "generation": 2 });
        assert_eq!(renderer.handle_message(&current), MessageDisposition::ErrorReported);
    }

    #[test]
    fn test_load_replaces_content_and_clears_error() {
        let (renderer, surface) = renderer();
        renderer.load(document(Some(1), "<p>one</p>"));
        renderer.load(document(Some(2), "<p>two</p>"));
        assert_eq!(renderer.current_generation(), Some(2));
        assert_eq!(renderer.document().unwrap().html, "<p>two</p>");
        assert_eq!(*surface.cleared.lock(), 2);
    }

    #[test]
    fn test_ready_marks_mounted_and_cancels_deadline() {
        let (renderer, surface) = renderer();
        renderer.load(document(Some(1), ""));
        let ready = json!({ "type": "ready", "paneId": renderer.pane_id().as_str(), "generation": 1 });
        assert_eq!(renderer.handle_message(&ready), MessageDisposition::Mounted);
        assert_eq!(renderer.mount_state(), MountState::Mounted);
        assert!(!renderer.check_mount_deadline(Instant::now() + Duration::from_secs(60)));
        assert!(surface.shown.lock().is_empty());
    }

    #[test]
    fn test_mount_deadline_fires_once() {
        let (renderer, surface) = renderer();
        renderer.load(document(Some(1), ""));
        assert!(!renderer.check_mount_deadline(Instant::now()));

        let later = Instant::now() + Duration::from_millis(1500);
        assert!(renderer.check_mount_deadline(later));
        assert!(!renderer.check_mount_deadline(later));
        assert_eq!(
            *surface.shown.lock(),
            vec!["Preview did not report a successful mount within 1000 ms".to_string()]
        );
        assert_eq!(renderer.mount_state(), MountState::TimedOut);
    }

    #[test]
    fn test_embed_markup_escapes_document() {
        let (renderer, _) = renderer();
        renderer.load(document(None, "<p class=\"a\">Tom & Jerry</p>"));
        let markup = renderer.embed_markup();
        assert!(markup.starts_with("<iframe title=\"React Preview\""));
        assert!(markup.contains("sandbox=\"allow-scripts allow-same-origin\""));
        assert!(markup.contains("srcdoc=\"&lt;p class=&quot;a&quot;&gt;Tom &amp; Jerry&lt;/p&gt;\""));
    }
}
