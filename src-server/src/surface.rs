//! Error banner shown above the preview pane

use parking_lot::RwLock;
use preview_pipeline::ErrorSurface;

/// Holds the message currently shown in the workspace error banner.
///
/// Transform failures and runtime errors reported by the sandbox land here;
/// the banner is cleared when a new document loads or the user dismisses it.
#[derive(Default)]
pub struct ErrorBanner {
    message: RwLock<Option<String>>,
}

impl ErrorBanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<String> {
        self.message.read().clone()
    }
}

impl ErrorSurface for ErrorBanner {
    fn show_error(&self, message: &str) {
        log::debug!("Error banner: {}", message);
        *self.message.write() = Some(message.to_string());
    }

    fn clear_error(&self) {
        *self.message.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_replaces_and_clear_removes() {
        let banner = ErrorBanner::new();
        assert!(banner.current().is_none());
        banner.show_error("first");
        banner.show_error("second");
        assert_eq!(banner.current().as_deref(), Some("second"));
        banner.clear_error();
        assert!(banner.current().is_none());
    }
}
