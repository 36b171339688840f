//! Configuration types for the preview pipeline

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Path to the Babel standalone bundle evaluated by the compiler worker
    #[serde(default = "default_babel_script_path")]
    pub babel_script_path: PathBuf,
    /// Budget for a single transform call in milliseconds
    #[serde(default = "default_transform_timeout")]
    pub transform_timeout_ms: u64,
    /// Budget for loading the compiler bundle in milliseconds
    #[serde(default = "default_load_timeout")]
    pub load_timeout_ms: u64,
    /// How long a loaded document may take to report a mount before the pane shows an error
    #[serde(default = "default_mount_timeout")]
    pub mount_timeout_ms: u64,
    /// Also apply the JSX preset to single-file component scripts
    #[serde(default)]
    pub sfc_script_jsx: bool,
}

fn default_babel_script_path() -> PathBuf {
    PathBuf::from("data").join("babel.min.js")
}

fn default_transform_timeout() -> u64 {
    5000
}

fn default_load_timeout() -> u64 {
    60_000
}

fn default_mount_timeout() -> u64 {
    10_000
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            babel_script_path: default_babel_script_path(),
            transform_timeout_ms: default_transform_timeout(),
            load_timeout_ms: default_load_timeout(),
            mount_timeout_ms: default_mount_timeout(),
            sfc_script_jsx: false,
        }
    }
}

impl PipelineConfig {
    pub fn transform_timeout(&self) -> Duration {
        Duration::from_millis(self.transform_timeout_ms)
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    pub fn mount_timeout(&self) -> Duration {
        Duration::from_millis(self.mount_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: PipelineConfig = serde_json::from_str(r#"{"sfc_script_jsx": true}"#).unwrap();
        assert!(config.sfc_script_jsx);
        assert_eq!(config.transform_timeout_ms, 5000);
        assert_eq!(config.babel_script_path, PathBuf::from("data").join("babel.min.js"));
    }
}
