//! Application configuration storage
//!
//! Handles persistent storage of server, preview and generation settings in
//! `config.json` inside the data directory.

use std::path::{Path, PathBuf};

use preview_pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::constants::{hosts, paths, ports, timeouts};

/// Where the HTTP server listens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    hosts::LOCAL.to_string()
}

fn default_port() -> u16 {
    ports::SERVER
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Editor behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Quiet period before an edit is sent to the preview
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    timeouts::EDIT_DEBOUNCE_MS
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// Code generation settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CodegenConfig {
    /// Model override (e.g., "gemini-2.5-flash"); backend default when unset
    pub model: Option<String>,
    /// API base URL override, mostly for local proxies
    pub base_url: Option<String>,
}

/// Asset storage settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AssetConfig {
    /// Key-value store file; `storage.json` in the data directory when unset
    pub storage_file: Option<PathBuf>,
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub preview: PipelineConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub codegen: CodegenConfig,
    #[serde(default)]
    pub assets: AssetConfig,
}

/// Error types for configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(serde_json::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(serde_json::Error),
}

impl AppConfig {
    /// Load configuration from disk, or return defaults if not found
    pub async fn load(data_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = data_dir.join(paths::CONFIG_FILE);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path).await?;
        serde_json::from_str(&contents).map_err(ConfigError::Parse)
    }

    /// Save configuration to disk
    pub async fn save(&self, data_dir: &Path) -> Result<(), ConfigError> {
        fs::create_dir_all(data_dir).await?;

        let config_path = data_dir.join(paths::CONFIG_FILE);
        let contents = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        fs::write(&config_path, contents).await?;

        log::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }

    /// Key-value store file for the asset table
    pub fn storage_file(&self, data_dir: &Path) -> PathBuf {
        self.assets
            .storage_file
            .clone()
            .unwrap_or_else(|| data_dir.join(paths::STORAGE_FILE))
    }
}

/// Data directory: `$APP_BUILDER_DATA_DIR`, else `./data`
pub fn data_dir() -> PathBuf {
    std::env::var_os(paths::DATA_DIR_ENV)
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(paths::DATA_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(dir.path()).await.unwrap();
        assert_eq!(config.server.port, ports::SERVER);
        assert_eq!(config.editor.debounce_ms, 500);
        assert!(config.codegen.model.is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.server.port = 9000;
        config.codegen.model = Some("gemini-2.5-flash".to_string());
        config.save(dir.path()).await.unwrap();

        let loaded = AppConfig::load(dir.path()).await.unwrap();
        assert_eq!(loaded.server.port, 9000);
        assert_eq!(loaded.codegen.model.as_deref(), Some("gemini-2.5-flash"));
    }

    #[tokio::test]
    async fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{"preview": {"transform_timeout_ms": 100}}"#,
        )
        .unwrap();

        let config = AppConfig::load(dir.path()).await.unwrap();
        assert_eq!(config.preview.transform_timeout_ms, 100);
        assert_eq!(config.preview.mount_timeout_ms, 10_000);
        assert_eq!(
            config.preview.babel_script_path,
            PathBuf::from("data").join("babel.min.js")
        );
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.storage_file(dir.path()), dir.path().join("storage.json"));
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{ nope").unwrap();
        let err = AppConfig::load(dir.path()).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
