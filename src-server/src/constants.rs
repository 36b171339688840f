//! Application-wide constants
//!
//! Single source of truth for ports, timings and file names used by the
//! builder server.

/// Network port configuration
pub mod ports {
    /// Default port the builder UI is served on
    pub const SERVER: u16 = 5180;
}

/// Server host configuration
pub mod hosts {
    /// Default host for local server binding
    pub const LOCAL: &str = "127.0.0.1";
}

/// Timing configuration (in milliseconds)
pub mod timeouts {
    /// Quiet period after the last code change before the preview re-renders
    pub const EDIT_DEBOUNCE_MS: u64 = 500;
    /// How often the mount watchdog checks the preview pane
    pub const MOUNT_WATCH_INTERVAL_MS: u64 = 250;
}

/// Data storage paths
pub mod paths {
    /// Environment variable overriding the data directory
    pub const DATA_DIR_ENV: &str = "APP_BUILDER_DATA_DIR";
    /// Directory for configuration, the asset table and the Babel bundle.
    /// Relative to the working directory and should be gitignored.
    pub const DATA_DIR: &str = "data";
    /// Configuration file inside the data directory
    pub const CONFIG_FILE: &str = "config.json";
    /// Key-value store file inside the data directory
    pub const STORAGE_FILE: &str = "storage.json";
}

/// Environment variables holding third-party API keys
pub mod api_keys {
    /// Gemini key, used for both code and image generation
    pub const GEMINI: &[&str] = &["GEMINI_API_KEY", "API_KEY"];
    pub const ELEVENLABS: &[&str] = &["ELEVENLABS_API_KEY"];
    pub const PEXELS: &[&str] = &["PEXELS_API_KEY"];
}
