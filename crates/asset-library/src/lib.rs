//! Asset library for the app builder
//!
//! Owns the asset table that generated components reference through
//! `%%asset_N%%` placeholder tokens:
//! - **Store**: append-only list of asset records persisted through a key-value store
//! - **Uploads**: batch import of image files as data URIs
//! - **Backends**: image generation, text-to-speech and stock photo search over HTTP
//!
//! # Example
//!
//! ```rust,ignore
//! use asset_library::{AssetKind, AssetStore, FileKeyValueStore};
//! use std::sync::Arc;
//!
//! let kv = Arc::new(FileKeyValueStore::open("data/storage.json"));
//! let store = AssetStore::load(kv);
//! let id = store.create("data:image/png;base64,AAA", AssetKind::Image);
//! assert_eq!(id, "asset_1");
//! ```

pub mod backend;
pub mod data_uri;
pub mod error;
pub mod kv;
pub mod record;
pub mod store;
pub mod upload;

// Re-exports for convenience
pub use backend::{
    BackendError, ImageGenerator, SpeechGenerator, StockPhoto, StockPhotoSearch, Voice, VOICES,
};
pub use error::AssetError;
pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use record::{placeholder_for, AssetKind, AssetRecord};
pub use store::{AssetStore, SharedAssetStore, ASSETS_STORAGE_KEY};
pub use upload::{import_paths, import_uploads, UploadReport, UploadedFile};
