//! Asset store
//!
//! The single owner of the asset table. Records are appended when a
//! generation or upload completes and the whole table is rewritten to the
//! key-value store after every mutation. Readers take snapshots; the preview
//! pipeline must snapshot at the start of each resolve step rather than
//! holding on to an older copy.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::AssetError;
use crate::kv::KeyValueStore;
use crate::record::{AssetKind, AssetRecord};

/// Key under which the asset table is persisted
pub const ASSETS_STORAGE_KEY: &str = "ai-app-builder-assets";

/// Append-only asset table with explicit load/save boundaries
pub struct AssetStore {
    kv: Arc<dyn KeyValueStore>,
    records: RwLock<Vec<AssetRecord>>,
}

impl AssetStore {
    /// Load the table from the key-value store.
    ///
    /// Never fails: missing, unreadable or malformed data yields an empty table.
    pub fn load(kv: Arc<dyn KeyValueStore>) -> Self {
        let records = match kv.get(ASSETS_STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<AssetRecord>>(&raw) {
                Ok(records) => {
                    log::info!("Loaded {} assets from storage", records.len());
                    records
                }
                Err(e) => {
                    log::error!("Failed to parse stored assets, starting empty: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::error!("Failed to read stored assets, starting empty: {}", e);
                Vec::new()
            }
        };

        Self {
            kv,
            records: RwLock::new(records),
        }
    }

    /// Persist the current table.
    ///
    /// Holds the write lock across the write so concurrent saves land in the
    /// same order as the mutations they follow.
    pub fn save(&self) -> Result<(), AssetError> {
        let records = self.records.write();
        self.persist(&records)
    }

    fn persist(&self, records: &[AssetRecord]) -> Result<(), AssetError> {
        let json = serde_json::to_string(records)?;
        self.kv.set(ASSETS_STORAGE_KEY, &json)
    }

    /// Append a new asset and persist the table.
    ///
    /// The id is `asset_<n+1>` where `n` is the table size before the append.
    /// A persistence failure is logged; the record stays in the in-memory
    /// table so the current session can keep using it.
    pub fn create(&self, content: impl Into<String>, kind: AssetKind) -> String {
        let mut records = self.records.write();
        let id = format!("asset_{}", records.len() + 1);
        records.push(AssetRecord {
            id: id.clone(),
            kind,
            content: content.into(),
        });

        log::debug!("Created {} asset {}", kind.as_str(), id);

        if let Err(e) = self.persist(&records) {
            log::error!("Failed to save assets to storage: {}", e);
        }
        id
    }

    /// Copy of the full table in insertion order
    pub fn snapshot(&self) -> Vec<AssetRecord> {
        self.records.read().clone()
    }

    /// Look up a single asset by id
    pub fn get(&self, id: &str) -> Option<AssetRecord> {
        self.records.read().iter().find(|r| r.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Image assets only, in insertion order
    pub fn images(&self) -> Vec<AssetRecord> {
        self.records
            .read()
            .iter()
            .filter(|r| r.kind == AssetKind::Image)
            .cloned()
            .collect()
    }

    /// Space-separated placeholders for every image asset ("Insert All")
    pub fn all_image_placeholders(&self) -> String {
        self.images()
            .iter()
            .map(AssetRecord::placeholder)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Shared store type for application state
pub type SharedAssetStore = Arc<AssetStore>;
