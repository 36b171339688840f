//! Asset records and placeholder tokens

use serde::{Deserialize, Serialize};

/// Kind of binary content an asset holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Sound,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Image => "image",
            AssetKind::Sound => "sound",
        }
    }
}

/// A stored asset.
///
/// Serialized as `{"id", "type", "url"}` so tables written by earlier
/// versions of the builder load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Sequential identifier (`asset_1`, `asset_2`, ...)
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    /// Content locator: a data URI or a remote URL
    #[serde(rename = "url")]
    pub content: String,
}

impl AssetRecord {
    /// The `%%id%%` token that references this asset from component source
    pub fn placeholder(&self) -> String {
        placeholder_for(&self.id)
    }
}

/// Build the placeholder token for an asset id
pub fn placeholder_for(id: &str) -> String {
    format!("%%{}%%", id)
}
