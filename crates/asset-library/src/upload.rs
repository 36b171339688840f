//! Batch import of uploaded image files
//!
//! Each file is handled independently: non-image files are skipped with a
//! warning and a file that cannot be read is recorded as a failure, while the
//! rest of the batch still completes.

use std::path::Path;

use serde::Serialize;

use crate::data_uri;
use crate::error::AssetError;
use crate::record::AssetKind;
use crate::store::AssetStore;

/// A file handed to the asset library for import
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    /// Declared MIME type; guessed from the file name when absent
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Read a file from disk, guessing its MIME type from the extension
    pub async fn read(path: &Path) -> Result<Self, AssetError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AssetError::FileRead(format!("{}: {}", name, e)))?;

        Ok(Self {
            mime_type: None,
            name,
            bytes,
        })
    }

    /// Effective MIME type of the upload
    pub fn resolved_mime_type(&self) -> String {
        match &self.mime_type {
            Some(mime) if !mime.is_empty() => mime.clone(),
            _ => mime_guess::from_path(&self.name)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
        }
    }
}

/// Outcome of a batch import
#[derive(Debug, Default, Serialize)]
pub struct UploadReport {
    /// Ids of the assets created, in upload order
    pub created: Vec<String>,
    /// Names of files skipped because they are not images
    pub skipped: Vec<String>,
    /// `(file name, error message)` for files that could not be imported
    pub failed: Vec<(String, String)>,
}

impl UploadReport {
    /// First failure message, for surfacing in the panel banner
    pub fn first_error(&self) -> Option<&str> {
        self.failed.first().map(|(_, message)| message.as_str())
    }
}

/// Import already-read uploads as image assets
pub fn import_uploads(store: &AssetStore, files: Vec<UploadedFile>) -> UploadReport {
    let mut report = UploadReport::default();

    for file in files {
        let mime = file.resolved_mime_type();
        if !mime.starts_with("image/") {
            log::warn!("Skipping non-image file: {}", file.name);
            report.skipped.push(file.name);
            continue;
        }

        if file.bytes.is_empty() {
            let message = format!("Failed to read the file: {}", file.name);
            log::error!("{}", message);
            report.failed.push((file.name, message));
            continue;
        }

        let content = data_uri::encode(&mime, &file.bytes);
        report.created.push(store.create(content, AssetKind::Image));
    }

    report
}

/// Read files from disk and import them; unreadable files are recorded as failures
pub async fn import_paths(store: &AssetStore, paths: &[impl AsRef<Path>]) -> UploadReport {
    let mut files = Vec::new();
    let mut failed = Vec::new();

    for path in paths {
        let path = path.as_ref();
        match UploadedFile::read(path).await {
            Ok(file) => files.push(file),
            Err(e) => {
                log::error!("{}", e);
                failed.push((path.display().to_string(), e.to_string()));
            }
        }
    }

    let mut report = import_uploads(store, files);
    report.failed.extend(failed);
    report
}
