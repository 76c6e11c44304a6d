//! Sheet records supplied by the metadata store
//!
//! The acquisition component writes either one JSON file per sheet into a
//! directory or a single JSON array. Both shapes load into the same records.

use crate::io::error::{PipelineError, Result, file_system_error};
use crate::io::store::read_json;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One sprite sheet as described by the metadata store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRecord {
    /// Stable unique identifier
    pub id: String,
    /// Free-text title
    pub title: String,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// Author-supplied tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Location of the sheet image
    #[serde(alias = "local_path")]
    pub image_path: PathBuf,
    /// Declared width in pixels, zero when unknown
    #[serde(default)]
    pub image_width: u32,
    /// Declared height in pixels, zero when unknown
    #[serde(default)]
    pub image_height: u32,
}

impl SheetRecord {
    /// Title, description and tags joined and lowercased for keyword search
    pub fn search_text(&self) -> String {
        let mut text = String::with_capacity(
            self.title.len() + self.description.len() + self.tags.len() * 8,
        );
        text.push_str(&self.title);
        text.push(' ');
        text.push_str(&self.description);
        for tag in &self.tags {
            text.push(' ');
            text.push_str(tag);
        }
        text.to_lowercase()
    }

    /// Title and description, the only fields that carry layout hints
    pub fn layout_text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }

    /// Resolve the image location against the corpus root
    ///
    /// Absolute paths are used as-is. Relative paths are taken from the
    /// corpus root when the file exists there, otherwise from the working
    /// directory.
    pub fn resolve_image_path(&self, corpus_root: &Path) -> PathBuf {
        if self.image_path.is_absolute() {
            return self.image_path.clone();
        }
        let rooted = corpus_root.join(&self.image_path);
        if rooted.exists() {
            rooted
        } else {
            self.image_path.clone()
        }
    }
}

/// Load every record in the metadata store
///
/// Records come back sorted by id so runs are reproducible regardless of
/// directory listing order. In a directory store an unreadable record file is
/// logged and skipped.
///
/// # Errors
///
/// Returns an error if the store does not exist, cannot be listed, is a
/// malformed array document, or holds two records with the same id
pub fn load_metadata_store(path: &Path) -> Result<Vec<SheetRecord>> {
    let mut records: Vec<SheetRecord> = if path.is_dir() {
        let mut records = Vec::new();
        let entries = fs::read_dir(path).map_err(|e| file_system_error(path, "list", e))?;
        for entry in entries {
            let file = entry.map_err(|e| file_system_error(path, "list", e))?.path();
            if file.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            match read_json(&file) {
                Ok(record) => records.push(record),
                Err(error) => warn!(file = %file.display(), %error, "skipping malformed record"),
            }
        }
        records
    } else if path.is_file() {
        read_json(path)?
    } else {
        return Err(PipelineError::InvalidSourceData {
            reason: format!("metadata store '{}' does not exist", path.display()),
        });
    };

    records.sort_by(|a, b| a.id.cmp(&b.id));

    if let Some(pair) = records.windows(2).find(|pair| match pair {
        [a, b] => a.id == b.id,
        _ => false,
    }) {
        let id = pair.first().map(|r| r.id.clone()).unwrap_or_default();
        return Err(PipelineError::InvalidSourceData {
            reason: format!("duplicate sheet id '{id}' in metadata store"),
        });
    }

    Ok(records)
}
