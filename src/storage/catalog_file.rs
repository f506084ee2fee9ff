//! JSON catalog files
//!
//! A catalog file is a JSON array of entries in acceptance order, oldest
//! first. New books are appended at the end.

use std::path::{Path, PathBuf};
use tracing::debug;

use super::CatalogSource;
use crate::catalog::{BookRecord, CatalogEntry};
use crate::error::Result;

/// Load a catalog from file
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogEntry>> {
    let content = std::fs::read_to_string(path)?;
    let entries: Vec<CatalogEntry> = serde_json::from_str(&content)?;
    Ok(entries)
}

/// Save a catalog to file
pub fn save_catalog(entries: &[CatalogEntry], path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(entries)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Catalog backed by a single JSON file
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    path: PathBuf,
}

impl JsonCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append accepted records, creating the file if needed
    pub fn append_records(&self, records: &[BookRecord]) -> Result<()> {
        let mut entries = if self.path.exists() {
            load_catalog(&self.path)?
        } else {
            Vec::new()
        };

        entries.extend(records.iter().map(BookRecord::to_catalog_entry));
        save_catalog(&entries, &self.path)?;

        debug!("Catalog {:?} now holds {} entries", self.path, entries.len());
        Ok(())
    }
}

impl CatalogSource for JsonCatalog {
    fn recent_entries(&self, limit: usize) -> Result<Vec<CatalogEntry>> {
        let entries = load_catalog(&self.path)?;
        Ok(entries.into_iter().rev().take(limit).collect())
    }

    /// Photo path and OCR text are not kept in a JSON catalog
    fn save_books(
        &mut self,
        records: &[BookRecord],
        _image_path: Option<&str>,
        _ocr_text: Option<&str>,
    ) -> Result<usize> {
        self.append_records(records)?;
        Ok(records.len())
    }
}
