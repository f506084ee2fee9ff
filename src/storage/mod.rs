//! Storage Layer
//!
//! Catalog sources the matcher reads its snapshot from, plus the application
//! data and config directories.

pub mod catalog_file;
pub mod database;

pub use catalog_file::{load_catalog, save_catalog, JsonCatalog};
pub use database::SqliteCatalog;

use std::path::PathBuf;
use tracing::warn;

use crate::catalog::{BookRecord, CatalogEntry};
use crate::error::{Result, ShelfError};

/// Store of previously accepted books
pub trait CatalogSource {
    /// Up to `limit` entries, most recently accepted first
    fn recent_entries(&self, limit: usize) -> Result<Vec<CatalogEntry>>;

    /// Store accepted records from one photo, returning how many were written
    fn save_books(
        &mut self,
        records: &[BookRecord],
        image_path: Option<&str>,
        ocr_text: Option<&str>,
    ) -> Result<usize>;
}

/// Catalog snapshot for one matching pass.
///
/// A missing or unreadable catalog yields an empty snapshot, so nothing gets
/// corrected but nothing fails either.
pub fn snapshot_or_empty(source: Option<&dyn CatalogSource>, limit: usize) -> Vec<CatalogEntry> {
    let Some(source) = source else {
        return Vec::new();
    };

    match source.recent_entries(limit) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Catalog unavailable, skipping correction: {}", e);
            Vec::new()
        }
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("org", "shelfscan", "shelfscan")
}

/// Get the application data directory
pub fn get_data_dir() -> Result<PathBuf> {
    let proj_dirs = project_dirs().ok_or(ShelfError::NoProjectDir("data"))?;

    let data_dir = proj_dirs.data_dir().to_path_buf();
    std::fs::create_dir_all(&data_dir)?;

    Ok(data_dir)
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let proj_dirs = project_dirs().ok_or(ShelfError::NoProjectDir("config"))?;

    let config_dir = proj_dirs.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}
