//! Error types for shelfscan
//!
//! Only the boundary adapters (recognizer, extractor, catalog sources, config)
//! produce errors. Segmentation and catalog matching are infallible.

use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, ShelfError>;

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum ShelfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Recognizer error: {0}")]
    Recognizer(String),

    #[error("Extractor error: {0}")]
    Extractor(String),

    #[error("Image file not found: {0:?}")]
    ImageNotFound(PathBuf),

    #[error("Could not determine {0} directory")]
    NoProjectDir(&'static str),
}
