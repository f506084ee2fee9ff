//! Book Catalog
//!
//! Record types exchanged with the extractor and storage, and the matcher that
//! corrects freshly extracted records against previously accepted ones.

pub mod matcher;
pub mod similarity;

pub use matcher::{apply_catalog_entry, CatalogMatch, CatalogMatcher, Enhancement};
pub use similarity::title_similarity;

use serde::{Deserialize, Serialize};

/// Confidence assumed when the extractor does not report one
pub const DEFAULT_RECORD_CONFIDENCE: f32 = 0.5;

fn default_record_confidence() -> f32 {
    DEFAULT_RECORD_CONFIDENCE
}

/// A previously accepted book record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub edition: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl CatalogEntry {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: None,
            publisher: None,
            edition: None,
            category: None,
        }
    }
}

/// A book as reported by the extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub edition: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    /// Extractor's self-reported confidence (0.0 - 1.0)
    #[serde(default = "default_record_confidence")]
    pub confidence: f32,
    /// Set once the record has been corrected from a catalog entry
    #[serde(default)]
    pub catalog_derived: bool,
}

impl BookRecord {
    pub fn new(title: impl Into<String>, confidence: f32) -> Self {
        Self {
            title: title.into(),
            author: None,
            publisher: None,
            edition: None,
            category: None,
            price: None,
            confidence: confidence.clamp(0.0, 1.0),
            catalog_derived: false,
        }
    }

    /// The catalog view of this record, as stored once accepted
    pub fn to_catalog_entry(&self) -> CatalogEntry {
        CatalogEntry {
            title: self.title.clone(),
            author: self.author.clone(),
            publisher: self.publisher.clone(),
            edition: self.edition.clone(),
            category: self.category.clone(),
        }
    }
}
