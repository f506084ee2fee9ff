//! Catalog matching
//!
//! Each extracted record is compared by title against every entry of a
//! bounded catalog snapshot. When the best score reaches the similarity
//! threshold the record takes the entry's title and any attributes the entry
//! actually has, and its confidence is raised.

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use super::similarity::title_similarity;
use super::{BookRecord, CatalogEntry};
use crate::config::MatchingConfig;

/// Best catalog entry found for a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogMatch {
    /// Position of the entry in the snapshot
    pub index: usize,
    /// Title similarity (0.0 - 1.0)
    pub score: f64,
}

/// Outcome of matching one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enhancement {
    /// The record after matching, unchanged when not enhanced
    pub record: BookRecord,
    /// Highest-scoring entry, if the catalog was not empty
    pub best_match: Option<CatalogMatch>,
    /// Whether the record was corrected from the catalog
    pub enhanced: bool,
}

impl Enhancement {
    /// Best similarity score, 0.0 for an empty catalog
    pub fn best_score(&self) -> f64 {
        self.best_match.as_ref().map_or(0.0, |m| m.score)
    }
}

/// Matches extracted records against a read-only catalog snapshot
#[derive(Debug, Clone)]
pub struct CatalogMatcher<'a> {
    catalog: &'a [CatalogEntry],
    config: MatchingConfig,
}

impl<'a> CatalogMatcher<'a> {
    /// Use at most `config.catalog_limit` entries from the front of `catalog`
    pub fn new(catalog: &'a [CatalogEntry], config: MatchingConfig) -> Self {
        let limit = catalog.len().min(config.catalog_limit);
        Self {
            catalog: &catalog[..limit],
            config,
        }
    }

    /// Entries taking part in matching
    pub fn snapshot(&self) -> &[CatalogEntry] {
        self.catalog
    }

    /// Highest-scoring entry for `title`.
    ///
    /// Later entries only replace the current best with a strictly higher
    /// score, so the first of several equal maxima wins.
    pub fn best_match(&self, title: &str) -> Option<CatalogMatch> {
        let mut best: Option<CatalogMatch> = None;

        for (index, entry) in self.catalog.iter().enumerate() {
            let score = title_similarity(title, &entry.title);
            let better = match &best {
                Some(current) => score > current.score,
                None => true,
            };
            if better {
                best = Some(CatalogMatch { index, score });
            }
        }

        best
    }

    /// Whether a score is high enough to take the catalog entry
    pub fn accepts(&self, score: f64) -> bool {
        score >= self.config.similarity_threshold
    }

    /// Match one record and apply the catalog entry when it qualifies
    pub fn enhance(&self, record: BookRecord) -> Enhancement {
        let best_match = self.best_match(&record.title);

        let accepted = best_match
            .as_ref()
            .filter(|m| self.accepts(m.score))
            .map(|m| (m.score, &self.catalog[m.index]));

        match accepted {
            Some((score, entry)) => {
                info!(
                    "Catalog correction: '{}' -> '{}' (similarity {:.3})",
                    record.title, entry.title, score
                );
                Enhancement {
                    record: apply_catalog_entry(record, entry, self.config.enhanced_confidence as f32),
                    best_match,
                    enhanced: true,
                }
            }
            None => {
                debug!(
                    "No catalog match for '{}' (best similarity {:.3})",
                    record.title,
                    best_match.as_ref().map_or(0.0, |m| m.score)
                );
                Enhancement {
                    record,
                    best_match,
                    enhanced: false,
                }
            }
        }
    }

    /// Match every record, preserving order
    pub fn enhance_all(&self, records: Vec<BookRecord>) -> Vec<Enhancement> {
        let start = Instant::now();
        let count = records.len();

        let enhancements: Vec<Enhancement> = records.into_iter().map(|r| self.enhance(r)).collect();

        debug!(
            "Matched {} records against {} catalog entries in {:?} ({} enhanced)",
            count,
            self.catalog.len(),
            start.elapsed(),
            enhancements.iter().filter(|e| e.enhanced).count()
        );

        enhancements
    }
}

/// Overwrite a record from a catalog entry.
///
/// - `title` always takes the entry's title
/// - `author`, `publisher`, `edition`, `category` take the entry's value only
///   when it is present
/// - `price` is left alone
/// - `confidence` becomes `max(floor, confidence)`
pub fn apply_catalog_entry(mut record: BookRecord, entry: &CatalogEntry, floor: f32) -> BookRecord {
    record.title = entry.title.clone();

    overwrite_if_present(&mut record.author, &entry.author);
    overwrite_if_present(&mut record.publisher, &entry.publisher);
    overwrite_if_present(&mut record.edition, &entry.edition);
    overwrite_if_present(&mut record.category, &entry.category);

    record.confidence = record.confidence.max(floor).clamp(0.0, 1.0);
    record.catalog_derived = true;
    record
}

fn overwrite_if_present(field: &mut Option<String>, value: &Option<String>) {
    if let Some(value) = value {
        *field = Some(value.clone());
    }
}
