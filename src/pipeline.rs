//! Scan orchestration
//!
//! Runs one shelf photo through recognition, segmentation, extraction and
//! catalog matching, then hands the corrected records back to the catalog.
//! The recognizer and catalog are external; a catalog that cannot be read
//! only disables correction, everything else propagates.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::catalog::{BookRecord, CatalogMatcher, Enhancement};
use crate::config::AppConfig;
use crate::error::Result;
use crate::extract::{build_extraction_prompt, Extractor};
use crate::segmentation::{segment_ocr_results, Orientation};
use crate::storage::{snapshot_or_empty, CatalogSource};
use crate::vision::{RecognizerHandle, TextRecognizer};

/// Result of scanning one photo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Orientation chosen for the photo
    pub orientation: Orientation,
    /// Segmented text handed to the extractor; empty when nothing was read
    pub ocr_text: String,
    /// Matched records in extractor order
    pub books: Vec<Enhancement>,
    /// Total processing time in milliseconds
    pub processing_time_ms: u64,
}

impl ScanReport {
    /// Final records, corrected where the catalog matched
    pub fn records(&self) -> Vec<BookRecord> {
        self.books.iter().map(|e| e.record.clone()).collect()
    }

    pub fn enhanced_count(&self) -> usize {
        self.books.iter().filter(|e| e.enhanced).count()
    }
}

/// Runs the full scan for a photo
pub struct BookScanner<R: TextRecognizer> {
    recognizer: RecognizerHandle<R>,
    extractor: Box<dyn Extractor>,
    catalog: Option<Box<dyn CatalogSource>>,
    config: AppConfig,
}

impl<R: TextRecognizer> BookScanner<R> {
    pub fn new(recognizer: RecognizerHandle<R>, extractor: Box<dyn Extractor>, config: AppConfig) -> Self {
        Self {
            recognizer,
            extractor,
            catalog: None,
            config,
        }
    }

    /// Use `catalog` to correct extracted records
    pub fn with_catalog(mut self, catalog: Box<dyn CatalogSource>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Scan one photo
    pub fn scan(&self, image: &Path) -> Result<ScanReport> {
        let start = Instant::now();

        let results = self.recognizer.recognize(image)?;
        let segmentation = segment_ocr_results(&results, &self.config.segmentation);

        if segmentation.is_empty() {
            info!("No usable text found in {:?}", image);
            return Ok(ScanReport {
                orientation: segmentation.orientation,
                ocr_text: String::new(),
                books: Vec::new(),
                processing_time_ms: start.elapsed().as_millis() as u64,
            });
        }

        let prompt = build_extraction_prompt(&segmentation.text, &self.config.segmentation.separator);
        let records = self.extractor.extract(&prompt)?;
        debug!(
            "Extractor returned {} records for {} books",
            records.len(),
            segmentation.book_count()
        );

        let snapshot = snapshot_or_empty(self.catalog.as_deref(), self.config.matching.catalog_limit);
        let matcher = CatalogMatcher::new(&snapshot, self.config.matching.clone());
        let books = matcher.enhance_all(records);

        let report = ScanReport {
            orientation: segmentation.orientation,
            ocr_text: segmentation.text,
            books,
            processing_time_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            "Scanned {:?}: {} books, {} corrected from catalog in {}ms",
            image,
            report.books.len(),
            report.enhanced_count(),
            report.processing_time_ms
        );

        Ok(report)
    }

    /// Store the records of `report` in the catalog.
    ///
    /// Returns how many records were written; zero when no catalog is set.
    pub fn save(&mut self, report: &ScanReport, image: &Path) -> Result<usize> {
        let Some(catalog) = self.catalog.as_mut() else {
            warn!("No catalog configured, {} books not saved", report.books.len());
            return Ok(0);
        };
        if report.books.is_empty() {
            return Ok(0);
        }

        let image_path = image.to_string_lossy();
        let saved = catalog.save_books(
            &report.records(),
            Some(&*image_path),
            Some(report.ocr_text.as_str()),
        )?;
        info!("Saved {} books from {:?}", saved, image);
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;
    use crate::config::SegmentationConfig;
    use crate::error::ShelfError;
    use crate::extract::{ExtractionPrompt, JsonResponseExtractor};
    use crate::vision::OcrResult;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    struct FixedRecognizer(Vec<OcrResult>);

    impl TextRecognizer for FixedRecognizer {
        fn recognize(&mut self, _image: &Path) -> Result<Vec<OcrResult>> {
            Ok(self.0.clone())
        }
    }

    struct CountingExtractor {
        calls: Rc<Cell<usize>>,
    }

    impl Extractor for CountingExtractor {
        fn extract(&self, _prompt: &ExtractionPrompt) -> Result<Vec<BookRecord>> {
            self.calls.set(self.calls.get() + 1);
            Ok(vec![BookRecord::new("线性代数", 0.5)])
        }
    }

    struct RecordingExtractor {
        prompts: Rc<RefCell<Vec<ExtractionPrompt>>>,
    }

    impl Extractor for RecordingExtractor {
        fn extract(&self, prompt: &ExtractionPrompt) -> Result<Vec<BookRecord>> {
            self.prompts.borrow_mut().push(prompt.clone());
            Ok(Vec::new())
        }
    }

    struct BrokenCatalog;

    fn locked() -> ShelfError {
        ShelfError::Io(std::io::Error::new(std::io::ErrorKind::Other, "database locked"))
    }

    impl CatalogSource for BrokenCatalog {
        fn recent_entries(&self, _limit: usize) -> Result<Vec<CatalogEntry>> {
            Err(locked())
        }

        fn save_books(
            &mut self,
            _records: &[BookRecord],
            _image: Option<&str>,
            _text: Option<&str>,
        ) -> Result<usize> {
            Err(locked())
        }
    }

    /// In-memory catalog, newest entries first; saved rows are shared with the test
    struct FixedCatalog {
        entries: Vec<CatalogEntry>,
        saved: Rc<RefCell<Vec<(BookRecord, Option<String>)>>>,
    }

    impl FixedCatalog {
        fn new(entries: Vec<CatalogEntry>) -> Self {
            Self {
                entries,
                saved: Rc::new(RefCell::new(Vec::new())),
            }
        }
    }

    impl CatalogSource for FixedCatalog {
        fn recent_entries(&self, limit: usize) -> Result<Vec<CatalogEntry>> {
            Ok(self.entries.iter().take(limit).cloned().collect())
        }

        fn save_books(
            &mut self,
            records: &[BookRecord],
            image: Option<&str>,
            _text: Option<&str>,
        ) -> Result<usize> {
            let mut saved = self.saved.borrow_mut();
            saved.extend(records.iter().map(|r| (r.clone(), image.map(str::to_string))));
            Ok(records.len())
        }
    }

    fn spine(text: &str, x: f32, y: f32, confidence: f32) -> OcrResult {
        OcrResult::new(
            text,
            vec![(x - 4.0, y - 10.0), (x + 4.0, y - 10.0), (x + 4.0, y + 10.0), (x - 4.0, y + 10.0)],
            confidence,
        )
    }

    #[test]
    fn test_blank_photo_skips_extraction() {
        let calls = Rc::new(Cell::new(0));
        let scanner = BookScanner::new(
            RecognizerHandle::from_engine(FixedRecognizer(vec![spine("smudge", 10.0, 10.0, 0.2)])),
            Box::new(CountingExtractor { calls: Rc::clone(&calls) }),
            AppConfig::default(),
        );

        let report = scanner.scan(Path::new("blank.jpg")).unwrap();
        assert!(report.ocr_text.is_empty());
        assert!(report.books.is_empty());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_broken_catalog_disables_correction() {
        let calls = Rc::new(Cell::new(0));
        let scanner = BookScanner::new(
            RecognizerHandle::from_engine(FixedRecognizer(vec![spine("线性代数", 300.0, 25.0, 0.9)])),
            Box::new(CountingExtractor { calls: Rc::clone(&calls) }),
            AppConfig::default(),
        )
        .with_catalog(Box::new(BrokenCatalog));

        let report = scanner.scan(Path::new("shelf.jpg")).unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(report.books.len(), 1);
        assert!(!report.books[0].enhanced);
        assert_eq!(report.records()[0], BookRecord::new("线性代数", 0.5));
    }

    #[test]
    fn test_scan_corrects_from_catalog() {
        let reply = r#"[{"title": "高等数学第7版", "confidence": 0.6}, {"title": "线性代数"}]"#;
        let catalog = FixedCatalog::new(vec![CatalogEntry {
            author: Some("同济大学数学系".to_string()),
            publisher: Some("高等教育出版社".to_string()),
            ..CatalogEntry::new("高等数学（第七版）")
        }]);

        let scanner = BookScanner::new(
            RecognizerHandle::from_engine(FixedRecognizer(vec![
                spine("高等数学", 100.0, 20.0, 0.9),
                spine("第7版", 105.0, 420.0, 0.9),
                spine("线性代数", 300.0, 25.0, 0.9),
            ])),
            Box::new(JsonResponseExtractor::new(reply, 0.5)),
            AppConfig::default(),
        )
        .with_catalog(Box::new(catalog));

        let report = scanner.scan(Path::new("shelf.jpg")).unwrap();

        assert_eq!(report.orientation, Orientation::ColumnDominant);
        assert_eq!(report.ocr_text, "高等数学\n第7版\n---BOOK_SEPARATOR---\n线性代数");
        assert_eq!(report.enhanced_count(), 1);

        let records = report.records();
        assert_eq!(records[0].title, "高等数学（第七版）");
        assert!((records[0].confidence - 0.95).abs() < 1e-6);
        assert_eq!(records[1].title, "线性代数");
    }

    #[test]
    fn test_recognizer_error_propagates() {
        struct FailingRecognizer;
        impl TextRecognizer for FailingRecognizer {
            fn recognize(&mut self, _image: &Path) -> Result<Vec<OcrResult>> {
                Err(ShelfError::Recognizer("model crashed".to_string()))
            }
        }

        let scanner = BookScanner::new(
            RecognizerHandle::from_engine(FailingRecognizer),
            Box::new(JsonResponseExtractor::new("[]", 0.5)),
            AppConfig::default(),
        );

        assert!(scanner.scan(Path::new("shelf.jpg")).is_err());
    }

    #[test]
    fn test_prompt_uses_configured_separator() {
        let prompts = Rc::new(RefCell::new(Vec::new()));
        let mut config = AppConfig::default();
        config.segmentation = SegmentationConfig {
            separator: "=====".to_string(),
            ..SegmentationConfig::default()
        };

        let scanner = BookScanner::new(
            RecognizerHandle::from_engine(FixedRecognizer(vec![
                spine("高等数学", 100.0, 20.0, 0.9),
                spine("第7版", 105.0, 420.0, 0.9),
                spine("线性代数", 300.0, 25.0, 0.9),
            ])),
            Box::new(RecordingExtractor { prompts: Rc::clone(&prompts) }),
            config,
        );

        scanner.scan(Path::new("shelf.jpg")).unwrap();

        let prompts = prompts.borrow();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].system.contains("====="));
        assert!(prompts[0].user.ends_with("高等数学\n第7版\n=====\n线性代数"));
    }

    #[test]
    fn test_save_hands_records_to_catalog() {
        let catalog = FixedCatalog::new(Vec::new());
        let saved = Rc::clone(&catalog.saved);
        let mut scanner = BookScanner::new(
            RecognizerHandle::from_engine(FixedRecognizer(vec![spine("线性代数", 300.0, 25.0, 0.9)])),
            Box::new(JsonResponseExtractor::new(r#"[{"title": "线性代数"}]"#, 0.5)),
            AppConfig::default(),
        )
        .with_catalog(Box::new(catalog));

        let report = scanner.scan(Path::new("uploads/shelf.jpg")).unwrap();
        assert_eq!(scanner.save(&report, Path::new("uploads/shelf.jpg")).unwrap(), 1);

        let saved = saved.borrow();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].0.title, "线性代数");
        assert_eq!(saved[0].1.as_deref(), Some("uploads/shelf.jpg"));
    }

    #[test]
    fn test_save_without_catalog_writes_nothing() {
        let mut scanner = BookScanner::new(
            RecognizerHandle::from_engine(FixedRecognizer(vec![spine("线性代数", 300.0, 25.0, 0.9)])),
            Box::new(JsonResponseExtractor::new(r#"[{"title": "线性代数"}]"#, 0.5)),
            AppConfig::default(),
        );

        let report = scanner.scan(Path::new("shelf.jpg")).unwrap();
        assert_eq!(scanner.save(&report, Path::new("shelf.jpg")).unwrap(), 0);
    }

    #[test]
    fn test_save_failure_propagates() {
        let mut scanner = BookScanner::new(
            RecognizerHandle::from_engine(FixedRecognizer(vec![spine("线性代数", 300.0, 25.0, 0.9)])),
            Box::new(JsonResponseExtractor::new(r#"[{"title": "线性代数"}]"#, 0.5)),
            AppConfig::default(),
        )
        .with_catalog(Box::new(BrokenCatalog));

        let report = scanner.scan(Path::new("shelf.jpg")).unwrap();
        assert!(scanner.save(&report, Path::new("shelf.jpg")).is_err());
    }
}
