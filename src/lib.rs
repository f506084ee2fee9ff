//! shelfscan - book spine OCR segmentation and catalog correction
//!
//! Takes the raw output of a text recognizer for a photo of several book
//! spines, regroups the fragments into one text block per book, and corrects
//! the records an extractor derives from that text against previously
//! accepted books.

pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod segmentation;
pub mod storage;
pub mod vision;

pub use catalog::{BookRecord, CatalogEntry, CatalogMatcher, Enhancement};
pub use config::AppConfig;
pub use error::{Result, ShelfError};
pub use pipeline::{BookScanner, ScanReport};
pub use segmentation::{segment_detections, segment_ocr_results, Axis, Orientation, Segmentation};
pub use vision::{OcrResult, RecognizerHandle, TextDetection, TextRecognizer};
