//! OCR (Optical Character Recognition) boundary
//!
//! The recognizer itself is an external engine. This module defines the shape
//! of its output and the trait a backend implements to plug into the scanner.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, ShelfError};

/// Single OCR detection result as reported by the recognizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    /// Recognized text
    pub text: String,
    /// Bounding polygon points, normally four corners
    pub polygon: Vec<(f32, f32)>,
    /// Recognition confidence (0.0 - 1.0)
    pub confidence: f32,
}

impl OcrResult {
    pub fn new(text: impl Into<String>, polygon: Vec<(f32, f32)>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            polygon,
            confidence,
        }
    }
}

/// A text recognition backend.
///
/// Backends are usually expensive to construct and hold large models, so the
/// scanner owns one instance through a [`super::RecognizerHandle`] and calls it
/// serially.
pub trait TextRecognizer: Send + 'static {
    /// Run recognition on the image at `image`
    fn recognize(&mut self, image: &Path) -> Result<Vec<OcrResult>>;
}

/// Recognizer that replays OCR output previously saved as JSON.
///
/// By default the results for `photo.jpg` are read from `photo.jpg.ocr.json`.
#[derive(Debug, Clone, Default)]
pub struct JsonFileRecognizer {
    /// Explicit results file, overriding the sidecar lookup
    results_path: Option<PathBuf>,
}

impl JsonFileRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always read results from `path`, whatever image is requested
    pub fn with_results_file(path: impl Into<PathBuf>) -> Self {
        Self {
            results_path: Some(path.into()),
        }
    }

    fn sidecar_path(image: &Path) -> PathBuf {
        let mut name = image.as_os_str().to_os_string();
        name.push(".ocr.json");
        PathBuf::from(name)
    }
}

impl TextRecognizer for JsonFileRecognizer {
    fn recognize(&mut self, image: &Path) -> Result<Vec<OcrResult>> {
        if !image.exists() {
            return Err(ShelfError::ImageNotFound(image.to_path_buf()));
        }

        let path = self
            .results_path
            .clone()
            .unwrap_or_else(|| Self::sidecar_path(image));
        debug!("Replaying OCR results from {:?}", path);

        load_ocr_results(&path)
    }
}

/// Load recognizer output from a JSON file
pub fn load_ocr_results(path: &Path) -> Result<Vec<OcrResult>> {
    let content = std::fs::read_to_string(path)?;
    let results: Vec<OcrResult> = serde_json::from_str(&content)?;
    Ok(results)
}
