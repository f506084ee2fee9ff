//! Text detections
//!
//! Turns raw recognizer output into positioned fragments the segmentation
//! stage can cluster. Low-confidence results and malformed polygons are
//! dropped here, before anything is clustered.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ocr::OcrResult;

/// Corners a well-formed detection polygon must have
pub const POLYGON_POINTS: usize = 4;

/// Default confidence floor; detections must score strictly above it
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.6;

/// A positioned text fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextDetection {
    /// Recognized text, never empty
    pub text: String,
    /// Recognition confidence (0.0 - 1.0)
    pub confidence: f32,
    /// Mean of the polygon's x coordinates
    pub center_x: f32,
    /// Mean of the polygon's y coordinates
    pub center_y: f32,
}

impl TextDetection {
    /// Build a detection directly from its center point
    pub fn new(text: impl Into<String>, center_x: f32, center_y: f32, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence: confidence.clamp(0.0, 1.0),
            center_x,
            center_y,
        }
    }

    /// Convert a recognizer result, returning `None` when the polygon has
    /// fewer than four points or the text is blank.
    ///
    /// Only the first four points contribute to the center.
    pub fn from_ocr(result: &OcrResult) -> Option<Self> {
        if result.polygon.len() < POLYGON_POINTS || result.text.trim().is_empty() {
            return None;
        }

        let corners = &result.polygon[..POLYGON_POINTS];
        let center_x = corners.iter().map(|p| p.0).sum::<f32>() / POLYGON_POINTS as f32;
        let center_y = corners.iter().map(|p| p.1).sum::<f32>() / POLYGON_POINTS as f32;

        Some(Self::new(result.text.clone(), center_x, center_y, result.confidence))
    }
}

/// Keep results scoring above `min_confidence` with a usable polygon.
///
/// Input order is preserved.
pub fn filter_detections(results: &[OcrResult], min_confidence: f32) -> Vec<TextDetection> {
    let mut low_confidence = 0usize;
    let mut malformed = 0usize;

    let detections: Vec<TextDetection> = results
        .iter()
        .filter(|r| {
            let keep = r.confidence > min_confidence;
            if !keep {
                low_confidence += 1;
            }
            keep
        })
        .filter_map(|r| {
            let detection = TextDetection::from_ocr(r);
            if detection.is_none() {
                malformed += 1;
            }
            detection
        })
        .collect();

    debug!(
        "Kept {} of {} detections ({} below confidence {}, {} malformed)",
        detections.len(),
        results.len(),
        low_confidence,
        min_confidence,
        malformed
    );

    detections
}
