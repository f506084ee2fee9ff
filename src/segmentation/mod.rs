//! Spine Text Segmentation
//!
//! Regroups OCR fragments from a shelf photo into one text block per book:
//! - orientation detection picks the axis books are separated along
//! - coordinate clustering chains fragments into per-book clusters
//! - reading order sorts each cluster along the other axis
//! - serialization joins the blocks with a book separator
//!
//! Everything here is a pure function of its input.

pub mod cluster;
pub mod orientation;
pub mod reading_order;
pub mod serialize;

pub use cluster::{cluster_by_axis, Cluster, DEFAULT_GAP_THRESHOLD};
pub use orientation::{detect_orientation, population_stdev, Orientation};
pub use reading_order::{sequence_cluster, sequence_clusters};
pub use serialize::{serialize_blocks, BOOK_SEPARATOR};

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::config::SegmentationConfig;
use crate::vision::{filter_detections, OcrResult, TextDetection};

/// A spatial axis of the photo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// The detection's center coordinate on this axis
    pub fn coord(&self, detection: &TextDetection) -> f32 {
        match self {
            Axis::X => detection.center_x,
            Axis::Y => detection.center_y,
        }
    }

    pub fn perpendicular(&self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// Result of segmenting one photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segmentation {
    /// Arrangement chosen by orientation detection
    pub orientation: Orientation,
    /// Per-book clusters in ascending order along the cluster axis
    pub clusters: Vec<Cluster>,
    /// One text block per cluster
    pub blocks: Vec<String>,
    /// Blocks joined with the book separator; empty when nothing survived
    pub text: String,
}

impl Segmentation {
    /// Axis clusters were formed along
    pub fn cluster_axis(&self) -> Axis {
        self.orientation.cluster_axis()
    }

    pub fn book_count(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

/// Segment detections that have already passed the confidence filter
pub fn segment_detections(detections: &[TextDetection], config: &SegmentationConfig) -> Segmentation {
    let start = Instant::now();

    let orientation = detect_orientation(detections);
    let clusters = cluster_by_axis(detections, orientation.cluster_axis(), config.gap_threshold as f32);
    let blocks = sequence_clusters(&clusters, orientation.reading_axis());
    let text = serialize_blocks(&blocks, &config.separator);

    debug!(
        "Segmented {} detections into {} books along {} ({:?}) in {:?}",
        detections.len(),
        clusters.len(),
        orientation.cluster_axis(),
        orientation,
        start.elapsed()
    );

    Segmentation {
        orientation,
        clusters,
        blocks,
        text,
    }
}

/// Filter raw recognizer output, then segment what survives
pub fn segment_ocr_results(results: &[OcrResult], config: &SegmentationConfig) -> Segmentation {
    let detections = filter_detections(results, config.min_confidence as f32);
    segment_detections(&detections, config)
}
