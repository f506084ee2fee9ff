//! Orientation detection
//!
//! Decides whether books in the photo are separated horizontally (upright
//! spines standing side by side) or vertically (spines lying in a stack) by
//! comparing how widely detection centers spread along each axis.

use serde::{Deserialize, Serialize};

use super::Axis;
use crate::vision::TextDetection;

/// Dominant arrangement of spine text in a photo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Spines stand upright: books are separated along X, text reads along Y
    #[default]
    ColumnDominant,
    /// Spines lie stacked: books are separated along Y, text reads along X
    RowDominant,
}

impl Orientation {
    /// Axis along which book boundaries are found
    pub fn cluster_axis(&self) -> Axis {
        match self {
            Orientation::ColumnDominant => Axis::X,
            Orientation::RowDominant => Axis::Y,
        }
    }

    /// Axis along which text inside one book is ordered
    pub fn reading_axis(&self) -> Axis {
        self.cluster_axis().perpendicular()
    }
}

/// Pick the orientation from the spread of detection centers.
///
/// Row-dominant only when the x spread is strictly larger than the y spread;
/// ties and inputs with fewer than two detections are column-dominant.
pub fn detect_orientation(detections: &[TextDetection]) -> Orientation {
    if detections.len() < 2 {
        return Orientation::ColumnDominant;
    }

    let spread_x = population_stdev(detections.iter().map(|d| d.center_x));
    let spread_y = population_stdev(detections.iter().map(|d| d.center_y));

    if spread_x > spread_y {
        Orientation::RowDominant
    } else {
        Orientation::ColumnDominant
    }
}

/// Population standard deviation, computed in f64
pub fn population_stdev<I>(values: I) -> f64
where
    I: IntoIterator<Item = f32>,
{
    let values: Vec<f64> = values.into_iter().map(f64::from).collect();
    if values.is_empty() {
        return 0.0;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    variance.sqrt()
}
