//! Coordinate clustering
//!
//! Greedy single-pass chaining along one axis. Each detection is compared with
//! the detection immediately before it in sorted order, not with the start or
//! mean of its cluster, so a run of closely spaced fragments keeps growing one
//! cluster even when its ends drift far apart.

use serde::{Deserialize, Serialize};

use super::Axis;
use crate::vision::TextDetection;

/// Default gap, in pixels, below which neighbours share a cluster
pub const DEFAULT_GAP_THRESHOLD: f32 = 50.0;

/// Detections attributed to one physical book
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Members in the order they were assigned
    pub members: Vec<TextDetection>,
}

impl Cluster {
    fn starting_with(detection: TextDetection) -> Self {
        Self {
            members: vec![detection],
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// First member's coordinate on `axis`
    pub fn leading_coord(&self, axis: Axis) -> Option<f32> {
        self.members.first().map(|d| axis.coord(d))
    }
}

/// Partition detections into clusters along `axis`.
///
/// Detections are stably sorted by their `axis` coordinate; a detection joins
/// the current cluster when it lies strictly closer than `gap_threshold` to
/// the previous one. Clusters are returned in ascending coordinate order and
/// together hold every input detection exactly once.
pub fn cluster_by_axis(detections: &[TextDetection], axis: Axis, gap_threshold: f32) -> Vec<Cluster> {
    let mut sorted: Vec<TextDetection> = detections.to_vec();
    sorted.sort_by(|a, b| axis.coord(a).total_cmp(&axis.coord(b)));

    let mut sorted = sorted.into_iter();
    let Some(first) = sorted.next() else {
        return Vec::new();
    };

    let mut clusters = Vec::new();
    let mut previous = axis.coord(&first);
    let mut current = Cluster::starting_with(first);

    for detection in sorted {
        let coord = axis.coord(&detection);
        if (coord - previous).abs() < gap_threshold {
            current.members.push(detection);
        } else {
            clusters.push(std::mem::replace(&mut current, Cluster::starting_with(detection)));
        }
        previous = coord;
    }
    clusters.push(current);

    clusters
}
