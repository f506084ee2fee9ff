//! Reading order within a cluster

use super::{Axis, Cluster};

/// Separator between fragments of one book
pub const LINE_SEPARATOR: &str = "\n";

/// Sort the cluster's members along `reading_axis` (stable) and join their
/// text one fragment per line.
pub fn sequence_cluster(cluster: &Cluster, reading_axis: Axis) -> String {
    let mut ordered: Vec<_> = cluster.members.iter().collect();
    ordered.sort_by(|a, b| reading_axis.coord(a).total_cmp(&reading_axis.coord(b)));

    ordered
        .iter()
        .map(|d| d.text.as_str())
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR)
}

/// Text block for every cluster, in cluster order
pub fn sequence_clusters(clusters: &[Cluster], reading_axis: Axis) -> Vec<String> {
    clusters
        .iter()
        .map(|c| sequence_cluster(c, reading_axis))
        .collect()
}
