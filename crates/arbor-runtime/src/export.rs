//! Edge and marker export: what a renderer needs from a run.
//!
//! Exports the edges of one trace entry whose weight exceeds a
//! visibility threshold, and one marker per node carrying its fitness
//! and log-fitness for size scaling.

use crate::trace::WeightSnapshot;
use arbor_core::fitness::FitnessField;
use arbor_core::topology::Topology;
use serde::Serialize;

/// An edge above the visibility threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibleEdge {
    /// Source layer; the target sits in `layer + 1`.
    pub layer: usize,
    pub source: usize,
    pub target: usize,
    pub slot: usize,
    pub offset: i64,
    pub weight: u64,
}

/// A node marker scaled by fitness.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeMarker {
    pub layer: usize,
    pub position: usize,
    pub fitness: f64,
    pub log_fitness: f64,
}

/// Edges of `snapshot` with weight strictly above `threshold`, strongest first.
pub fn visible_edges(topology: &Topology, snapshot: &WeightSnapshot, threshold: u64) -> Vec<VisibleEdge> {
    let mut edges = Vec::new();

    for weights in &snapshot.layers {
        let Some(table) = topology.layer(weights.layer()) else {
            continue;
        };
        for (source, row) in weights.rows().enumerate() {
            for (slot, &weight) in row.iter().enumerate() {
                if weight > threshold {
                    edges.push(VisibleEdge {
                        layer: weights.layer(),
                        source,
                        target: table.neighbor(source, slot),
                        slot,
                        offset: table.offset(slot),
                        weight,
                    });
                }
            }
        }
    }

    // Strongest first; ties keep lattice order.
    edges.sort_by(|a, b| b.weight.cmp(&a.weight));
    edges
}

/// One marker per node of every layer.
pub fn node_markers(fitness: &FitnessField) -> Vec<NodeMarker> {
    fitness
        .layers()
        .iter()
        .enumerate()
        .flat_map(|(layer, lf)| {
            lf.values()
                .iter()
                .zip(lf.log_values())
                .enumerate()
                .map(move |(position, (&fitness, &log_fitness))| NodeMarker {
                    layer,
                    position,
                    fitness,
                    log_fitness,
                })
        })
        .collect()
}

/// Summary of an edge export.
#[derive(Debug, Clone, Serialize)]
pub struct EdgeStats {
    pub total: usize,
    pub mean_weight: f64,
    pub median_weight: f64,
    pub max_weight: u64,
    pub min_weight: u64,
}

pub fn edge_stats(edges: &[VisibleEdge]) -> EdgeStats {
    if edges.is_empty() {
        return EdgeStats {
            total: 0,
            mean_weight: 0.0,
            median_weight: 0.0,
            max_weight: 0,
            min_weight: 0,
        };
    }

    let mut weights: Vec<u64> = edges.iter().map(|e| e.weight).collect();
    weights.sort_unstable();
    let total = weights.len();
    let mean_weight = weights.iter().sum::<u64>() as f64 / total as f64;
    let median_weight = weights[total / 2] as f64;

    EdgeStats {
        total,
        mean_weight,
        median_weight,
        max_weight: weights[total - 1],
        min_weight: weights[0],
    }
}
