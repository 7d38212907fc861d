//! Quantitative metrics over a finished run.
//!
//! Per layer:
//! - total increments and the conservation check (one per node per round)
//! - weight concentration (Gini coefficient of the final weights)
//! - dominance: how much of a node's reinforcement went to its strongest slot
//! - visible edges above the export threshold

use crate::simulation::SimulationOutput;
use crate::trace::{Trace, WeightSnapshot};
use arbor_core::weights::LayerWeights;
use serde::Serialize;

/// Metrics of one layer at the end of a run.
#[derive(Debug, Clone, Serialize)]
pub struct LayerMetrics {
    pub layer: usize,
    pub slots: usize,
    /// Sum of `W - 1` over the layer.
    pub total_increments: u64,
    pub max_weight: u64,
    pub mean_weight: f64,
    /// Gini coefficient of the final weights (0 = uniform).
    pub gini: f64,
    /// Mean over nodes of `(max_j W - 1) / sum_j (W - 1)`; 0 before any round.
    pub dominant_share: f64,
    /// Edges with weight above the threshold.
    pub visible_edges: usize,
}

/// Metrics of a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct RunMetrics {
    pub rounds: u64,
    pub threshold: u64,
    pub conservation_holds: bool,
    pub layers: Vec<LayerMetrics>,
}

impl RunMetrics {
    /// Compute metrics from the last trace entry.
    pub fn compute(output: &SimulationOutput, threshold: u64) -> Self {
        let layers = output
            .trace
            .last()
            .map(|snap| snap.layers.iter().map(|l| layer_metrics(l, threshold)).collect())
            .unwrap_or_default();

        Self {
            rounds: output.trace.rounds(),
            threshold,
            conservation_holds: conservation_holds(&output.trace),
            layers,
        }
    }
}

fn layer_metrics(weights: &LayerWeights, threshold: u64) -> LayerMetrics {
    let (rows, slots) = weights.shape();
    let values = weights.as_slice();
    let total_increments = values.iter().map(|w| w - 1).sum();
    let max_weight = values.iter().copied().max().unwrap_or(0);
    let mean_weight = if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<u64>() as f64 / values.len() as f64
    };

    let dominant_share = if rows == 0 {
        0.0
    } else {
        weights
            .rows()
            .map(|row| {
                let increments: u64 = row.iter().map(|w| w - 1).sum();
                if increments == 0 {
                    0.0
                } else {
                    let best = row.iter().copied().max().unwrap_or(1) - 1;
                    best as f64 / increments as f64
                }
            })
            .sum::<f64>()
            / rows as f64
    };

    LayerMetrics {
        layer: weights.layer(),
        slots,
        total_increments,
        max_weight,
        mean_weight,
        gini: gini(values),
        dominant_share,
        visible_edges: values.iter().filter(|&&w| w > threshold).count(),
    }
}

/// Every node gained exactly one increment per round, and nothing decreased.
pub fn conservation_holds(trace: &Trace) -> bool {
    let Some(initial) = trace.initial() else {
        return false;
    };
    let rounds = trace.rounds();

    let initial_ok = initial
        .layers
        .iter()
        .all(|l| l.as_slice().iter().all(|&w| w == 1));

    let rows_ok = trace.last().is_some_and(|last| {
        last.layers.iter().all(|l| {
            l.rows()
                .all(|row| row.iter().map(|w| w.saturating_sub(1)).sum::<u64>() == rounds)
        })
    });

    let entries: Vec<&WeightSnapshot> = trace.iter().collect();
    let steps_ok = entries.windows(2).all(|pair| {
        pair[0].layers.iter().zip(&pair[1].layers).all(|(before, after)| {
            before.rows().zip(after.rows()).all(|(b, a)| {
                let mut gained = 0;
                for (x, y) in b.iter().zip(a) {
                    if y < x || y - x > 1 {
                        return false;
                    }
                    gained += y - x;
                }
                gained == 1
            })
        })
    });

    initial_ok && rows_ok && steps_ok
}

/// Gini coefficient of non-negative values (0 = equal, toward 1 = concentrated).
pub fn gini(values: &[u64]) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    let total: u64 = values.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, &v)| (2.0 * (i as f64 + 1.0) - n as f64 - 1.0) * v as f64)
        .sum();
    weighted / (n as f64 * total as f64)
}
