//! Selection engine: which neighbor each node reinforces this round.
//!
//! For node `k` the score of slot `j` is `w[k,j]^beta * f[n(k,j)]`,
//! where `n(k,j)` is the destination column and `f` the fitness array of
//! the layer. Scores are built in log space, shifted by the row maximum
//! and exponentiated, so large weights or extreme fitness never overflow.
//! Each row is then sampled independently.

use crate::error::{ArborError, Result, StateError};
use crate::fitness::LayerFitness;
use crate::topology::NeighborTable;
use crate::weights::LayerWeights;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// A batch of categorical distributions, one per row, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalRows {
    layer: usize,
    cols: usize,
    probs: Vec<f64>,
}

impl CategoricalRows {
    /// Wrap normalized rows. Each row must sum to a positive finite value.
    pub fn new(layer: usize, cols: usize, probs: Vec<f64>) -> Result<Self> {
        if cols == 0 || probs.len() % cols != 0 {
            return Err(StateError::ShapeMismatch {
                layer,
                expected: (probs.len() / cols.max(1), cols),
                found: (probs.len(), 1),
            }
            .into());
        }
        Ok(Self { layer, cols, probs })
    }

    pub fn rows(&self) -> usize {
        self.probs.len() / self.cols
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.probs[i * self.cols..(i + 1) * self.cols]
    }

    /// Draw one column index per row, rows in order.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<usize>> {
        self.probs
            .chunks(self.cols)
            .enumerate()
            .map(|(node, row)| -> Result<usize> {
                let sampler = WeightedIndex::new(row).map_err(|_| {
                    ArborError::from(StateError::DegenerateDistribution {
                        layer: self.layer,
                        node,
                        round: None,
                        sum: row.iter().sum(),
                    })
                })?;
                Ok(sampler.sample(rng))
            })
            .collect()
    }
}

/// Normalized selection probabilities for every node of a layer.
pub fn selection_probabilities(
    weights: &LayerWeights,
    fitness: &LayerFitness,
    neighbors: &NeighborTable,
    beta: f64,
) -> Result<CategoricalRows> {
    let layer = weights.layer();
    if weights.shape() != neighbors.shape() {
        return Err(StateError::ShapeMismatch {
            layer,
            expected: neighbors.shape(),
            found: weights.shape(),
        }
        .into());
    }
    if fitness.len() != neighbors.horizontal_range() {
        return Err(StateError::ShapeMismatch {
            layer,
            expected: (neighbors.horizontal_range(), 1),
            found: (fitness.len(), 1),
        }
        .into());
    }

    let (rows, cols) = neighbors.shape();
    let log_fitness = fitness.log_values();
    let mut probs = Vec::with_capacity(rows * cols);
    let mut scores = vec![0.0f64; cols];

    for (node, destinations) in neighbors.rows() {
        let w = weights.row(node);
        for slot in 0..cols {
            scores[slot] = beta * (w[slot] as f64).ln() + log_fitness[destinations[slot]];
        }

        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mut sum = 0.0;
        for s in scores.iter_mut() {
            *s = (*s - max).exp();
            sum += *s;
        }
        if !max.is_finite() || !sum.is_finite() || sum <= 0.0 {
            return Err(StateError::DegenerateDistribution {
                layer,
                node,
                round: None,
                sum,
            }
            .into());
        }

        probs.extend(scores.iter().map(|s| s / sum));
    }

    CategoricalRows::new(layer, cols, probs)
}

/// Choose one slot per node of the layer.
pub fn select<R: Rng + ?Sized>(
    weights: &LayerWeights,
    fitness: &LayerFitness,
    neighbors: &NeighborTable,
    beta: f64,
    rng: &mut R,
) -> Result<Vec<usize>> {
    selection_probabilities(weights, fitness, neighbors, beta)?.sample(rng)
}
