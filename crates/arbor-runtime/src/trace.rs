//! Trace: the ordered history of weight snapshots.
//!
//! Entry `t` holds the full weight state after round `t`; entry 0 is the
//! initial all-ones state. Every entry owns its arrays, so later rounds
//! can never rewrite history.

use arbor_core::types::Round;
use arbor_core::weights::LayerWeights;
use serde::{Deserialize, Serialize};

/// Full weight state at the end of one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightSnapshot {
    pub round: Round,
    pub layers: Vec<LayerWeights>,
}

impl WeightSnapshot {
    pub fn layer(&self, h: usize) -> Option<&LayerWeights> {
        self.layers.get(h)
    }

    /// Largest weight across all layers.
    pub fn max_weight(&self) -> u64 {
        self.layers
            .iter()
            .flat_map(|l| l.as_slice().iter().copied())
            .max()
            .unwrap_or(0)
    }
}

/// All snapshots of a run, round 0 first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    entries: Vec<WeightSnapshot>,
}

impl Trace {
    /// Start a trace from the initial state.
    pub fn new(initial: Vec<LayerWeights>) -> Self {
        Self {
            entries: vec![WeightSnapshot {
                round: 0,
                layers: initial,
            }],
        }
    }

    pub(crate) fn push(&mut self, round: Round, layers: Vec<LayerWeights>) {
        self.entries.push(WeightSnapshot { round, layers });
    }

    /// Number of entries (rounds + 1).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of completed rounds.
    pub fn rounds(&self) -> Round {
        self.entries.len().saturating_sub(1) as Round
    }

    pub fn get(&self, round: Round) -> Option<&WeightSnapshot> {
        self.entries.get(round as usize)
    }

    pub fn initial(&self) -> Option<&WeightSnapshot> {
        self.entries.first()
    }

    pub fn last(&self) -> Option<&WeightSnapshot> {
        self.entries.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WeightSnapshot> {
        self.entries.iter()
    }

    /// Per-layer weight change from round `round - 1` to `round`.
    pub fn delta(&self, round: Round) -> Option<Vec<Vec<u64>>> {
        if round == 0 {
            return None;
        }
        let prev = self.get(round - 1)?;
        let next = self.get(round)?;
        Some(
            prev.layers
                .iter()
                .zip(&next.layers)
                .map(|(a, b)| {
                    a.as_slice()
                        .iter()
                        .zip(b.as_slice())
                        .map(|(x, y)| y.saturating_sub(*x))
                        .collect()
                })
                .collect(),
        )
    }
}
