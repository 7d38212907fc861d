//! Shared types used across the Arbor crates.

use crate::error::{ParameterError, Result};
use serde::{Deserialize, Serialize};

/// Monotonic round counter. Round 0 is the initial state.
pub type Round = u64;

/// Every input to a simulation run.
///
/// Two runs with equal parameters produce identical outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Scope growth parameter (`a > 1`). Layer `h` reaches `ceil(a^h)` columns each way.
    pub a: f64,
    /// Reinforcement exponent applied to weights in the selection score.
    pub beta: f64,
    /// Tail index of the fitness law. Values below 1 give the heavy-tailed regime.
    pub gamma: f64,
    /// Number of columns per layer. The horizontal dimension wraps.
    pub horizontal_range: usize,
    /// Number of layers. The last layer has no outgoing edges.
    pub layers: usize,
    /// Number of rounds to run after the initial state.
    pub rounds: u64,
    /// Seed for the single random stream of the run.
    pub seed: u64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            a: 2.0,
            beta: 1.0,
            gamma: 0.5,
            horizontal_range: 32,
            layers: 4,
            rounds: 100,
            seed: 0,
        }
    }
}

impl SimulationParams {
    /// Minimum number of layers a run needs (one source, one destination).
    pub const MIN_LAYERS: usize = 2;

    /// Check every field against its domain.
    pub fn validate(&self) -> Result<()> {
        validate_scope(self.a)?;
        if !self.beta.is_finite() {
            return Err(ParameterError::Reinforcement(self.beta).into());
        }
        validate_tail_index(self.gamma)?;
        validate_range(self.horizontal_range)?;
        if self.layers < Self::MIN_LAYERS {
            return Err(ParameterError::Layers {
                found: self.layers,
                min: Self::MIN_LAYERS,
            }
            .into());
        }
        Ok(())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_rounds(mut self, rounds: u64) -> Self {
        self.rounds = rounds;
        self
    }

    /// Number of layers that own a weight array.
    pub fn source_layers(&self) -> usize {
        self.layers.saturating_sub(1)
    }
}

pub(crate) fn validate_scope(a: f64) -> Result<()> {
    if !a.is_finite() || a <= 1.0 {
        return Err(ParameterError::Scope(a).into());
    }
    Ok(())
}

pub(crate) fn validate_tail_index(gamma: f64) -> Result<()> {
    if !gamma.is_finite() || gamma <= 0.0 {
        return Err(ParameterError::TailIndex(gamma).into());
    }
    Ok(())
}

pub(crate) fn validate_range(horizontal_range: usize) -> Result<()> {
    if horizontal_range < 1 {
        return Err(ParameterError::HorizontalRange(horizontal_range).into());
    }
    Ok(())
}
