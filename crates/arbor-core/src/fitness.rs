//! Fitness: fixed heavy-tailed values biasing destination choice.
//!
//! Each (layer, position) gets an independent Pareto draw with tail
//! index `gamma`: `U^(-1/gamma)` for `U` uniform on the open interval
//! `(0, 1)`, so `P[X >= x] = x^(-gamma)` for `x >= 1`.
//!
//! The log value `-ln(U) / gamma` is kept alongside the raw value. It is
//! always finite, which the selection engine relies on; the raw value
//! saturates at `f64::MAX` for extreme draws.

use crate::error::{ParameterError, Result};
use crate::types::{validate_range, validate_tail_index};
use rand::distributions::Open01;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Fitness values for one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerFitness {
    values: Vec<f64>,
    log_values: Vec<f64>,
}

impl LayerFitness {
    /// Build from raw values. Every value must be positive.
    pub fn from_values(values: Vec<f64>) -> Self {
        let log_values = values.iter().map(|v| v.ln()).collect();
        Self { values, log_values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn log_values(&self) -> &[f64] {
        &self.log_values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Fitness for every layer, shape `(layers, horizontal_range)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessField {
    gamma: f64,
    layers: Vec<LayerFitness>,
}

impl FitnessField {
    /// Assemble a field from explicit per-layer values (e.g. a fixed test fixture).
    pub fn from_layers(gamma: f64, layers: Vec<LayerFitness>) -> Self {
        Self { gamma, layers }
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn layer(&self, h: usize) -> Option<&LayerFitness> {
        self.layers.get(h)
    }

    pub fn layers(&self) -> &[LayerFitness] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// All raw values, layer-major.
    pub fn all_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.layers.iter().flat_map(|l| l.values.iter().copied())
    }
}

/// Draw `horizontal_range` fitness values for each of `layers` layers.
///
/// Consumes exactly `layers * horizontal_range` uniforms from `rng`,
/// layer by layer, position by position.
pub fn sample_fitness<R: Rng + ?Sized>(
    horizontal_range: usize,
    layers: usize,
    gamma: f64,
    rng: &mut R,
) -> Result<FitnessField> {
    validate_tail_index(gamma)?;
    validate_range(horizontal_range)?;
    if layers < 1 {
        return Err(ParameterError::Layers { found: layers, min: 1 }.into());
    }

    let layers = (0..layers)
        .map(|_| {
            let mut values = Vec::with_capacity(horizontal_range);
            let mut log_values = Vec::with_capacity(horizontal_range);
            for _ in 0..horizontal_range {
                let u: f64 = rng.sample(Open01);
                let log_value = -u.ln() / gamma;
                let value = log_value.exp();
                values.push(if value.is_finite() { value } else { f64::MAX });
                log_values.push(log_value);
            }
            LayerFitness { values, log_values }
        })
        .collect();

    Ok(FitnessField { gamma, layers })
}

/// Empirical survival function: sorted `(x, P[X >= x])` pairs.
pub fn empirical_survival(values: &[f64]) -> Vec<(f64, f64)> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len() as f64;
    sorted
        .iter()
        .enumerate()
        .map(|(i, &x)| (x, (n - i as f64) / n))
        .collect()
}

/// Hill estimate of the tail index from the `k` largest values.
///
/// Returns `None` when fewer than `k + 1` positive values are available.
pub fn hill_tail_index(values: &[f64], k: usize) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| *v > 0.0).collect();
    if k == 0 || sorted.len() <= k {
        return None;
    }
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    let threshold = sorted[k].ln();
    let mean_excess = sorted[..k].iter().map(|x| x.ln() - threshold).sum::<f64>() / k as f64;
    if mean_excess > 0.0 {
        Some(1.0 / mean_excess)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    #[test]
    fn shape_matches_request() {
        let field = sample_fitness(7, 3, 0.5, &mut seeded(1)).unwrap();
        assert_eq!(field.layer_count(), 3);
        assert!(field.layers().iter().all(|l| l.len() == 7));
        assert_eq!(field.gamma(), 0.5);
    }

    #[test]
    fn values_are_at_least_one() {
        let field = sample_fitness(100, 4, 0.8, &mut seeded(3)).unwrap();
        for layer in field.layers() {
            assert!(layer.values().iter().all(|&v| v >= 1.0));
            assert!(layer.log_values().iter().all(|&l| l.is_finite() && l >= 0.0));
        }
    }

    #[test]
    fn log_values_match_values() {
        let field = sample_fitness(50, 2, 0.9, &mut seeded(5)).unwrap();
        for layer in field.layers() {
            for (v, l) in layer.values().iter().zip(layer.log_values()) {
                assert!((v.ln() - l).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn reproducible_for_a_seed() {
        let a = sample_fitness(20, 2, 0.5, &mut seeded(42)).unwrap();
        let b = sample_fitness(20, 2, 0.5, &mut seeded(42)).unwrap();
        let c = sample_fitness(20, 2, 0.5, &mut seeded(43)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn survival_follows_power_law() {
        let gamma = 0.7;
        let field = sample_fitness(20_000, 1, gamma, &mut seeded(2024)).unwrap();
        let values = field.layer(0).unwrap().values();

        let hill = hill_tail_index(values, 2_000).unwrap();
        assert!((hill - gamma).abs() < 0.1, "Hill estimate {} vs gamma {}", hill, gamma);

        let survival = empirical_survival(values);
        let at_ten = survival
            .iter()
            .find(|(x, _)| *x >= 10.0)
            .map(|(_, s)| *s)
            .unwrap();
        let expected = 10f64.powf(-gamma);
        assert!(
            (at_ten - expected).abs() < 0.02,
            "P[X >= 10] = {} vs {}",
            at_ten,
            expected
        );
    }

    #[test]
    fn extreme_draws_saturate() {
        let field = sample_fitness(500, 1, 0.01, &mut seeded(9)).unwrap();
        let layer = field.layer(0).unwrap();
        assert!(layer.values().iter().all(|v| v.is_finite()));
        assert!(layer.log_values().iter().all(|l| l.is_finite()));
    }

    #[test]
    fn rejects_bad_tail_index() {
        assert!(sample_fitness(4, 2, 0.0, &mut seeded(0)).unwrap_err().is_parameter());
        assert!(sample_fitness(4, 2, -0.3, &mut seeded(0)).unwrap_err().is_parameter());
        assert!(sample_fitness(4, 2, f64::NAN, &mut seeded(0)).unwrap_err().is_parameter());
        assert!(sample_fitness(0, 2, 0.5, &mut seeded(0)).unwrap_err().is_parameter());
    }

    #[test]
    fn survival_is_monotone_and_starts_at_one() {
        let s = empirical_survival(&[3.0, 1.0, 2.0, 5.0]);
        assert_eq!(s[0], (1.0, 1.0));
        assert_eq!(s[3], (5.0, 0.25));
        assert!(s.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn hill_needs_enough_values() {
        assert!(hill_tail_index(&[1.0, 2.0], 2).is_none());
        assert!(hill_tail_index(&[1.0, 2.0, 3.0], 0).is_none());
    }
}
