//! Simulation: the round-based reinforcement loop.
//!
//! A simulation owns the lattice topology, the fitness field, the weight
//! store and the random stream. The stream is seeded once and drawn in a
//! fixed order: fitness first (layer-major), then rounds, layers and
//! nodes in order. That order is what makes a seed reproduce a run.
//!
//! Each round:
//! 1. Every layer with outgoing edges runs selection against the
//!    weights as they stood at the start of the round
//! 2. One increment per layer is built from the chosen slots
//! 3. All increments are applied
//! 4. A deep copy of the new state is appended to the trace
//!
//! Any error inside a round aborts the run; [`simulate`] never returns a
//! partial trace.

use crate::trace::Trace;
use arbor_core::error::{ArborError, Result, StateError};
use arbor_core::fitness::{sample_fitness, FitnessField};
use arbor_core::rng::{seeded, SimRng};
use arbor_core::selection::select;
use arbor_core::topology::{build_neighbors, Topology};
use arbor_core::types::{Round, SimulationParams};
use arbor_core::weights::{LayerIncrement, WeightStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// What happened in one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    pub round: Round,
    /// Nodes that fired (one per source node).
    pub reinforced: usize,
    /// Largest weight after the round.
    pub max_weight: u64,
}

/// The complete result of a run: fitness and the weight trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub params: SimulationParams,
    pub fitness: FitnessField,
    pub trace: Trace,
}

impl SimulationOutput {
    /// Rebuild the neighbor map the run used.
    pub fn topology(&self) -> Result<Topology> {
        build_neighbors(self.params.a, self.params.horizontal_range, self.params.layers)
    }

    /// Check that parameters, fitness and every trace entry agree.
    ///
    /// Outputs built by [`Simulation`] always pass. Outputs read back from
    /// disk may not.
    pub fn validate(&self) -> Result<()> {
        let params = &self.params;
        params.validate()?;
        let topology = self.topology()?;
        let range = params.horizontal_range;

        if self.fitness.layer_count() != params.layers {
            return Err(ArborError::Serialization(format!(
                "fitness has {} layers, parameters say {}",
                self.fitness.layer_count(),
                params.layers
            )));
        }
        for (h, layer) in self.fitness.layers().iter().enumerate() {
            if layer.len() != range || layer.log_values().len() != range {
                return Err(StateError::ShapeMismatch {
                    layer: h,
                    expected: (range, 1),
                    found: (layer.len(), 1),
                }
                .into());
            }
        }

        if self.trace.rounds() != params.rounds {
            return Err(ArborError::Serialization(format!(
                "trace holds {} rounds, parameters say {}",
                self.trace.rounds(),
                params.rounds
            )));
        }
        for (t, snapshot) in self.trace.iter().enumerate() {
            if snapshot.round != t as Round {
                return Err(ArborError::Serialization(format!(
                    "trace entry {} is labelled round {}",
                    t, snapshot.round
                )));
            }
            if snapshot.layers.len() != params.source_layers() {
                return Err(ArborError::Serialization(format!(
                    "round {} holds {} weight layers, expected {}",
                    t,
                    snapshot.layers.len(),
                    params.source_layers()
                )));
            }
            for (h, weights) in snapshot.layers.iter().enumerate() {
                let table = topology.layer(h).ok_or(StateError::MissingLayer(h))?;
                if weights.layer() != h || weights.shape() != table.shape() {
                    return Err(StateError::ShapeMismatch {
                        layer: h,
                        expected: table.shape(),
                        found: weights.shape(),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }
}

/// A running simulation.
pub struct Simulation {
    params: SimulationParams,
    topology: Topology,
    fitness: FitnessField,
    weights: WeightStore,
    rng: SimRng,
    round: Round,
    trace: Trace,
}

impl Simulation {
    /// Validate parameters, build the lattice and draw fitness.
    pub fn new(params: SimulationParams) -> Result<Self> {
        params.validate()?;

        let topology = build_neighbors(params.a, params.horizontal_range, params.layers)?;
        let mut rng = seeded(params.seed);
        let fitness = sample_fitness(params.horizontal_range, params.layers, params.gamma, &mut rng)?;
        let weights = WeightStore::new(&topology);
        let trace = Trace::new(weights.snapshot());

        info!(
            a = params.a,
            beta = params.beta,
            gamma = params.gamma,
            horizontal_range = params.horizontal_range,
            layers = params.layers,
            seed = params.seed,
            slots = ?topology.slot_counts(),
            "simulation initialized"
        );

        Ok(Self {
            params,
            topology,
            fitness,
            weights,
            rng,
            round: 0,
            trace,
        })
    }

    /// Like [`Simulation::new`] but with a given fitness field instead of a drawn one.
    ///
    /// The random stream is still seeded from `params.seed` and is used
    /// for selection only.
    pub fn with_fitness(params: SimulationParams, fitness: FitnessField) -> Result<Self> {
        params.validate()?;

        let topology = build_neighbors(params.a, params.horizontal_range, params.layers)?;
        for h in 0..params.layers {
            let found = fitness.layer(h).map(|l| l.len()).unwrap_or(0);
            if found != params.horizontal_range {
                return Err(StateError::ShapeMismatch {
                    layer: h,
                    expected: (params.horizontal_range, 1),
                    found: (found, 1),
                }
                .into());
            }
        }
        if fitness.layer_count() != params.layers {
            return Err(StateError::ShapeMismatch {
                layer: params.layers,
                expected: (params.layers, params.horizontal_range),
                found: (fitness.layer_count(), params.horizontal_range),
            }
            .into());
        }
        let weights = WeightStore::new(&topology);
        let trace = Trace::new(weights.snapshot());

        Ok(Self {
            rng: seeded(params.seed),
            params,
            topology,
            fitness,
            weights,
            round: 0,
            trace,
        })
    }

    /// Run one round.
    pub fn step(&mut self) -> Result<RoundSummary> {
        let next = self.round + 1;

        // Selection for every layer reads the pre-round weights.
        let mut increments = Vec::with_capacity(self.weights.len());
        for (h, layer_weights) in self.weights.layers().iter().enumerate() {
            let (neighbors, fitness) = match (self.topology.layer(h), self.fitness.layer(h)) {
                (Some(n), Some(f)) => (n, f),
                _ => return Err(StateError::MissingLayer(h).into()),
            };
            let choices = select(layer_weights, fitness, neighbors, self.params.beta, &mut self.rng)
                .map_err(|e| e.at_round(next))?;
            increments.push(LayerIncrement::from_choices(h, neighbors.slot_count(), &choices)?);
        }

        for inc in &increments {
            self.weights.apply(inc)?;
        }

        self.round = next;
        self.trace.push(next, self.weights.snapshot());

        let summary = RoundSummary {
            round: next,
            reinforced: increments.iter().map(LayerIncrement::count).sum(),
            max_weight: self
                .weights
                .layers()
                .iter()
                .flat_map(|l| l.as_slice().iter().copied())
                .max()
                .unwrap_or(0),
        };
        debug!(
            round = summary.round,
            reinforced = summary.reinforced,
            max_weight = summary.max_weight,
            "round complete"
        );
        Ok(summary)
    }

    /// Run `rounds` rounds.
    pub fn run(&mut self, rounds: u64) -> Result<Vec<RoundSummary>> {
        let mut summaries = Vec::new();
        self.run_with(rounds, |s| summaries.push(s.clone()))?;
        Ok(summaries)
    }

    /// Run `rounds` rounds, calling `on_round` after each.
    pub fn run_with<F>(&mut self, rounds: u64, mut on_round: F) -> Result<()>
    where
        F: FnMut(&RoundSummary),
    {
        for _ in 0..rounds {
            let summary = self.step()?;
            on_round(&summary);
        }
        Ok(())
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn round(&self) -> Round {
        self.round
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn fitness(&self) -> &FitnessField {
        &self.fitness
    }

    pub fn weights(&self) -> &WeightStore {
        &self.weights
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Finish the run. `params.rounds` is set to the rounds actually run.
    pub fn into_output(self) -> SimulationOutput {
        let mut params = self.params;
        params.rounds = self.round;
        SimulationOutput {
            params,
            fitness: self.fitness,
            trace: self.trace,
        }
    }
}

/// Run a full simulation: `params.rounds` rounds after the initial state.
pub fn simulate(params: &SimulationParams) -> Result<SimulationOutput> {
    let mut sim = Simulation::new(params.clone())?;
    sim.run_with(params.rounds, |_| {})?;
    info!(rounds = sim.round(), "simulation finished");
    Ok(sim.into_output())
}
