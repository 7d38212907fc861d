//! Arbor Core Prelude - convenient imports for common usage.
//!
//! ```rust
//! use arbor_core::prelude::*;
//! ```

pub use crate::types::{Round, SimulationParams};

pub use crate::topology::{build_neighbors, scope_radius, NeighborTable, Topology, MAX_LATTICE_CELLS};

pub use crate::fitness::{
    empirical_survival, hill_tail_index, sample_fitness, FitnessField, LayerFitness,
};

pub use crate::weights::{LayerIncrement, LayerWeights, WeightStore};

pub use crate::selection::{select, selection_probabilities, CategoricalRows};

pub use crate::rng::{seeded, SimRng};

pub use crate::error::{ArborError, ParameterError, Result, StateError};
