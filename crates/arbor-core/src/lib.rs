//! # Arbor Core
//!
//! Core types for reinforced preferential attachment on a layered lattice.
//!
//! A lattice has `L` layers of `R` columns each; the horizontal dimension
//! wraps. Node `k` in layer `h` connects to a window of columns in layer
//! `h + 1` whose half-width grows as `ceil(a^h)`. Every edge carries an
//! integer weight that is reinforced when the edge is selected.
//!
//! - **topology** - the fixed neighbor map
//! - **fitness** - heavy-tailed per-node values biasing selection
//! - **weights** - dense per-layer weight arrays and their increments
//! - **selection** - log-space categorical choice of one slot per node
//! - **rng** - the seeded stream every run draws from
//!
//! ## Quick Start
//!
//! ```rust
//! use arbor_core::prelude::*;
//!
//! let topology = build_neighbors(2.0, 8, 3).unwrap();
//! assert_eq!(topology.slot_counts(), vec![3, 5, 9]);
//!
//! let mut rng = seeded(7);
//! let fitness = sample_fitness(8, 3, 0.5, &mut rng).unwrap();
//! let store = WeightStore::new(&topology);
//!
//! let chosen = select(
//!     store.layer(0).unwrap(),
//!     fitness.layer(0).unwrap(),
//!     topology.layer(0).unwrap(),
//!     1.0,
//!     &mut rng,
//! )
//! .unwrap();
//! assert_eq!(chosen.len(), 8);
//! ```

pub mod error;
pub mod fitness;
pub mod prelude;
pub mod rng;
pub mod selection;
pub mod topology;
pub mod types;
pub mod weights;
