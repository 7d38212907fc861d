//! # Arbor
//!
//! Reinforced preferential attachment on a layered lattice.
//!
//! Arbor models activity-driven growth of synaptic weights. Nodes sit on
//! `L` layers of `R` columns (the columns wrap around). Every round, each
//! node outside the last layer picks one edge into the next layer with
//! probability proportional to `weight^beta * fitness`, and that edge's
//! weight grows by one. Fitness is heavy-tailed and fixed per node.
//!
//! ## Quick Start
//!
//! ```rust
//! use arbor::prelude::*;
//!
//! let params = SimulationParams {
//!     a: 2.0,
//!     beta: 1.0,
//!     gamma: 0.5,
//!     horizontal_range: 16,
//!     layers: 3,
//!     rounds: 20,
//!     seed: 7,
//! };
//!
//! let output = simulate(&params).unwrap();
//! assert_eq!(output.trace.len(), 21);
//!
//! // Edges reinforced at least twice in the final state
//! let topology = output.topology().unwrap();
//! let edges = visible_edges(&topology, output.trace.last().unwrap(), 2);
//! for e in edges.iter().take(3) {
//!     println!("L{} {} -> {} (weight {})", e.layer, e.source, e.target, e.weight);
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`arbor_core`] - Lattice topology, fitness, weights, selection, errors
//! - [`arbor_runtime`] - Simulation driver, trace, metrics, exports, run files
//!
//! ## Key Concepts
//!
//! | Term | Meaning |
//! |------|---------|
//! | Scope | Layer `h` reaches `ceil(a^h)` columns each way in layer `h + 1` |
//! | Fitness | Pareto draw `U^(-1/gamma)` per node, fixed for the run |
//! | Weight | Integer per edge, starts at 1, +1 when selected |
//! | Round | Every source node selects once against the pre-round weights |
//! | Trace | Deep snapshot of all weights after every round |
//!
//! ### Reproducibility
//!
//! A run draws from one ChaCha12 stream seeded by `seed`: fitness first,
//! then selections in round, layer, node order. Equal parameters give
//! bit-identical fitness and traces.
//!
//! ## Run Files
//!
//! ```rust,ignore
//! use arbor::prelude::*;
//! use std::path::Path;
//!
//! let output = simulate(&SimulationParams::default()).unwrap();
//! save_run(&output, Path::new("run.json")).unwrap();
//! let loaded = load_run(Path::new("run.json")).unwrap();
//! ```

// Re-export all subcrates
pub use arbor_core as core;
pub use arbor_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust
/// use arbor::prelude::*;
/// ```
pub mod prelude {
    pub use arbor_runtime::prelude::*;
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
