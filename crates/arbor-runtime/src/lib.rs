//! # Arbor Runtime
//!
//! The simulation driver and everything that consumes its output.
//!
//! The runtime runs the round loop over a lattice built by `arbor-core`,
//! records the weight trace, and turns a finished run into metrics,
//! renderer-facing exports and run files.

pub mod export;
pub mod metrics;
pub mod prelude;
pub mod run_file;
pub mod simulation;
pub mod trace;
