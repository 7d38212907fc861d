//! Arbor Runtime Prelude - convenient imports for common usage.
//!
//! ```rust
//! use arbor_runtime::prelude::*;
//! ```

// Re-export the driver
pub use crate::simulation::{simulate, RoundSummary, Simulation, SimulationOutput};

// Re-export the trace
pub use crate::trace::{Trace, WeightSnapshot};

// Re-export metrics
pub use crate::metrics::{conservation_holds, gini, LayerMetrics, RunMetrics};

// Re-export renderer-facing exports
pub use crate::export::{edge_stats, node_markers, visible_edges, EdgeStats, NodeMarker, VisibleEdge};

// Re-export run files
pub use crate::run_file::{load_run, save_run, RunFile, RunMetadata};

// Re-export from core
pub use arbor_core::prelude::*;
