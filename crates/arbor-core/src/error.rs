//! Error types for Arbor operations.
//!
//! Two families matter to a simulation run: parameter errors, raised
//! eagerly before any work starts, and state errors, raised mid-round
//! when an internal invariant breaks. State errors are fatal for the run.

use thiserror::Error;

/// Result type for Arbor operations.
pub type Result<T> = std::result::Result<T, ArborError>;

/// Errors that can occur during Arbor operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArborError {
    /// Out-of-domain configuration.
    #[error("Invalid parameter: {0}")]
    Parameter(#[from] ParameterError),

    /// Internal invariant violation during a run.
    #[error("Invalid state: {0}")]
    State(#[from] StateError),

    /// I/O errors (wrapped).
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization errors.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for ArborError {
    fn from(e: std::io::Error) -> Self {
        ArborError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for ArborError {
    fn from(e: serde_json::Error) -> Self {
        ArborError::Serialization(e.to_string())
    }
}

/// Out-of-domain configuration values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// Scope growth parameter must be finite and > 1.
    #[error("scope parameter a = {0} (must be finite and > 1)")]
    Scope(f64),

    /// Reinforcement exponent must be finite.
    #[error("reinforcement exponent beta = {0} (must be finite)")]
    Reinforcement(f64),

    /// Tail index must be finite and > 0.
    #[error("tail index gamma = {0} (must be finite and > 0)")]
    TailIndex(f64),

    /// Horizontal range must be at least 1.
    #[error("horizontal range = {0} (must be >= 1)")]
    HorizontalRange(usize),

    /// Layer count below the required minimum.
    #[error("layers = {found} (must be >= {min})")]
    Layers { found: usize, min: usize },

    /// Scope radius too large to index.
    #[error("scope radius for layer {layer} overflows (a^{layer} = {value})")]
    ScopeOverflow { layer: usize, value: f64 },

    /// Neighbor tables through `layer` would exceed the cell cap.
    #[error("lattice too large at layer {layer} (more than {max} cells)")]
    LatticeTooLarge { layer: usize, max: usize },
}

/// Invariant violations detected during a run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    /// A selection row summed to a non-positive or non-finite value.
    #[error("degenerate selection distribution at layer {layer}, node {node}{} (sum = {sum})", round_suffix(.round))]
    DegenerateDistribution {
        layer: usize,
        node: usize,
        round: Option<u64>,
        sum: f64,
    },

    /// Two arrays that must agree in shape do not.
    #[error("shape mismatch at layer {layer}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        layer: usize,
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// An increment row with more than one set slot, or a slot out of range.
    #[error("malformed increment at layer {layer}, node {node}: {reason}")]
    MalformedIncrement {
        layer: usize,
        node: usize,
        reason: String,
    },

    /// A stored weight below the initial value of 1.
    #[error("weight {weight} at layer {layer}, node {node}, slot {slot} (must be >= 1)")]
    InvalidWeight {
        layer: usize,
        node: usize,
        slot: usize,
        weight: u64,
    },

    /// A layer index with no weight array.
    #[error("no weight array for layer {0}")]
    MissingLayer(usize),
}

fn round_suffix(round: &Option<u64>) -> String {
    match round {
        Some(r) => format!(", round {}", r),
        None => String::new(),
    }
}

impl ArborError {
    /// Attach the round number to a state error that lacks one.
    pub fn at_round(self, round: u64) -> Self {
        match self {
            ArborError::State(StateError::DegenerateDistribution {
                layer,
                node,
                round: None,
                sum,
            }) => ArborError::State(StateError::DegenerateDistribution {
                layer,
                node,
                round: Some(round),
                sum,
            }),
            other => other,
        }
    }

    /// Whether this is a parameter (configuration) error.
    pub fn is_parameter(&self) -> bool {
        matches!(self, ArborError::Parameter(_))
    }

    /// Whether this is an invariant violation.
    pub fn is_state(&self) -> bool {
        matches!(self, ArborError::State(_))
    }
}
