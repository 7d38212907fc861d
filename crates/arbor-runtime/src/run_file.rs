//! Run files: a finished run written to JSON for downstream rendering.
//!
//! A run file holds the parameters, fitness field and full trace of a
//! completed simulation. It is read-only output: a loaded run can be
//! inspected and exported but not continued.

use crate::simulation::SimulationOutput;
use arbor_core::error::{ArborError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current run file format.
pub const FORMAT_VERSION: u32 = 1;

/// Run file metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub format_version: u32,
    pub rounds: u64,
    pub layers: usize,
    pub horizontal_range: usize,
    pub slot_counts: Vec<usize>,
}

/// On-disk layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunFile {
    pub metadata: RunMetadata,
    pub output: SimulationOutput,
}

impl RunFile {
    pub fn new(output: SimulationOutput) -> Self {
        let slot_counts = output
            .trace
            .initial()
            .map(|s| s.layers.iter().map(|l| l.shape().1).collect())
            .unwrap_or_default();
        Self {
            metadata: RunMetadata {
                format_version: FORMAT_VERSION,
                rounds: output.trace.rounds(),
                layers: output.params.layers,
                horizontal_range: output.params.horizontal_range,
                slot_counts,
            },
            output,
        }
    }
}

/// Save a finished run to a JSON file.
pub fn save_run(output: &SimulationOutput, path: &Path) -> Result<()> {
    let file = RunFile::new(output.clone());
    let json = serde_json::to_string(&file)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    // Write beside the target, then rename over it.
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Load a run file, checking its version and that its contents agree.
pub fn load_run(path: &Path) -> Result<SimulationOutput> {
    let json = std::fs::read_to_string(path)?;
    let file: RunFile = serde_json::from_str(&json)?;

    if file.metadata.format_version != FORMAT_VERSION {
        return Err(ArborError::Serialization(format!(
            "run file version {} (expected {})",
            file.metadata.format_version, FORMAT_VERSION
        )));
    }
    if file.output.trace.rounds() != file.metadata.rounds {
        return Err(ArborError::Serialization(format!(
            "run file holds {} rounds, metadata says {}",
            file.output.trace.rounds(),
            file.metadata.rounds
        )));
    }
    file.output
        .validate()
        .map_err(|e| ArborError::Serialization(format!("inconsistent run file: {}", e)))?;
    Ok(file.output)
}
