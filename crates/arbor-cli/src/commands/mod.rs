//! CLI command implementations.

pub mod export;
pub mod init;
pub mod run;
pub mod stats;

use anyhow::{bail, Result};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::default_run_path;

/// Resolve a run file argument, falling back to `.arbor/run.json`.
pub(crate) fn resolve_run_path(input: Option<&str>) -> Result<PathBuf> {
    let path = match input {
        Some(p) => PathBuf::from(p),
        None => default_run_path()?,
    };
    if !path.exists() {
        bail!(
            "No run file at {}. Run {} first.",
            path.display(),
            "arbor run".cyan()
        );
    }
    Ok(path)
}
