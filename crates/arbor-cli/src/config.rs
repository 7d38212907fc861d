//! Configuration management for Arbor CLI.

use anyhow::{Context, Result};
use arbor::prelude::SimulationParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Arbor project configuration (`arbor.toml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub lattice: LatticeConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_a")]
    pub a: f64,
    #[serde(default = "default_beta")]
    pub beta: f64,
    #[serde(default = "default_gamma")]
    pub gamma: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatticeConfig {
    #[serde(default = "default_horizontal_range")]
    pub horizontal_range: usize,
    #[serde(default = "default_layers")]
    pub layers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_rounds")]
    pub rounds: u64,
    #[serde(default)]
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_threshold")]
    pub threshold: u64,
}

// Default value functions
fn default_a() -> f64 { 2.0 }
fn default_beta() -> f64 { 1.0 }
fn default_gamma() -> f64 { 0.5 }
fn default_horizontal_range() -> usize { 32 }
fn default_layers() -> usize { 4 }
fn default_rounds() -> u64 { 100 }
fn default_threshold() -> u64 { 2 }

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            a: default_a(),
            beta: default_beta(),
            gamma: default_gamma(),
        }
    }
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            horizontal_range: default_horizontal_range(),
            layers: default_layers(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            rounds: default_rounds(),
            seed: 0,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

impl Config {
    /// Load config from arbor.toml in the current or parent directories.
    pub fn load() -> Result<Self> {
        match find_config_file() {
            Some(path) => Self::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    /// Load config from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Simulation parameters described by this config.
    pub fn params(&self) -> SimulationParams {
        SimulationParams {
            a: self.model.a,
            beta: self.model.beta,
            gamma: self.model.gamma,
            horizontal_range: self.lattice.horizontal_range,
            layers: self.lattice.layers,
            rounds: self.run.rounds,
            seed: self.run.seed,
        }
    }
}

/// Find arbor.toml in current or parent directories.
fn find_config_file() -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let config_path = dir.join("arbor.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Get the Arbor data directory (.arbor/).
pub fn data_dir() -> Result<PathBuf> {
    Ok(std::env::current_dir()?.join(".arbor"))
}

/// Get the default run file path.
pub fn default_run_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("run.json"))
}
