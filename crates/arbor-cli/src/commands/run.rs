//! Run a simulation.

use anyhow::{Context, Result};
use arbor::prelude::*;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use crate::config::{default_run_path, Config};

pub fn run(rounds: Option<u64>, seed: Option<u64>, output: Option<&str>, verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let mut params = config.params();
    if let Some(r) = rounds {
        params.rounds = r;
    }
    if let Some(s) = seed {
        params.seed = s;
    }
    let output_path = match output {
        Some(p) => PathBuf::from(p),
        None => default_run_path()?,
    };

    println!("{} Building lattice...", "→".blue());
    let mut sim = Simulation::new(params.clone()).context("Invalid simulation parameters")?;
    println!(
        "  {} layers × {} columns, slots per layer: {:?}",
        params.layers.to_string().cyan(),
        params.horizontal_range.to_string().cyan(),
        sim.topology().slot_counts()
    );

    println!(
        "{} Running {} rounds (seed {})...",
        "→".blue(),
        params.rounds.to_string().cyan(),
        params.seed.to_string().cyan()
    );

    let pb = ProgressBar::new(params.rounds);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} rounds")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    sim.run_with(params.rounds, |summary| {
        if verbose {
            pb.println(format!(
                "  round {}: {} reinforced, max weight {}",
                summary.round, summary.reinforced, summary.max_weight
            ));
        }
        pb.inc(1);
    })
    .context("Simulation aborted")?;
    pb.finish_with_message("done");

    let output = sim.into_output();
    save_run(&output, &output_path)
        .with_context(|| format!("Failed to save run: {}", output_path.display()))?;

    let metrics = RunMetrics::compute(&output, config.export.threshold);
    println!();
    println!("{} Simulation complete!", "✓".green().bold());
    println!("  Rounds:       {}", metrics.rounds.to_string().green());
    println!(
        "  Conservation: {}",
        if metrics.conservation_holds {
            "ok".green()
        } else {
            "VIOLATED".red()
        }
    );
    for layer in &metrics.layers {
        println!(
            "  Layer {}:      max weight {}, dominant share {:.3}",
            layer.layer,
            layer.max_weight.to_string().yellow(),
            layer.dominant_share
        );
    }
    println!("  Saved to {}", output_path.display().to_string().cyan());

    Ok(())
}
