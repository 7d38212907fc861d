//! Show run statistics.

use anyhow::{Context, Result};
use arbor::prelude::*;
use colored::Colorize;

use super::resolve_run_path;
use crate::config::Config;

pub fn run(input: Option<&str>, threshold: Option<u64>) -> Result<()> {
    let path = resolve_run_path(input)?;
    let threshold = match threshold {
        Some(t) => t,
        None => Config::load()?.export.threshold,
    };

    let output = load_run(&path).with_context(|| format!("Failed to load run: {}", path.display()))?;
    let metrics = RunMetrics::compute(&output, threshold);
    let params = &output.params;

    println!("{}", "Arbor Run Statistics".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!();

    println!("{}", "Parameters".blue().bold());
    println!("  a:                 {}", params.a.to_string().cyan());
    println!("  beta:              {}", params.beta.to_string().cyan());
    println!("  gamma:             {}", params.gamma.to_string().cyan());
    println!("  Horizontal range:  {}", params.horizontal_range.to_string().cyan());
    println!("  Layers:            {}", params.layers.to_string().cyan());
    println!("  Seed:              {}", params.seed.to_string().cyan());
    println!("  Rounds:            {}", metrics.rounds.to_string().cyan());
    println!();

    println!("{}", "Fitness".blue().bold());
    let values: Vec<f64> = output.fitness.all_values().collect();
    let max_fitness = values.iter().copied().fold(0.0f64, f64::max);
    println!("  Nodes:             {}", values.len().to_string().cyan());
    println!("  Max fitness:       {:.3e}", max_fitness);
    let k = (values.len() / 10).max(1);
    match hill_tail_index(&values, k) {
        Some(est) => println!("  Tail index (Hill): {:.3} (k = {})", est, k),
        None => println!("  Tail index (Hill): {}", "n/a".dimmed()),
    }
    println!();

    for layer in &metrics.layers {
        println!("{}", format!("Layer {} → {}", layer.layer, layer.layer + 1).blue().bold());
        println!("  Slots per node:    {}", layer.slots.to_string().cyan());
        println!("  Increments:        {}", layer.total_increments.to_string().cyan());
        println!("  Max weight:        {}", layer.max_weight.to_string().green());
        println!("  Mean weight:       {:.3}", layer.mean_weight);
        println!("  Gini:              {:.4}", layer.gini);
        println!("  Dominant share:    {:.4}", layer.dominant_share);
        println!(
            "  Visible edges:     {} (weight > {})",
            layer.visible_edges.to_string().green(),
            threshold
        );
        println!();
    }

    println!(
        "{} {}",
        "Conservation:".blue().bold(),
        if metrics.conservation_holds {
            "every node fired once per round".green()
        } else {
            "VIOLATED".red().bold()
        }
    );
    println!("{}", "═".repeat(40).dimmed());

    Ok(())
}
