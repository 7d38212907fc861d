//! Export visible edges and node markers of one round.

use anyhow::{bail, Context, Result};
use arbor::prelude::*;
use colored::Colorize;
use serde::Serialize;
use std::path::Path;

use super::resolve_run_path;
use crate::config::Config;

#[derive(Serialize)]
struct ExportedRound {
    metadata: ExportMetadata,
    edges: Vec<VisibleEdge>,
    markers: Vec<NodeMarker>,
    stats: EdgeStats,
}

#[derive(Serialize)]
struct ExportMetadata {
    round: u64,
    threshold: u64,
    layers: usize,
    horizontal_range: usize,
    slot_counts: Vec<usize>,
    edge_count: usize,
}

pub fn run(
    output: &str,
    input: Option<&str>,
    round: Option<u64>,
    threshold: Option<u64>,
    format: &str,
) -> Result<()> {
    if !format.eq_ignore_ascii_case("json") {
        bail!("Unsupported format: {}. Use 'json'.", format);
    }

    let path = resolve_run_path(input)?;
    let threshold = match threshold {
        Some(t) => t,
        None => Config::load()?.export.threshold,
    };

    println!("{} Loading run...", "→".blue());
    let loaded = load_run(&path).with_context(|| format!("Failed to load run: {}", path.display()))?;
    let round = round.unwrap_or_else(|| loaded.trace.rounds());
    let Some(snapshot) = loaded.trace.get(round) else {
        bail!(
            "Round {} not in run (0..={})",
            round,
            loaded.trace.rounds()
        );
    };

    let topology = loaded.topology().context("Run parameters no longer valid")?;
    let edges = visible_edges(&topology, snapshot, threshold);
    let markers = node_markers(&loaded.fitness);
    let stats = edge_stats(&edges);

    let export = ExportedRound {
        metadata: ExportMetadata {
            round,
            threshold,
            layers: loaded.params.layers,
            horizontal_range: loaded.params.horizontal_range,
            slot_counts: topology.slot_counts(),
            edge_count: edges.len(),
        },
        edges,
        markers,
        stats,
    };

    let output_path = Path::new(output);
    let content = serde_json::to_string_pretty(&export)?;
    std::fs::write(output_path, content)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    println!();
    println!("{} Exported round {} to {}", "✓".green().bold(), round, output.cyan());
    println!("  Edges:   {}", export.metadata.edge_count.to_string().cyan());
    println!("  Markers: {}", export.markers.len().to_string().cyan());
    if export.stats.total > 0 {
        println!(
            "  Weight:  {} – {} (median {})",
            export.stats.min_weight, export.stats.max_weight, export.stats.median_weight
        );
    }

    Ok(())
}
