//! Initialize a new Arbor project.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::Config;

pub fn run(path: Option<String>) -> Result<()> {
    let base_path = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    println!("{} Initializing Arbor project...", "→".blue());

    // Create .arbor directory
    let arbor_dir = base_path.join(".arbor");
    std::fs::create_dir_all(&arbor_dir)
        .with_context(|| format!("Failed to create {}", arbor_dir.display()))?;
    println!("  {} Created {}", "✓".green(), arbor_dir.display());

    // Create default config
    let config_path = base_path.join("arbor.toml");
    if !config_path.exists() {
        Config::default().save(&config_path)?;
        println!("  {} Created {}", "✓".green(), config_path.display());
    } else {
        println!("  {} {} already exists", "•".yellow(), config_path.display());
    }

    // Run files are large; keep them out of version control
    let gitignore_path = arbor_dir.join(".gitignore");
    if !gitignore_path.exists() {
        std::fs::write(&gitignore_path, "*.json\n")
            .with_context(|| format!("Failed to write {}", gitignore_path.display()))?;
        println!("  {} Created {}", "✓".green(), gitignore_path.display());
    }

    println!();
    println!("{} Arbor project initialized!", "✓".green().bold());
    println!();
    println!("Next steps:");
    println!("  {} edit arbor.toml", "1.".blue());
    println!("  {} arbor run", "2.".blue());
    println!("  {} arbor stats", "3.".blue());
    println!("  {} arbor export edges.json", "4.".blue());

    Ok(())
}
