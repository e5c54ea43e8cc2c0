//! Configuration command handlers
//!
//! Handles the `configure` subcommand for viewing and updating the stored
//! run configuration.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use x4vro::RunConfig;

pub fn handle(
    config_path: Option<PathBuf>,
    show: bool,
    set_root: Option<String>,
) -> Result<()> {
    let path = match config_path {
        Some(path) => path,
        None => RunConfig::default_path().context("could not determine config directory")?,
    };
    let mut config =
        RunConfig::load(&path).with_context(|| format!("loading config from {}", path.display()))?;

    if show {
        show_config(&config, &path)?;
        return Ok(());
    }

    if let Some(assignment) = set_root {
        set_root_entry(&mut config, &assignment)?;
        config.save(&path)?;
        println!("Config saved to: {}", path.display());
    } else {
        show_usage();
    }

    Ok(())
}

fn show_config(config: &RunConfig, path: &Path) -> Result<()> {
    println!("# {}", path.display());
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn set_root_entry(config: &mut RunConfig, assignment: &str) -> Result<()> {
    let (name, root) = assignment
        .split_once('=')
        .context("expected NAME=PATH, e.g. vro_base=/mods/vro")?;

    match config.sources.iter_mut().find(|source| source.name == name) {
        Some(entry) => entry.root = Some(PathBuf::from(root)),
        None => {
            let known: Vec<&str> = config
                .sources
                .iter()
                .map(|source| source.name.as_str())
                .collect();
            bail!("unknown source {name:?}; configured sources: {}", known.join(", "));
        }
    }

    println!("{name} root set to {root}");
    Ok(())
}

/// Show usage help for the configure command
fn show_usage() {
    println!("Usage: x4vro configure --set-root NAME=PATH");
    println!("   or: x4vro configure --show");
    println!();
    println!("Sources needing roots: the unpacked base game, each expansion,");
    println!("and the vro_base mod directory.");
}
