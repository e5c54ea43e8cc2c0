//! Pipeline command handler.
//!
//! Resolves the run configuration, rebalances the selected component
//! families, writes one patch file per component into the family's output
//! directory, and optionally dumps CSV summaries for manual review.

use crate::report;
use crate::resolver::{EnvResolver, EnvThenPrompt};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use x4vro::config::{RootResolver, RunConfig};
use x4vro::rebalance::{engines, shields, RebalanceOutcome};
use x4vro::{patch, FamilyConfig};

pub fn handle(
    config_path: Option<PathBuf>,
    shields_flag: bool,
    engines_flag: bool,
    csv_dir: Option<PathBuf>,
    prompt: bool,
) -> Result<()> {
    let config = load_config(config_path.as_deref())?;

    let resolver: Box<dyn RootResolver> = if prompt {
        Box::new(EnvThenPrompt)
    } else {
        Box::new(EnvResolver)
    };
    let sources = config
        .resolve_sources(resolver.as_ref())
        .context("resolving source roots")?;
    let vro_root = RunConfig::vro_root(&sources)
        .context("source list has no vro_base entry")?
        .to_path_buf();

    // Explicit family flags narrow the run; otherwise the config decides.
    let explicit = shields_flag || engines_flag;
    let run_shields = if explicit { shields_flag } else { config.shields.enabled };
    let run_engines = if explicit { engines_flag } else { config.engines.enabled };
    let summary_dir = csv_dir.or_else(|| config.summary_dir.clone());

    if run_shields {
        let outcome = shields::rebalance(&sources, &config.shields)
            .context("rebalancing shields")?;
        write_family(
            "shields",
            &config.shields,
            &outcome,
            &vro_root,
            summary_dir.as_deref(),
        )?;
    }

    if run_engines {
        let outcome = engines::rebalance(&sources, &config.engines)
            .context("rebalancing engines")?;
        write_family(
            "engines",
            &config.engines,
            &outcome,
            &vro_root,
            summary_dir.as_deref(),
        )?;
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<RunConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => RunConfig::default_path().context("could not determine config directory")?,
    };
    RunConfig::load(&path).with_context(|| format!("loading config from {}", path.display()))
}

fn write_family(
    name: &str,
    family: &FamilyConfig,
    outcome: &RebalanceOutcome,
    vro_root: &Path,
    summary_dir: Option<&Path>,
) -> Result<()> {
    let out_dir = family
        .out_dir
        .as_deref()
        .with_context(|| format!("no output directory configured for {name}"))?;

    let mut written = 0usize;
    for component in &outcome.components {
        if component.entries.is_empty() {
            continue;
        }
        let source_path = &component.record.vro.path;
        let out_path = patch::re_root(source_path, vro_root, out_dir).with_context(|| {
            format!("{} is not under the vro root", source_path.display())
        })?;
        x4vro::write_diff_patch(&out_path, &component.entries)?;
        written += 1;
    }
    println!(
        "{name}: {written} patch files written to {}",
        out_dir.display()
    );

    if let Some(dir) = summary_dir {
        let csv_path = dir.join(format!("modified_{name}.csv"));
        report::write_summary(&csv_path, outcome)?;
        println!("{name}: summary written to {}", csv_path.display());
    }

    Ok(())
}
