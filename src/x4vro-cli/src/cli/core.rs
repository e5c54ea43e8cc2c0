//! Core CLI definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "x4vro")]
#[command(about = "X4: Foundations VRO rebalance patch generator", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the rebalancing pipeline and write patch files
    #[command(visible_alias = "r")]
    Run {
        /// Path to the run config (defaults to the user config directory)
        #[arg(short, long, env = "X4VRO_CONFIG")]
        config: Option<PathBuf>,

        /// Rebalance shields, even if disabled in the config
        #[arg(long)]
        shields: bool,

        /// Rebalance engines, even if disabled in the config
        #[arg(long)]
        engines: bool,

        /// Write CSV summaries into this directory
        #[arg(long)]
        csv_dir: Option<PathBuf>,

        /// Ask for any source roots the config leaves unset
        #[arg(short, long)]
        prompt: bool,
    },

    /// Extract tagged attributes from a single asset file
    #[command(visible_alias = "x")]
    Extract {
        /// Path to the asset XML file
        input: PathBuf,

        /// Comma-separated tag names to extract
        #[arg(short, long, value_delimiter = ',', default_value = "recharge")]
        tags: Vec<String>,

        /// Print raw string values instead of converting to numbers
        #[arg(long)]
        raw: bool,

        /// Keep diff-envelope segments in reported paths
        #[arg(long)]
        keep_diff_paths: bool,
    },

    /// View or update the stored run configuration
    #[command(visible_alias = "c")]
    Configure {
        /// Path to the run config (defaults to the user config directory)
        #[arg(short, long, env = "X4VRO_CONFIG")]
        config: Option<PathBuf>,

        /// Show the current configuration
        #[arg(long)]
        show: bool,

        /// Set a source root, e.g. --set-root vro_base=/mods/vro
        #[arg(long, value_name = "NAME=PATH")]
        set_root: Option<String>,
    },
}
