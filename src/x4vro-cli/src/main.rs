mod cli;
mod commands;
mod report;
mod resolver;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            shields,
            engines,
            csv_dir,
            prompt,
        } => {
            commands::run::handle(config, shields, engines, csv_dir, prompt)?;
        }

        Commands::Extract {
            input,
            tags,
            raw,
            keep_diff_paths,
        } => {
            commands::extract::handle(&input, &tags, raw, keep_diff_paths)?;
        }

        Commands::Configure {
            config,
            show,
            set_root,
        } => {
            commands::configure::handle(config, show, set_root)?;
        }
    }

    Ok(())
}
