mod cli;
mod commands;
mod config;
mod process;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Patch {
            file,
            start,
            end,
            process,
            suffix,
            strategy,
        } => {
            commands::patch::handle(&file, start, end, &process, suffix, strategy)?;
        }

        Commands::Base { process, module } => {
            commands::maps::handle_base(&process, module)?;
        }

        Commands::Maps { process } => {
            commands::maps::handle_maps(&process)?;
        }

        Commands::Configure {
            suffix,
            strategy,
            show,
        } => {
            commands::configure::handle(suffix, strategy, show)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "procpatch=debug"
    } else {
        "procpatch=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
