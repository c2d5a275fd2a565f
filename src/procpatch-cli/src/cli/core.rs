//! Core CLI definitions

use clap::{Args, Parser, Subcommand};
use procpatch::parse_address;
use std::path::PathBuf;

use crate::config::StrategyKind;

#[derive(Parser)]
#[command(name = "procpatch")]
#[command(about = "Write live process memory back into the file it was loaded from", long_about = None)]
pub struct Cli {
    /// Show debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Selects the inferior process
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct ProcessArgs {
    /// Process ID of the inferior
    #[arg(short, long)]
    pub pid: Option<u32>,

    /// Find the inferior by process or executable name
    #[arg(short, long)]
    pub name: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Copy process memory [START, END) into FILE<suffix> at START - base
    Patch {
        /// File the process image was loaded from
        file: PathBuf,

        /// Start address in the process (decimal or 0x-prefixed hex)
        #[arg(value_parser = parse_address)]
        start: u64,

        /// End address in the process, exclusive (decimal or 0x-prefixed hex)
        #[arg(value_parser = parse_address)]
        end: u64,

        #[command(flatten)]
        process: ProcessArgs,

        /// Suffix for the patched copy (uses configured default if not provided)
        #[arg(long)]
        suffix: Option<String>,

        /// How to pick the base address (uses configured default if not provided)
        #[arg(long, value_enum)]
        strategy: Option<StrategyKind>,
    },

    /// Print the load base address of a process
    Base {
        #[command(flatten)]
        process: ProcessArgs,

        /// Use the lowest mapping of this module instead of the first mapping
        #[arg(short, long)]
        module: Option<PathBuf>,
    },

    /// List the memory mappings of a process
    Maps {
        #[command(flatten)]
        process: ProcessArgs,
    },

    /// Configure default settings
    Configure {
        /// Set default suffix for patched copies
        #[arg(long)]
        suffix: Option<String>,

        /// Set default base address strategy
        #[arg(long, value_enum)]
        strategy: Option<StrategyKind>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}
