//! Mapping inspection command handlers
//!
//! Handlers for printing the base address and the mapping table of a process.

use crate::cli::ProcessArgs;
use crate::process::resolve_pid;
use anyhow::{Context, Result};
use procpatch::{BaseStrategy, MapReader, MemoryRegion, ProcMaps};
use std::path::PathBuf;

/// Handle the Base command
pub fn handle_base(process: &ProcessArgs, module: Option<PathBuf>) -> Result<()> {
    let pid = resolve_pid(process)?;
    let strategy = module.map_or(BaseStrategy::FirstMapping, BaseStrategy::Module);

    let base = MapReader::new(ProcMaps::default())
        .with_strategy(strategy)
        .base_address(pid)
        .with_context(|| format!("Failed to resolve base address of PID {}", pid))?;

    println!("{:#x}", base);
    Ok(())
}

/// Handle the Maps command
pub fn handle_maps(process: &ProcessArgs) -> Result<()> {
    let pid = resolve_pid(process)?;
    let regions = MapReader::new(ProcMaps::default())
        .regions(pid)
        .with_context(|| format!("Failed to read memory map of PID {}", pid))?;

    println!("PID {}: {} regions", pid, regions.len());
    for region in &regions {
        println!("{}", format_region(region));
    }
    Ok(())
}

fn format_region(region: &MemoryRegion) -> String {
    format!(
        "{:012x}-{:012x} {:<4} {:08x} {:>10}  {}",
        region.start,
        region.end,
        region.perms,
        region.offset,
        region.size(),
        region.path.as_deref().unwrap_or("")
    )
}
