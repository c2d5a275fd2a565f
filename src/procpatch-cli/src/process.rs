//! Inferior process selection

use anyhow::{bail, Result};
use std::path::Path;
use sysinfo::System;
use tracing::info;

use crate::cli::ProcessArgs;

/// Resolve `--pid` / `--name` to a process ID
pub fn resolve_pid(args: &ProcessArgs) -> Result<u32> {
    match (args.pid, args.name.as_deref()) {
        (Some(pid), _) => Ok(pid),
        (None, Some(name)) => find_process(name),
        (None, None) => bail!("Either --pid or --name is required"),
    }
}

/// Find a running process by name
///
/// Matches the process name or the executable's file name. When several
/// processes match, the one using the most memory wins. Thread IDs are
/// normalized to their thread group.
pub fn find_process(name: &str) -> Result<u32> {
    let mut system = System::new_all();
    system.refresh_all();

    let own_pid = std::process::id();
    let mut best: Option<(u32, u64)> = None;

    for process in system.processes().values() {
        let exe_matches = process
            .exe()
            .and_then(Path::file_name)
            .is_some_and(|exe| exe.to_string_lossy() == name);
        if process.name().to_string_lossy() != name && !exe_matches {
            continue;
        }

        let pid = process.pid().as_u32();
        let tgid = get_tgid(pid).unwrap_or(pid);
        if tgid == own_pid {
            continue;
        }

        let memory = process.memory();
        if best.map_or(true, |(_, m)| memory > m) {
            best = Some((tgid, memory));
        }
    }

    if let Some((pid, memory)) = best {
        info!(
            "found process {:?}: PID {} (memory: {} MB)",
            name,
            pid,
            memory / 1_000_000
        );
        return Ok(pid);
    }

    bail!("No running process named {:?}", name)
}

/// Get the thread group ID (main process) for a given PID/TID
fn get_tgid(pid: u32) -> Option<u32> {
    let status = std::fs::read_to_string(format!("/proc/{}/status", pid)).ok()?;
    parse_tgid(&status)
}

fn parse_tgid(status: &str) -> Option<u32> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("Tgid:"))
        .and_then(|rest| rest.trim().parse().ok())
}
