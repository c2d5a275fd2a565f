//! Base Address Resolution
//!
//! Reads a process's mapping table and picks the mapping treated as the image
//! load base.

use super::region::{parse_start, MemoryRegion};
use crate::PatchError;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Where a process's mapping table is read from
pub trait MappingSource {
    /// Open the line-oriented mapping table for `pid`
    fn open(&self, pid: u32) -> io::Result<Box<dyn BufRead + '_>>;
}

/// Mapping tables served by procfs (`<root>/<pid>/maps`)
#[derive(Debug, Clone)]
pub struct ProcMaps {
    root: PathBuf,
}

impl ProcMaps {
    /// Use a procfs mounted somewhere other than `/proc`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn maps_path(&self, pid: u32) -> PathBuf {
        self.root.join(pid.to_string()).join("maps")
    }
}

impl Default for ProcMaps {
    fn default() -> Self {
        Self::with_root("/proc")
    }
}

impl MappingSource for ProcMaps {
    fn open(&self, pid: u32) -> io::Result<Box<dyn BufRead + '_>> {
        let file = File::open(self.maps_path(pid))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Which mapping is taken as the load base
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BaseStrategy {
    /// The first (lowest) mapping in the table.
    ///
    /// This is a heuristic: with some loader layouts the first mapping belongs
    /// to something other than the main executable.
    #[default]
    FirstMapping,
    /// The lowest mapping backed by the given file.
    ///
    /// A bare file name (`app` or `./app`) matches any mapping with that file
    /// name. A path with directories must be absolute and canonical, as procfs
    /// lists it. Mappings of a replaced file (`<path> (deleted)`) still match.
    Module(PathBuf),
}

/// Resolves load base addresses from a `MappingSource`
#[derive(Debug, Clone, Default)]
pub struct MapReader<M = ProcMaps> {
    source: M,
    strategy: BaseStrategy,
}

impl<M: MappingSource> MapReader<M> {
    pub fn new(source: M) -> Self {
        Self {
            source,
            strategy: BaseStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: BaseStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> &BaseStrategy {
        &self.strategy
    }

    /// Resolve the load base address of `pid`
    ///
    /// Not cached; mappings can change between calls.
    pub fn base_address(&self, pid: u32) -> Result<u64, PatchError> {
        let reader = self.open(pid)?;

        let base = match &self.strategy {
            BaseStrategy::FirstMapping => first_mapping_start(reader),
            BaseStrategy::Module(module) => module_start(reader, module),
        }
        .map_err(|source| PatchError::MappingRead { pid, source })?;

        debug!(pid, strategy = ?self.strategy, "resolved base address {:#x}", base);
        Ok(base)
    }

    /// Parse every mapping of `pid`, skipping lines that don't parse
    pub fn regions(&self, pid: u32) -> Result<Vec<MemoryRegion>, PatchError> {
        let reader = self.open(pid)?;

        let mut regions = Vec::new();
        for line in reader.lines() {
            let line = line.map_err(|source| PatchError::MappingRead { pid, source })?;
            if let Some(region) = MemoryRegion::parse(&line) {
                regions.push(region);
            }
        }

        Ok(regions)
    }

    fn open(&self, pid: u32) -> Result<Box<dyn BufRead + '_>, PatchError> {
        if pid == 0 {
            return Err(PatchError::NoInferiorAttached);
        }
        self.source
            .open(pid)
            .map_err(|source| PatchError::MappingRead { pid, source })
    }
}

fn first_mapping_start(mut reader: Box<dyn BufRead + '_>) -> io::Result<u64> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "memory map is empty",
        ));
    }

    parse_start(&line).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("malformed memory map line: {:?}", line.trim_end()),
        )
    })
}

fn module_start(reader: Box<dyn BufRead + '_>, module: &Path) -> io::Result<u64> {
    let mut lowest: Option<u64> = None;

    for line in reader.lines() {
        let line = line?;
        let Some(region) = MemoryRegion::parse(&line) else {
            continue;
        };
        let Some(path) = region.path.as_deref() else {
            continue;
        };
        if matches_module(path, module) {
            lowest = Some(lowest.map_or(region.start, |s| s.min(region.start)));
        }
    }

    lowest.ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("no mapping backed by {}", module.display()),
        )
    })
}

/// Suffix procfs appends to mappings whose file was unlinked or replaced
const DELETED_SUFFIX: &str = " (deleted)";

fn matches_module(mapped: &str, module: &Path) -> bool {
    let mapped = Path::new(mapped.strip_suffix(DELETED_SUFFIX).unwrap_or(mapped));
    if mapped == module {
        return true;
    }

    let bare_name = module
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .count()
        == 1;
    bare_name && mapped.file_name() == module.file_name()
}
