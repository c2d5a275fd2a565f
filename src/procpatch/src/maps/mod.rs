//! Process Memory Maps
//!
//! Reading `/proc/<pid>/maps` and resolving a process's load base address:
//! - `MemoryRegion` for one parsed mapping line
//! - `MappingSource` for where the table comes from (procfs or a fixed table in tests)
//! - `MapReader` for base address resolution

mod reader;
mod region;

pub use reader::{BaseStrategy, MapReader, MappingSource, ProcMaps};
pub use region::MemoryRegion;

#[cfg(test)]
pub use reader::tests::StaticMaps;
