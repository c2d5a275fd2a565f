//! # procpatch
//!
//! Persist runtime-modified process memory back into the file that produced
//! the process image.
//!
//! This library provides functionality to:
//! - Resolve a process's load base address from `/proc/<pid>/maps`
//! - Translate a process address range into a file offset
//! - Read that range out of the live process
//! - Write the captured bytes into a patched copy of the file (`<file>_patch`)
//!
//! ## Example
//!
//! ```no_run
//! use procpatch::{PatchEngine, PatchRequest, ProcessMemory};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pid = 1234;
//! let memory = ProcessMemory::attach(pid)?;
//! let request = PatchRequest::new("./target", 0x5555_5555_5000, 0x5555_5555_5040)?;
//!
//! let engine: PatchEngine = PatchEngine::default();
//! let patched = engine.patch(pid, &request, &memory)?;
//! println!("wrote {} bytes at {:#x} into {}", patched.len, patched.offset, patched.path.display());
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod error;
pub mod maps;
pub mod patch;
pub mod source;

#[doc(inline)]
pub use address::parse_address;
#[doc(inline)]
pub use error::PatchError;
#[doc(inline)]
pub use maps::{BaseStrategy, MapReader, MappingSource, MemoryRegion, ProcMaps};
#[doc(inline)]
pub use patch::{destination_path, PatchEngine, PatchRequest, PatchedFile, DEFAULT_SUFFIX};
#[doc(inline)]
pub use source::{MemorySource, ProcessMemory};
