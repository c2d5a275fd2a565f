//! Memory Source Abstraction
//!
//! The memory-read capability the patch engine consumes:
//! - Live process reads via `ProcessMemory`
//! - Mock sources for testing

#[cfg(test)]
mod mock;
mod process;
mod traits;

#[cfg(test)]
pub use mock::MockMemorySource;
pub use process::ProcessMemory;
pub use traits::MemorySource;
