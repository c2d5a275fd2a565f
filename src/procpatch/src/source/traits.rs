//! Memory Source Trait

use std::io;

/// Reads raw bytes out of a process address space
pub trait MemorySource {
    /// Read exactly `len` bytes starting at `address`
    fn read_bytes(&self, address: u64, len: usize) -> io::Result<Vec<u8>>;
}
