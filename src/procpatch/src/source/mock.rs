//! Mock Memory Source
//!
//! A contiguous byte buffer posing as process memory.

use super::MemorySource;
use std::io;

pub struct MockMemorySource {
    /// Raw memory data (contiguous, starting at base_address)
    pub data: Vec<u8>,
    /// Virtual address of `data[0]`
    pub base_address: u64,
}

impl MockMemorySource {
    pub fn new(data: Vec<u8>, base_address: u64) -> Self {
        Self { data, base_address }
    }

    /// Memory that fails every read, like a process that has exited
    pub fn unreadable() -> Self {
        Self::new(Vec::new(), u64::MAX)
    }
}

impl MemorySource for MockMemorySource {
    fn read_bytes(&self, address: u64, len: usize) -> io::Result<Vec<u8>> {
        let fault = || {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("read of {} bytes at {:#x} is outside mock memory", len, address),
            )
        };

        let offset = address
            .checked_sub(self.base_address)
            .and_then(|o| usize::try_from(o).ok())
            .ok_or_else(fault)?;
        let end = offset.checked_add(len).ok_or_else(fault)?;

        self.data.get(offset..end).map(<[u8]>::to_vec).ok_or_else(fault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_source_read_bytes() {
        let source = MockMemorySource::new(vec![0x41, 0x42, 0x43, 0x44], 0x1000);
        assert_eq!(source.read_bytes(0x1000, 4).unwrap(), b"ABCD");
        assert_eq!(source.read_bytes(0x1001, 2).unwrap(), b"BC");
        assert!(source.read_bytes(0x1004, 0).unwrap().is_empty());
    }

    #[test]
    fn test_mock_source_read_out_of_bounds() {
        let source = MockMemorySource::new(vec![0x41, 0x42, 0x43, 0x44], 0x1000);
        assert!(source.read_bytes(0x1002, 10).is_err());
        assert!(source.read_bytes(0x500, 4).is_err());
        assert!(MockMemorySource::unreadable().read_bytes(0x1000, 1).is_err());
    }
}
