//! Live Process Memory Source
//!
//! Memory source implementation for reading from a running process.
//! On Linux reads go through `process_vm_readv` directly so that a transfer
//! cut short by an unmapped page is reported instead of zero-filled.

use super::MemorySource;
use crate::PatchError;

use std::io;

#[cfg(target_os = "linux")]
use nix::sys::uio::{process_vm_readv, RemoteIoVec};
#[cfg(target_os = "linux")]
use nix::unistd::Pid;
#[cfg(not(target_os = "linux"))]
use process_memory::{CopyAddress, ProcessHandle, TryIntoProcessHandle};

/// Read access to a running process's address space
pub struct ProcessMemory {
    pid: u32,
    #[cfg(not(target_os = "linux"))]
    handle: ProcessHandle,
}

impl ProcessMemory {
    /// Open `pid` for memory reads
    pub fn attach(pid: u32) -> Result<Self, PatchError> {
        if pid == 0 {
            return Err(PatchError::NoInferiorAttached);
        }

        #[cfg(not(target_os = "linux"))]
        let handle = (pid as process_memory::Pid)
            .try_into_process_handle()
            .map_err(|source| PatchError::Attach { pid, source })?;

        Ok(Self {
            pid,
            #[cfg(not(target_os = "linux"))]
            handle,
        })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    #[cfg(target_os = "linux")]
    fn copy(&self, address: usize, buffer: &mut [u8]) -> io::Result<usize> {
        let len = buffer.len();
        let mut local_iov = [io::IoSliceMut::new(buffer)];
        let remote_iov = [RemoteIoVec { base: address, len }];

        let pid = Pid::from_raw(self.pid as i32);
        Ok(process_vm_readv(pid, &mut local_iov, &remote_iov)?)
    }

    /// `copy_address` can't report partial transfers; it either fills the buffer or fails.
    #[cfg(not(target_os = "linux"))]
    fn copy(&self, address: usize, buffer: &mut [u8]) -> io::Result<usize> {
        self.handle.copy_address(address, buffer)?;
        Ok(buffer.len())
    }
}

impl MemorySource for ProcessMemory {
    fn read_bytes(&self, address: u64, len: usize) -> io::Result<Vec<u8>> {
        let native = usize::try_from(address).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("address {:#x} does not fit the native pointer width", address),
            )
        })?;

        let mut buffer = vec![0u8; len];
        if len == 0 {
            return Ok(buffer);
        }

        let read = self.copy(native, &mut buffer)?;
        if read != len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "partial read at {:#x}: expected {} bytes, got {}",
                    address, len, read
                ),
            ));
        }

        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_pid_zero() {
        assert!(matches!(
            ProcessMemory::attach(0),
            Err(PatchError::NoInferiorAttached)
        ));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_read_own_memory() {
        let data: Box<[u8]> = vec![0xde, 0xad, 0xbe, 0xef].into_boxed_slice();
        let memory = ProcessMemory::attach(std::process::id()).unwrap();
        assert_eq!(memory.pid(), std::process::id());

        let bytes = memory.read_bytes(data.as_ptr() as u64, data.len()).unwrap();
        assert_eq!(&bytes[..], &data[..]);
        assert!(memory.read_bytes(data.as_ptr() as u64, 0).unwrap().is_empty());
    }

    /// A readable mapping of this process whose end is followed by unmapped space
    #[cfg(target_os = "linux")]
    fn region_before_gap() -> crate::MemoryRegion {
        let reader = crate::MapReader::new(crate::ProcMaps::default());
        let regions = reader.regions(std::process::id()).unwrap();
        regions
            .windows(2)
            .find(|pair| {
                let (region, next) = (&pair[0], &pair[1]);
                region.is_readable()
                    && next.start > region.end
                    && !region.path.as_deref().is_some_and(|p| p.starts_with('['))
            })
            .map(|pair| pair[0].clone())
            .expect("no readable mapping followed by a gap")
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_read_across_unmapped_gap_fails() {
        let region = region_before_gap();
        let memory = ProcessMemory::attach(std::process::id()).unwrap();

        assert_eq!(memory.read_bytes(region.end - 4, 4).unwrap().len(), 4);
        assert!(memory.read_bytes(region.end - 4, 8).is_err());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_patch_across_unmapped_gap_writes_nothing() {
        use crate::{destination_path, PatchEngine, PatchRequest, DEFAULT_SUFFIX};

        let region = region_before_gap();
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("image");
        std::fs::write(&target, vec![0xffu8; 16]).unwrap();

        let memory = ProcessMemory::attach(std::process::id()).unwrap();
        let engine: PatchEngine = PatchEngine::default();
        let request = PatchRequest::new(&target, region.end - 4, region.end + 4).unwrap();

        let result = engine.patch_at(&request, region.end - 8, &memory);
        assert!(matches!(
            result,
            Err(PatchError::MemoryRead { len: 8, .. })
        ));
        assert!(!destination_path(&target, DEFAULT_SUFFIX).exists());
    }
}
