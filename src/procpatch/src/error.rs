//! Error types shared by the map reader and the patch engine.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("no inferior attached: a running process must be selected before patching")]
    NoInferiorAttached,

    #[error("failed to open process {pid} for memory reads: {source}")]
    Attach {
        pid: u32,
        #[source]
        source: io::Error,
    },

    #[error("failed to read memory map of pid {pid}: {source}")]
    MappingRead {
        pid: u32,
        #[source]
        source: io::Error,
    },

    #[error("end address {end:#x} is below start address {start:#x}")]
    InvalidRange { start: u64, end: u64 },

    #[error("start address {start:#x} is below base address {base:#x}")]
    OffsetUnderflow { start: u64, base: u64 },

    #[error("failed to read {len} bytes of process memory at {address:#x}: {source}")]
    MemoryRead {
        address: u64,
        len: usize,
        #[source]
        source: io::Error,
    },

    #[error(
        "failed to patch {} into {} at offset {offset:#x}: {source}",
        .source_path.display(),
        .dest_path.display()
    )]
    PatchWrite {
        source_path: PathBuf,
        dest_path: PathBuf,
        offset: u64,
        #[source]
        source: io::Error,
    },

    #[error("invalid address literal: {0:?}")]
    InvalidAddress(String),

    #[error("patch suffix must not be empty")]
    InvalidSuffix,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_addresses() {
        let err = PatchError::InvalidRange {
            start: 0x2000,
            end: 0x1000,
        };
        assert_eq!(
            err.to_string(),
            "end address 0x1000 is below start address 0x2000"
        );

        let err = PatchError::OffsetUnderflow {
            start: 0x10,
            base: 0x400000,
        };
        assert!(err.to_string().contains("0x400000"));
    }

    #[test]
    fn test_patch_write_message_names_paths() {
        let err = PatchError::PatchWrite {
            source_path: PathBuf::from("/tmp/a.out"),
            dest_path: PathBuf::from("/tmp/a.out_patch"),
            offset: 0x40,
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/a.out_patch"));
        assert!(msg.contains("0x40"));
    }

    #[test]
    fn test_attach_message_names_pid() {
        let err = PatchError::Attach {
            pid: 4242,
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().starts_with("failed to open process 4242"));
    }
}
