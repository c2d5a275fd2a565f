//! Patch Engine
//!
//! Translates a process address range into a file offset, captures the bytes
//! from process memory, and writes them into a patched copy of the file.
//!
//! The copy is staged in a temporary file next to the destination and renamed
//! into place only after the patch bytes are written and synced, so a failed
//! patch never leaves a half-written `<file>_patch` behind. The original file
//! is only ever opened read-only.

use crate::maps::{MapReader, MappingSource, ProcMaps};
use crate::{MemorySource, PatchError};

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Suffix appended to the target file name to form the destination
pub const DEFAULT_SUFFIX: &str = "_patch";

/// A process memory range to persist into `target`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchRequest {
    pub target: PathBuf,
    /// First process address to capture
    pub start: u64,
    /// One past the last process address to capture
    pub end: u64,
}

impl PatchRequest {
    pub fn new(target: impl Into<PathBuf>, start: u64, end: u64) -> Result<Self, PatchError> {
        let request = Self {
            target: target.into(),
            start,
            end,
        };
        request.span()?;
        Ok(request)
    }

    /// Number of bytes covered (`end - start`)
    pub fn span(&self) -> Result<u64, PatchError> {
        self.end
            .checked_sub(self.start)
            .ok_or(PatchError::InvalidRange {
                start: self.start,
                end: self.end,
            })
    }
}

/// Result of a successful patch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchedFile {
    /// Destination file that was written
    pub path: PathBuf,
    /// Base address the offset was computed against
    pub base: u64,
    /// File offset the captured bytes were written at
    pub offset: u64,
    /// Number of bytes written
    pub len: usize,
}

/// Destination path for a patch of `target`: the file name with `suffix` appended
pub fn destination_path(target: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Produces patched copies of files from live process memory
///
/// Holds no per-patch state; use one engine per concurrent patch.
#[derive(Debug, Clone)]
pub struct PatchEngine<M = ProcMaps> {
    maps: MapReader<M>,
    suffix: String,
}

impl Default for PatchEngine<ProcMaps> {
    fn default() -> Self {
        Self::new(MapReader::default())
    }
}

impl<M: MappingSource> PatchEngine<M> {
    pub fn new(maps: MapReader<M>) -> Self {
        Self {
            maps,
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }

    /// Use a different destination suffix; an empty suffix would overwrite the target
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Result<Self, PatchError> {
        let suffix = suffix.into();
        if suffix.is_empty() {
            return Err(PatchError::InvalidSuffix);
        }
        self.suffix = suffix;
        Ok(self)
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn map_reader(&self) -> &MapReader<M> {
        &self.maps
    }

    /// Patch `request.target` with memory from `pid`, resolving the base address first
    pub fn patch(
        &self,
        pid: u32,
        request: &PatchRequest,
        memory: &dyn MemorySource,
    ) -> Result<PatchedFile, PatchError> {
        request.span()?;
        let base = self.maps.base_address(pid)?;
        self.patch_at(request, base, memory)
    }

    /// Patch `request.target` using an already-resolved base address
    pub fn patch_at(
        &self,
        request: &PatchRequest,
        base: u64,
        memory: &dyn MemorySource,
    ) -> Result<PatchedFile, PatchError> {
        let span = request.span()?;
        let offset = request
            .start
            .checked_sub(base)
            .ok_or(PatchError::OffsetUnderflow {
                start: request.start,
                base,
            })?;
        let len = usize::try_from(span).map_err(|_| PatchError::InvalidRange {
            start: request.start,
            end: request.end,
        })?;

        debug!(
            "start = {:#x}; base = {:#x}; file offset = {:#x}; len = {}",
            request.start, base, offset, len
        );

        let bytes = capture(memory, request.start, len)?;

        let dest = destination_path(&request.target, &self.suffix);
        write_patched_copy(&request.target, &dest, offset, &bytes).map_err(|source| {
            error!(
                source_path = %request.target.display(),
                dest_path = %dest.display(),
                "patch write failed at offset {:#x}: {}",
                offset,
                source
            );
            PatchError::PatchWrite {
                source_path: request.target.clone(),
                dest_path: dest.clone(),
                offset,
                source,
            }
        })?;

        info!(
            "patched {} bytes at offset {:#x} into {}",
            len,
            offset,
            dest.display()
        );

        Ok(PatchedFile {
            path: dest,
            base,
            offset,
            len,
        })
    }
}

fn capture(memory: &dyn MemorySource, address: u64, len: usize) -> Result<Vec<u8>, PatchError> {
    let bytes = memory
        .read_bytes(address, len)
        .map_err(|source| PatchError::MemoryRead {
            address,
            len,
            source,
        })?;

    if bytes.len() != len {
        return Err(PatchError::MemoryRead {
            address,
            len,
            source: io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("short read: got {} of {} bytes", bytes.len(), len),
            ),
        });
    }

    Ok(bytes)
}

/// Copy `source` to `dest` with `bytes` written at `offset`
///
/// Writing past the end of the copy extends it; the gap is zero-filled.
fn write_patched_copy(source: &Path, dest: &Path, offset: u64, bytes: &[u8]) -> io::Result<()> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = tempfile::Builder::new()
        .prefix(".procpatch-")
        .tempfile_in(dir)?;

    {
        let mut original = File::open(source)?;
        io::copy(&mut original, staged.as_file_mut())?;
        let permissions = original.metadata()?.permissions();
        staged.as_file().set_permissions(permissions)?;
    }

    let file = staged.as_file_mut();
    file.seek(SeekFrom::Start(offset))?;
    file.write_all(bytes)?;
    file.sync_all()?;

    staged.persist(dest).map_err(|e| e.error)?;
    Ok(())
}
