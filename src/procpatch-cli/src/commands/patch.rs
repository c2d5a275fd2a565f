//! Patch command handler
//!
//! Captures a process memory range and writes it into a patched copy of the
//! file the process was loaded from.

use crate::cli::ProcessArgs;
use crate::config::{Config, StrategyKind};
use crate::process::resolve_pid;

use anyhow::{Context, Result};
use procpatch::{
    BaseStrategy, MapReader, MappingSource, MemorySource, PatchEngine, PatchRequest, PatchedFile,
    ProcMaps, ProcessMemory,
};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Bytes of the written range echoed back after a patch
const PREVIEW_LEN: usize = 32;

/// Handle the Patch command
pub fn handle(
    file: &Path,
    start: u64,
    end: u64,
    process: &ProcessArgs,
    suffix: Option<String>,
    strategy: Option<StrategyKind>,
) -> Result<()> {
    let config = Config::load()?;
    let pid = resolve_pid(process)?;

    let suffix = suffix.unwrap_or_else(|| config.suffix().to_string());
    let strategy = base_strategy(strategy.unwrap_or(config.strategy()), file)?;

    let engine = PatchEngine::new(MapReader::new(ProcMaps::default()).with_strategy(strategy))
        .with_suffix(suffix)?;
    let memory = ProcessMemory::attach(pid)?;

    let patched = run(&engine, pid, file, start, end, &memory)?;

    println!("PID:          {}", memory.pid());
    println!("Base address: {:#x}", patched.base);
    println!("File offset:  {:#x}", patched.offset);
    println!("Bytes:        {}", patched.len);
    println!("Patched copy: {}", patched.path.display());
    if patched.len > 0 {
        println!("Data:         {}", preview(&patched)?);
    }

    Ok(())
}

/// Validate the range and patch `file` from `pid`'s memory
pub fn run<M: MappingSource>(
    engine: &PatchEngine<M>,
    pid: u32,
    file: &Path,
    start: u64,
    end: u64,
    memory: &dyn MemorySource,
) -> Result<PatchedFile> {
    let request = PatchRequest::new(file, start, end)?;
    engine
        .patch(pid, &request, memory)
        .with_context(|| format!("Failed to patch {} from PID {}", file.display(), pid))
}

/// Map the configured strategy to a concrete one for `file`
///
/// The module strategy needs the canonical path, since /proc/<pid>/maps
/// lists absolute paths.
fn base_strategy(kind: StrategyKind, file: &Path) -> Result<BaseStrategy> {
    match kind {
        StrategyKind::First => Ok(BaseStrategy::FirstMapping),
        StrategyKind::Module => {
            let path = std::fs::canonicalize(file)
                .with_context(|| format!("Failed to resolve {}", file.display()))?;
            Ok(BaseStrategy::Module(path))
        }
    }
}

/// Hex of the first bytes written into the patched copy
fn preview(patched: &PatchedFile) -> Result<String> {
    let mut file = File::open(&patched.path)
        .with_context(|| format!("Failed to reopen {}", patched.path.display()))?;
    file.seek(SeekFrom::Start(patched.offset))?;

    let mut buffer = Vec::with_capacity(PREVIEW_LEN);
    file.take(patched.len.min(PREVIEW_LEN) as u64)
        .read_to_end(&mut buffer)?;

    let mut text = hex::encode(&buffer);
    if patched.len > PREVIEW_LEN {
        text.push_str("...");
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_first_strategy_ignores_file() {
        let strategy = base_strategy(StrategyKind::First, Path::new("/does/not/exist")).unwrap();
        assert_eq!(strategy, BaseStrategy::FirstMapping);
    }

    #[test]
    fn test_module_strategy_canonicalizes() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("app");
        fs::write(&target, b"\x7fELF").unwrap();

        let strategy = base_strategy(StrategyKind::Module, &target).unwrap();
        assert_eq!(
            strategy,
            BaseStrategy::Module(fs::canonicalize(&target).unwrap())
        );

        assert!(base_strategy(StrategyKind::Module, &dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_preview_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out");
        let mut data = vec![0u8; 4];
        data.extend(0u8..40);
        fs::write(&path, &data).unwrap();

        let short = PatchedFile {
            path: path.clone(),
            base: 0,
            offset: 4,
            len: 2,
        };
        assert_eq!(preview(&short).unwrap(), "0001");

        let long = PatchedFile { len: 40, ..short };
        let text = preview(&long).unwrap();
        assert!(text.ends_with("..."));
        assert_eq!(text.len(), PREVIEW_LEN * 2 + 3);
    }

    #[test]
    fn test_pid_zero_reports_no_inferior() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("app");
        fs::write(&target, [0u8; 16]).unwrap();

        let engine: PatchEngine = PatchEngine::default();
        let memory = MockMemory;
        let err = run(&engine, 0, &target, 0x10, 0x14, &memory).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<procpatch::PatchError>(),
            Some(procpatch::PatchError::NoInferiorAttached)
        ));
        assert!(!dir.path().join("app_patch").exists());
    }

    struct MockMemory;

    impl MemorySource for MockMemory {
        fn read_bytes(&self, _address: u64, len: usize) -> std::io::Result<Vec<u8>> {
            Ok(vec![0xcc; len])
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_patch_from_own_process() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("image");
        fs::write(&target, [0u8; 16]).unwrap();

        let pid = std::process::id();
        let engine: PatchEngine = PatchEngine::default();
        let base = engine.map_reader().base_address(pid).unwrap();
        let memory = ProcessMemory::attach(pid).unwrap();

        let patched = run(&engine, pid, &target, base + 4, base + 8, &memory).unwrap();
        assert_eq!(patched.offset, 4);
        assert_eq!(patched.path, dir.path().join("image_patch"));

        let expected = memory.read_bytes(base + 4, 4).unwrap();
        let written = fs::read(&patched.path).unwrap();
        assert_eq!(&written[4..8], &expected[..]);
        assert_eq!(&written[..4], &[0u8; 4]);
        assert_eq!(&written[8..], &[0u8; 8]);
    }
}
