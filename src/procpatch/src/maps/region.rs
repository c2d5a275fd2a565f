//! Memory Region Types
//!
//! Data structures for representing memory regions from /proc/pid/maps.

/// A memory region from /proc/pid/maps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRegion {
    pub start: u64,
    pub end: u64,
    pub perms: String,
    pub offset: u64,
    pub path: Option<String>,
}

impl MemoryRegion {
    /// Parse one maps line: `start-end perms offset dev inode [path]`
    ///
    /// Returns `None` if the address field is missing or not hex.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let (start, end) = parse_range(parts.next()?)?;
        let perms = parts.next().unwrap_or("").to_string();
        let offset = parts
            .next()
            .and_then(|s| u64::from_str_radix(s, 16).ok())
            .unwrap_or(0);

        // dev, inode
        let mut rest = parts.skip(2).peekable();
        let path = rest.peek().is_some().then(|| rest.collect::<Vec<_>>().join(" "));

        Some(MemoryRegion {
            start,
            end,
            perms,
            offset,
            path,
        })
    }

    pub fn size(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_readable(&self) -> bool {
        self.perms.starts_with('r')
    }

    pub fn is_writable(&self) -> bool {
        self.perms.chars().nth(1) == Some('w')
    }

    pub fn is_executable(&self) -> bool {
        self.perms.chars().nth(2) == Some('x')
    }
}

/// Parse the leading start address of a maps line (text before the first `-`)
pub(crate) fn parse_start(line: &str) -> Option<u64> {
    let field = line.split('-').next()?.trim();
    if field.is_empty() {
        return None;
    }
    u64::from_str_radix(field, 16).ok()
}

fn parse_range(field: &str) -> Option<(u64, u64)> {
    let (start, end) = field.split_once('-')?;
    let start = u64::from_str_radix(start, 16).ok()?;
    let end = u64::from_str_radix(end, 16).ok()?;
    Some((start, end))
}
