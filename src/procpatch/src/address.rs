//! Address literal parsing

use crate::PatchError;

/// Parse a hex (`0x`-prefixed) or decimal address string
///
/// Underscores are accepted as digit separators (`0x7fff_0000`).
pub fn parse_address(address: &str) -> Result<u64, PatchError> {
    let trimmed = address.trim();
    let invalid = || PatchError::InvalidAddress(address.to_string());

    let (digits, radix) = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => (hex, 16),
        None => (trimmed, 10),
    };

    let digits: String = digits.chars().filter(|&c| c != '_').collect();
    if digits.is_empty() || digits.starts_with('+') {
        return Err(invalid());
    }

    u64::from_str_radix(&digits, radix).map_err(|_| invalid())
}
