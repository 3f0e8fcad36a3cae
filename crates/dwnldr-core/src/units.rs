//! Byte-magnitude parsing for the rate cap (`-s=1M`, `512K`, `2.5g`).
//!
//! Suffixes are binary multiples: `K` = 1024, `M` = 1024², up to `P` = 1024⁵.

use thiserror::Error;

/// Binary-multiple suffixes, in increasing order of magnitude.
const SUFFIXES: [char; 5] = ['K', 'M', 'G', 'T', 'P'];

const SCALE: f64 = 1024.0;

#[derive(Debug, Error, PartialEq)]
pub enum UnitError {
    #[error("magnitude is empty")]
    Empty,
    #[error("invalid magnitude {0:?}")]
    Invalid(String),
    #[error("magnitude must not be negative: {0:?}")]
    Negative(String),
}

/// Parses a case-insensitive magnitude such as `"1M"` or `"2048"` into bytes.
///
/// The numeric part may be fractional (`"1.5K"` is 1536). A missing suffix means
/// a raw byte count.
pub fn parse_magnitude(input: &str) -> Result<f64, UnitError> {
    let s = input.trim().to_ascii_uppercase();
    if s.is_empty() {
        return Err(UnitError::Empty);
    }

    let (number, multiplier) = match SUFFIXES.iter().position(|c| s.ends_with(*c)) {
        Some(i) => (&s[..s.len() - 1], SCALE.powi(i as i32 + 1)),
        None => (s.as_str(), 1.0),
    };

    let value: f64 = number
        .parse()
        .map_err(|_| UnitError::Invalid(input.to_string()))?;
    if !value.is_finite() {
        return Err(UnitError::Invalid(input.to_string()));
    }
    if value < 0.0 {
        return Err(UnitError::Negative(input.to_string()));
    }
    let bytes = value * multiplier;
    if !bytes.is_finite() {
        return Err(UnitError::Invalid(input.to_string()));
    }
    Ok(bytes)
}

/// Parses a magnitude and truncates it to a whole bytes-per-second cap (0 = unlimited).
pub fn parse_rate_cap(input: &str) -> Result<u64, UnitError> {
    parse_magnitude(input).map(|v| v as u64)
}
