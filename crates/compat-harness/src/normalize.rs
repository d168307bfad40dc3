//! Canonical value normalization.
//!
//! Observed chain values and expected row values arrive in heterogeneous
//! spellings (checksummed vs lower-case addresses, hex vs decimal
//! integers, padded vs unpadded). Both sides are folded into one
//! [`ComparableValue`] representation before comparison, so spelling
//! differences never produce false failures.

use std::fmt;

use compat_client::abi::Token;
use compat_primitives::U256;
use thiserror::Error;

/// Value-shape error raised during normalization
#[derive(Debug, Error)]
pub enum NormalizationError {
    /// Input did not match the 20-byte hex address shape
    #[error("malformed address: {0:?}")]
    MalformedAddress(String),
    /// Value shape the harness cannot compare
    #[error("unsupported value shape: {0}")]
    Unsupported(String),
}

/// Canonical, comparable form of an observed or expected value.
///
/// Two values are equal iff their tags and normalized contents are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparableValue {
    /// Lower-cased, 0x-prefixed 20-byte address
    Address(String),
    /// Integer compared by value, independent of source representation
    Integer(U256),
    /// Trimmed text
    Text(String),
    /// Ordered sequence; order encodes positional identity
    Tuple(Vec<ComparableValue>),
}

impl fmt::Display for ComparableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparableValue::Address(addr) => f.write_str(addr),
            ComparableValue::Integer(value) => write!(f, "{}", value),
            ComparableValue::Text(text) => f.write_str(text),
            ComparableValue::Tuple(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
        }
    }
}

fn is_hex_address(s: &str) -> bool {
    s.len() == 42
        && s.starts_with("0x")
        && s[2..].bytes().all(|b| b.is_ascii_hexdigit())
}

fn parse_integer(s: &str) -> Option<U256> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if hex.is_empty() {
            return None;
        }
        return U256::from_str_radix(hex, 16).ok();
    }
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    U256::from_str_radix(s, 10).ok()
}

/// Normalize a textual value (typically from an expected-value row).
///
/// Total over strings: anything that is neither an address nor an integer
/// becomes trimmed text. Idempotent on the canonical renderings.
pub fn normalize_str(raw: &str) -> ComparableValue {
    let trimmed = raw.trim();
    if is_hex_address(trimmed) {
        return ComparableValue::Address(trimmed.to_ascii_lowercase());
    }
    if let Some(value) = parse_integer(trimmed) {
        return ComparableValue::Integer(value);
    }
    ComparableValue::Text(trimmed.to_string())
}

/// Normalize a string that must be an address
pub fn normalize_address(raw: &str) -> Result<ComparableValue, NormalizationError> {
    let trimmed = raw.trim();
    if !is_hex_address(trimmed) {
        return Err(NormalizationError::MalformedAddress(trimmed.to_string()));
    }
    Ok(ComparableValue::Address(trimmed.to_ascii_lowercase()))
}

/// Normalize a decoded on-chain value.
///
/// Tuples normalize element-wise with order preserved.
pub fn normalize_token(token: &Token) -> Result<ComparableValue, NormalizationError> {
    match token {
        Token::Address(addr) => Ok(ComparableValue::Address(addr.to_hex())),
        Token::Uint(value) => Ok(ComparableValue::Integer(*value)),
        Token::Bool(b) => Ok(ComparableValue::Integer(U256::from(u8::from(*b)))),
        Token::String(s) => Ok(ComparableValue::Text(s.trim().to_string())),
        Token::Bytes(data) | Token::FixedBytes(data) => {
            Ok(ComparableValue::Text(format!("0x{}", hex::encode(data))))
        }
        Token::Tuple(items) => items
            .iter()
            .map(normalize_token)
            .collect::<Result<Vec<_>, _>>()
            .map(ComparableValue::Tuple),
    }
}
