//! # compat-primitives
//!
//! Primitive chain types shared across the chaincompat workspace: the
//! 20-byte [`Address`], the 32-byte [`H256`] transaction hash, and a
//! re-export of `primitive_types::U256` for balances and counters.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod hash;

pub use address::{Address, AddressError};
pub use hash::{H256, HashError};

// Re-export primitive-types for U256
pub use primitive_types::U256;
