//! # compat-client
//!
//! Chain client adapter for the chaincompat harness.
//!
//! Wraps a target node's JSON-RPC surface behind a typed, async API:
//!
//! - **[`ChainClient`]**: balance/nonce/code queries, read-only calls,
//!   transaction submission, receipt lookup
//! - **[`Transport`]**: object-safe RPC transport trait, with an HTTP
//!   implementation ([`HttpTransport`]) and a scripted mock for tests
//!   ([`MockTransport`])
//! - **[`Contract`]**: minimal Solidity ABI helper for encoding calls and
//!   decoding multi-value returns
//!
//! Account and key management are deliberately out of scope: transactions
//! are submitted through node-managed accounts (`eth_sendTransaction`) and
//! senders are referenced by address only.
//!
//! ```rust,no_run
//! use compat_client::{ChainClient, types::BlockId};
//! use compat_primitives::Address;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ChainClient::connect("http://localhost:6789");
//!     let addr = Address::from_hex("0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d")?;
//!     let balance = client.get_balance(&addr, BlockId::Latest).await?;
//!     println!("balance: {}", balance);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod abi;
mod client;
mod contract;
mod error;
mod transport;
pub mod types;

pub use client::ChainClient;
pub use contract::{Contract, ContractBuilder, FunctionDef};
pub use error::ClientError;
pub use transport::{MockTransport, Transport};

#[cfg(feature = "http")]
pub use transport::HttpTransport;

// Re-export primitives for convenience
pub use compat_primitives::{Address, H256, U256};
