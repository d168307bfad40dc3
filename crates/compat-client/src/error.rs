//! Client error types

use thiserror::Error;

/// Errors surfaced by the chain client adapter
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport/network failure (node unreachable, connection dropped)
    #[error("transport error: {0}")]
    Transport(String),

    /// Structured error returned by the node
    #[error("rpc error: {code} - {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// JSON-RPC error message
        message: String,
    },

    /// A quantity or byte field was not valid hex
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Request or response (de)serialization failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The node response was missing a required field
    #[error("missing field in response: {0}")]
    MissingField(&'static str),

    /// ABI encoding or decoding failed
    #[error("abi error: {0}")]
    Abi(String),
}

impl From<hex::FromHexError> for ClientError {
    fn from(e: hex::FromHexError) -> Self {
        ClientError::InvalidHex(e.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Serialization(e.to_string())
    }
}
