//! ChainClient - typed RPC surface over a transport

use bytes::Bytes;
use compat_primitives::{Address, H256, U256};
use serde_json::Value;

use crate::transport::{deserialize_response, MockTransport, Transport};
use crate::types::{BlockId, CallRequest, Receipt, TxRequest};
use crate::ClientError;

#[cfg(feature = "http")]
use crate::transport::HttpTransport;

/// Typed client for the target node's JSON-RPC surface.
///
/// Stateless apart from the transport handle; all methods take `&self` and
/// concurrent use is safe as long as the transport is.
pub struct ChainClient {
    transport: Box<dyn Transport>,
}

impl ChainClient {
    /// Connect to a node over HTTP
    #[cfg(feature = "http")]
    pub fn connect(url: &str) -> Self {
        Self {
            transport: Box::new(HttpTransport::new(url)),
        }
    }

    /// Client backed by a scripted mock transport (for tests)
    pub fn new_mock() -> Self {
        Self {
            transport: Box::new(MockTransport::new()),
        }
    }

    /// Client with a custom transport
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
        }
    }

    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, ClientError> {
        let value = self.transport.request_json(method, params).await?;
        deserialize_response(value)
    }

    // ==================== Chain Info ====================

    /// Chain ID reported by the node
    pub async fn chain_id(&self) -> Result<u64, ClientError> {
        let result: String = self.request("eth_chainId", vec![]).await?;
        parse_hex_u64(&result)
    }

    /// Current block number
    pub async fn block_number(&self) -> Result<u64, ClientError> {
        let result: String = self.request("eth_blockNumber", vec![]).await?;
        parse_hex_u64(&result)
    }

    /// Current gas price
    pub async fn gas_price(&self) -> Result<u128, ClientError> {
        let result: String = self.request("eth_gasPrice", vec![]).await?;
        parse_hex_u128(&result)
    }

    // ==================== Account Queries ====================

    /// Balance of an address at the given block
    pub async fn get_balance(&self, address: &Address, block: BlockId) -> Result<U256, ClientError> {
        let result: String = self
            .request(
                "eth_getBalance",
                vec![
                    Value::String(address.to_hex()),
                    serde_json::to_value(block)?,
                ],
            )
            .await?;
        parse_hex_u256(&result)
    }

    /// Transaction count (nonce) of an address
    pub async fn get_nonce(&self, address: &Address, block: BlockId) -> Result<u64, ClientError> {
        let result: String = self
            .request(
                "eth_getTransactionCount",
                vec![
                    Value::String(address.to_hex()),
                    serde_json::to_value(block)?,
                ],
            )
            .await?;
        parse_hex_u64(&result)
    }

    /// Code deployed at an address
    pub async fn get_code(&self, address: &Address, block: BlockId) -> Result<Bytes, ClientError> {
        let result: String = self
            .request(
                "eth_getCode",
                vec![
                    Value::String(address.to_hex()),
                    serde_json::to_value(block)?,
                ],
            )
            .await?;
        parse_hex_bytes(&result)
    }

    // ==================== Transactions ====================

    /// Submit a transaction through a node-managed account.
    ///
    /// Returns the transaction hash; confirmation is the caller's concern
    /// (see the harness lifecycle manager).
    pub async fn send_transaction(&self, request: &TxRequest) -> Result<H256, ClientError> {
        let result: String = self
            .request("eth_sendTransaction", vec![serde_json::to_value(request)?])
            .await?;
        H256::from_hex(&result).map_err(|e| ClientError::InvalidHex(e.to_string()))
    }

    /// Receipt for a transaction hash, or `None` while unconfirmed
    pub async fn get_receipt(&self, hash: &H256) -> Result<Option<Receipt>, ClientError> {
        let result: Option<Value> = self
            .request(
                "eth_getTransactionReceipt",
                vec![Value::String(hash.to_hex())],
            )
            .await?;
        match result {
            Some(Value::Null) | None => Ok(None),
            Some(value) => Ok(Some(deserialize_response(value)?)),
        }
    }

    // ==================== Call & Estimation ====================

    /// Execute a read-only call
    pub async fn call(&self, request: &CallRequest, block: BlockId) -> Result<Bytes, ClientError> {
        let result: String = self
            .request(
                "eth_call",
                vec![serde_json::to_value(request)?, serde_json::to_value(block)?],
            )
            .await?;
        parse_hex_bytes(&result)
    }

    /// Estimate gas for a transaction
    pub async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, ClientError> {
        let result: String = self
            .request("eth_estimateGas", vec![serde_json::to_value(request)?])
            .await?;
        parse_hex_u64(&result)
    }
}

// ==================== Hex parsing helpers ====================

fn parse_hex_u64(s: &str) -> Result<u64, ClientError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(s, 16).map_err(|e| ClientError::InvalidHex(e.to_string()))
}

fn parse_hex_u128(s: &str) -> Result<u128, ClientError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u128::from_str_radix(s, 16).map_err(|e| ClientError::InvalidHex(e.to_string()))
}

fn parse_hex_u256(s: &str) -> Result<U256, ClientError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    if s.is_empty() {
        return Err(ClientError::InvalidHex("empty quantity".to_string()));
    }
    U256::from_str_radix(s, 16).map_err(|e| ClientError::InvalidHex(e.to_string()))
}

fn parse_hex_bytes(s: &str) -> Result<Bytes, ClientError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    if s.is_empty() {
        return Ok(Bytes::new());
    }
    let bytes = hex::decode(s)?;
    Ok(Bytes::from(bytes))
}
