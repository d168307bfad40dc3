//! RPC request and response types

use bytes::Bytes;
use compat_primitives::{Address, H256, U256};
use serde::{Deserialize, Serialize};

/// Render a U256 as a minimal 0x-hex quantity
pub(crate) fn u256_to_hex(value: &U256) -> String {
    if value.is_zero() {
        return "0x0".to_string();
    }
    format!("0x{:x}", value)
}

/// Serde helpers for 0x-hex quantity fields
mod quantity {
    use serde::{Deserialize, Deserializer};

    pub fn parse_u64(s: &str) -> Result<u64, String> {
        let trimmed = s.strip_prefix("0x").unwrap_or(s);
        u64::from_str_radix(trimmed, 16).map_err(|e| format!("invalid quantity {:?}: {}", s, e))
    }

    pub fn deserialize_opt<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        let s: Option<String> = Option::deserialize(d)?;
        match s {
            Some(s) => parse_u64(&s).map(Some).map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

/// Block identifier for RPC queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockId {
    /// Specific block number
    Number(u64),
    /// Latest block
    #[default]
    Latest,
    /// Pending block (includes pending transactions)
    Pending,
    /// Earliest block (genesis)
    Earliest,
}

impl Serialize for BlockId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            BlockId::Number(n) => serializer.serialize_str(&format!("0x{:x}", n)),
            BlockId::Latest => serializer.serialize_str("latest"),
            BlockId::Pending => serializer.serialize_str("pending"),
            BlockId::Earliest => serializer.serialize_str("earliest"),
        }
    }
}

/// Read-only call request for `eth_call` and `eth_estimateGas`
#[derive(Debug, Clone, Default)]
pub struct CallRequest {
    /// Sender address
    pub from: Option<Address>,
    /// Target contract
    pub to: Option<Address>,
    /// Gas limit
    pub gas: Option<u64>,
    /// Gas price
    pub gas_price: Option<u128>,
    /// Value to transfer
    pub value: Option<U256>,
    /// Input data
    pub data: Option<Bytes>,
}

impl Serialize for CallRequest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(None)?;
        if let Some(from) = &self.from {
            map.serialize_entry("from", &from.to_hex())?;
        }
        if let Some(to) = &self.to {
            map.serialize_entry("to", &to.to_hex())?;
        }
        if let Some(gas) = &self.gas {
            map.serialize_entry("gas", &format!("0x{:x}", gas))?;
        }
        if let Some(gas_price) = &self.gas_price {
            map.serialize_entry("gasPrice", &format!("0x{:x}", gas_price))?;
        }
        if let Some(value) = &self.value {
            map.serialize_entry("value", &u256_to_hex(value))?;
        }
        if let Some(data) = &self.data {
            map.serialize_entry("data", &format!("0x{}", hex::encode(data)))?;
        }
        map.end()
    }
}

/// State-mutating transaction request for `eth_sendTransaction`.
///
/// `to = None` deploys the payload as a contract.
#[derive(Debug, Clone)]
pub struct TxRequest {
    /// Sender address (a node-managed account)
    pub from: Address,
    /// Recipient; `None` for contract creation
    pub to: Option<Address>,
    /// Gas limit
    pub gas: u64,
    /// Gas price
    pub gas_price: u128,
    /// Value to transfer
    pub value: U256,
    /// Call data or deployment bytecode
    pub data: Bytes,
}

impl TxRequest {
    /// A plain value transfer
    pub fn transfer(from: Address, to: Address, value: U256, gas: u64, gas_price: u128) -> Self {
        Self {
            from,
            to: Some(to),
            gas,
            gas_price,
            value,
            data: Bytes::new(),
        }
    }

    /// A contract deployment carrying init bytecode
    pub fn deploy(from: Address, bytecode: Bytes, gas: u64, gas_price: u128) -> Self {
        Self {
            from,
            to: None,
            gas,
            gas_price,
            value: U256::zero(),
            data: bytecode,
        }
    }
}

impl Serialize for TxRequest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("from", &self.from.to_hex())?;
        if let Some(to) = &self.to {
            map.serialize_entry("to", &to.to_hex())?;
        }
        map.serialize_entry("gas", &format!("0x{:x}", self.gas))?;
        map.serialize_entry("gasPrice", &format!("0x{:x}", self.gas_price))?;
        map.serialize_entry("value", &u256_to_hex(&self.value))?;
        if !self.data.is_empty() {
            map.serialize_entry("data", &format!("0x{}", hex::encode(&self.data)))?;
        }
        map.end()
    }
}

/// Chain-confirmed execution record of a transaction
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// Hash of the confirmed transaction
    pub transaction_hash: H256,
    /// Block the transaction was included in
    #[serde(default, deserialize_with = "quantity::deserialize_opt")]
    pub block_number: Option<u64>,
    /// Gas consumed by the transaction
    #[serde(default, deserialize_with = "quantity::deserialize_opt")]
    pub gas_used: Option<u64>,
    /// Execution status code; conventions differ across target chains
    #[serde(default, deserialize_with = "quantity::deserialize_opt")]
    pub status: Option<u64>,
    /// Created contract address, for deployment transactions
    #[serde(default)]
    pub contract_address: Option<Address>,
}

impl Receipt {
    /// Status code, defaulting to 0 for pre-Byzantium style receipts
    pub fn status_code(&self) -> u64 {
        self.status.unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_id_serializes_as_tag_or_hex() {
        assert_eq!(serde_json::to_string(&BlockId::Latest).unwrap(), "\"latest\"");
        assert_eq!(
            serde_json::to_string(&BlockId::Number(256)).unwrap(),
            "\"0x100\""
        );
        assert_eq!(
            serde_json::to_string(&BlockId::Pending).unwrap(),
            "\"pending\""
        );
    }

    #[test]
    fn call_request_skips_unset_fields() {
        let req = CallRequest {
            to: Some(Address::ZERO),
            data: Some(Bytes::from(vec![0x01, 0x02])),
            ..Default::default()
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["to"], "0x0000000000000000000000000000000000000000");
        assert_eq!(json["data"], "0x0102");
        assert!(json.get("from").is_none());
        assert!(json.get("value").is_none());
    }

    #[test]
    fn tx_request_transfer_shape() {
        let from = Address::from_bytes([0x11; 20]);
        let to = Address::from_bytes([0x22; 20]);
        let req = TxRequest::transfer(from, to, U256::from(300u64), 990_000, 1_000_000_000);
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["from"], from.to_hex());
        assert_eq!(json["to"], to.to_hex());
        assert_eq!(json["gas"], "0xf1b30");
        assert_eq!(json["gasPrice"], "0x3b9aca00");
        assert_eq!(json["value"], "0x12c");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn tx_request_deploy_omits_to() {
        let from = Address::from_bytes([0x11; 20]);
        let req = TxRequest::deploy(from, Bytes::from(vec![0x60, 0x00]), 990_000, 1_000_000_000);
        let json = serde_json::to_value(&req).unwrap();

        assert!(json.get("to").is_none());
        assert_eq!(json["value"], "0x0");
        assert_eq!(json["data"], "0x6000");
    }

    #[test]
    fn receipt_deserializes_camel_case_quantities() {
        let json = serde_json::json!({
            "transactionHash": "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b",
            "blockNumber": "0x10",
            "gasUsed": "0x5208",
            "status": "0x0",
            "contractAddress": "0x742d35cc6634c0532925a3b844bc9e7595f0ab3d",
        });
        let receipt: Receipt = serde_json::from_value(json).unwrap();
        assert_eq!(receipt.block_number, Some(16));
        assert_eq!(receipt.gas_used, Some(21_000));
        assert_eq!(receipt.status_code(), 0);
        assert!(receipt.contract_address.is_some());
    }

    #[test]
    fn receipt_tolerates_missing_optionals() {
        let json = serde_json::json!({
            "transactionHash": "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b",
            "contractAddress": null,
        });
        let receipt: Receipt = serde_json::from_value(json).unwrap();
        assert_eq!(receipt.status, None);
        assert_eq!(receipt.contract_address, None);
    }

    #[test]
    fn u256_hex_rendering() {
        assert_eq!(u256_to_hex(&U256::zero()), "0x0");
        assert_eq!(u256_to_hex(&U256::from(300u64)), "0x12c");
    }
}
