//! Minimal Solidity ABI encoding and decoding.
//!
//! Covers the shapes compatibility scenarios exercise: the static types
//! (`address`, `uint<N>`, `bool`, `bytes<N>`), dynamic `bytes`/`string`,
//! and tuples of the above. Arrays and nested dynamic tuples are out of
//! scope for this harness.

use compat_primitives::{Address, U256};
use sha3::{Digest, Keccak256};

use crate::ClientError;

/// Decoded ABI value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Address (20 bytes)
    Address(Address),
    /// Unsigned integer (8-256 bits)
    Uint(U256),
    /// Boolean
    Bool(bool),
    /// Dynamic byte string
    Bytes(Vec<u8>),
    /// Fixed-size byte string (1-32 bytes)
    FixedBytes(Vec<u8>),
    /// UTF-8 string
    String(String),
    /// Ordered tuple of values
    Tuple(Vec<Token>),
}

/// ABI parameter type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// Address
    Address,
    /// Unsigned integer with bit width (8, 16, ..., 256)
    Uint(usize),
    /// Boolean
    Bool,
    /// Dynamic byte string
    Bytes,
    /// Fixed-size byte string
    FixedBytes(usize),
    /// UTF-8 string
    String,
    /// Tuple of static types
    Tuple(Vec<ParamType>),
}

impl ParamType {
    /// True for types encoded in the tail with a head offset
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::Bytes | ParamType::String => true,
            ParamType::Tuple(inner) => inner.iter().any(|t| t.is_dynamic()),
            _ => false,
        }
    }
}

/// Keccak-256 of `data`
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// First 4 bytes of the Keccak-256 hash of a function signature
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash[..4]);
    selector
}

/// Encode call data: selector followed by encoded arguments
pub fn encode_function_call(selector: [u8; 4], tokens: &[Token]) -> Vec<u8> {
    let mut result = selector.to_vec();
    result.extend(encode(tokens));
    result
}

/// Encode tokens according to the ABI head/tail layout
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let head_size: usize = tokens.len() * 32;
    let mut head = Vec::new();
    let mut tail = Vec::new();

    for token in tokens {
        if token_is_dynamic(token) {
            head.extend(encode_u256(&U256::from(head_size + tail.len())));
            tail.extend(encode_tail(token));
        } else {
            head.extend(encode_static(token));
        }
    }

    head.extend(tail);
    head
}

fn token_is_dynamic(token: &Token) -> bool {
    match token {
        Token::Bytes(_) | Token::String(_) => true,
        Token::Tuple(inner) => inner.iter().any(token_is_dynamic),
        _ => false,
    }
}

fn encode_static(token: &Token) -> Vec<u8> {
    match token {
        Token::Address(addr) => {
            let mut buf = [0u8; 32];
            buf[12..32].copy_from_slice(addr.as_bytes());
            buf.to_vec()
        }
        Token::Uint(value) => encode_u256(value),
        Token::Bool(b) => {
            let mut buf = [0u8; 32];
            buf[31] = u8::from(*b);
            buf.to_vec()
        }
        Token::FixedBytes(data) => {
            let mut buf = [0u8; 32];
            let len = data.len().min(32);
            buf[..len].copy_from_slice(&data[..len]);
            buf.to_vec()
        }
        Token::Tuple(inner) => inner.iter().flat_map(encode_static).collect(),
        // Dynamic tokens never reach here
        Token::Bytes(_) | Token::String(_) => Vec::new(),
    }
}

fn encode_tail(token: &Token) -> Vec<u8> {
    match token {
        Token::Bytes(data) => encode_byte_string(data),
        Token::String(s) => encode_byte_string(s.as_bytes()),
        Token::Tuple(inner) => encode(inner),
        _ => Vec::new(),
    }
}

fn encode_u256(value: &U256) -> Vec<u8> {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    bytes.to_vec()
}

fn encode_byte_string(data: &[u8]) -> Vec<u8> {
    let mut result = encode_u256(&U256::from(data.len()));
    let padded_len = data.len().div_ceil(32) * 32;
    let mut padded = vec![0u8; padded_len];
    padded[..data.len()].copy_from_slice(data);
    result.extend(padded);
    result
}

/// Decode tokens from ABI-encoded return data
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, ClientError> {
    let mut offset = 0;
    let mut tokens = Vec::with_capacity(types.len());

    for param_type in types {
        let (token, consumed) = decode_token(param_type, data, offset)?;
        tokens.push(token);
        offset += consumed;
    }

    Ok(tokens)
}

fn decode_token(
    param_type: &ParamType,
    data: &[u8],
    offset: usize,
) -> Result<(Token, usize), ClientError> {
    match param_type {
        ParamType::Address => {
            check_length(data, offset + 32)?;
            let addr = Address::from_slice(&data[offset + 12..offset + 32])
                .map_err(|e| ClientError::Abi(e.to_string()))?;
            Ok((Token::Address(addr), 32))
        }
        ParamType::Uint(_) => {
            check_length(data, offset + 32)?;
            let value = U256::from_big_endian(&data[offset..offset + 32]);
            Ok((Token::Uint(value), 32))
        }
        ParamType::Bool => {
            check_length(data, offset + 32)?;
            Ok((Token::Bool(data[offset + 31] != 0), 32))
        }
        ParamType::FixedBytes(size) => {
            check_length(data, offset + 32)?;
            if *size > 32 {
                return Err(ClientError::Abi(format!("bytes{} exceeds word size", size)));
            }
            Ok((Token::FixedBytes(data[offset..offset + size].to_vec()), 32))
        }
        ParamType::Bytes => {
            let data_offset = read_offset(data, offset)?;
            let (bytes, _) = decode_byte_string(data, data_offset)?;
            Ok((Token::Bytes(bytes), 32))
        }
        ParamType::String => {
            let data_offset = read_offset(data, offset)?;
            let (bytes, _) = decode_byte_string(data, data_offset)?;
            let s = String::from_utf8(bytes)
                .map_err(|e| ClientError::Abi(format!("invalid utf-8: {}", e)))?;
            Ok((Token::String(s), 32))
        }
        ParamType::Tuple(types) => {
            let mut tokens = Vec::with_capacity(types.len());
            let mut inner_offset = offset;
            for inner_type in types {
                let (token, consumed) = decode_token(inner_type, data, inner_offset)?;
                tokens.push(token);
                inner_offset += consumed;
            }
            Ok((Token::Tuple(tokens), inner_offset - offset))
        }
    }
}

fn read_offset(data: &[u8], offset: usize) -> Result<usize, ClientError> {
    check_length(data, offset + 32)?;
    let value = U256::from_big_endian(&data[offset..offset + 32]);
    if value > U256::from(usize::MAX) {
        return Err(ClientError::Abi("offset out of range".to_string()));
    }
    Ok(value.as_usize())
}

fn decode_byte_string(data: &[u8], offset: usize) -> Result<(Vec<u8>, usize), ClientError> {
    check_length(data, offset + 32)?;
    let len = U256::from_big_endian(&data[offset..offset + 32]);
    if len > U256::from(usize::MAX) {
        return Err(ClientError::Abi("length out of range".to_string()));
    }
    let len = len.as_usize();
    check_length(data, offset + 32 + len)?;
    let bytes = data[offset + 32..offset + 32 + len].to_vec();
    let padded_len = len.div_ceil(32) * 32;
    Ok((bytes, 32 + padded_len))
}

fn check_length(data: &[u8], required: usize) -> Result<(), ClientError> {
    if data.len() < required {
        return Err(ClientError::Abi(format!(
            "insufficient data: need {} bytes, have {}",
            required,
            data.len()
        )));
    }
    Ok(())
}
