//! Contract call helpers

use bytes::Bytes;
use compat_primitives::Address;

use crate::abi::{decode, encode_function_call, function_selector, ParamType, Token};
use crate::ClientError;

/// Typed handle for encoding calls to and decoding returns from one contract
#[derive(Debug, Clone)]
pub struct Contract {
    address: Address,
    functions: Vec<FunctionDef>,
}

/// One function of a contract's ABI
#[derive(Debug, Clone)]
pub struct FunctionDef {
    /// Function name
    pub name: String,
    /// Canonical signature, e.g. `"balanceOf(address)"`
    pub signature: String,
    /// 4-byte selector derived from the signature
    pub selector: [u8; 4],
    /// Input parameter types
    pub inputs: Vec<ParamType>,
    /// Output parameter types
    pub outputs: Vec<ParamType>,
}

impl FunctionDef {
    /// Define a function; the selector is derived from the signature
    pub fn new(
        name: impl Into<String>,
        signature: impl Into<String>,
        inputs: Vec<ParamType>,
        outputs: Vec<ParamType>,
    ) -> Self {
        let signature = signature.into();
        let selector = function_selector(&signature);
        Self {
            name: name.into(),
            signature,
            selector,
            inputs,
            outputs,
        }
    }
}

impl Contract {
    /// Contract address
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Look up a function by name
    pub fn function(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Encode call data for a named function
    pub fn encode_call(&self, function_name: &str, args: &[Token]) -> Result<Bytes, ClientError> {
        let function = self
            .function(function_name)
            .ok_or_else(|| ClientError::Abi(format!("unknown function: {}", function_name)))?;

        if args.len() != function.inputs.len() {
            return Err(ClientError::Abi(format!(
                "{} expects {} arguments, got {}",
                function_name,
                function.inputs.len(),
                args.len()
            )));
        }

        Ok(Bytes::from(encode_function_call(function.selector, args)))
    }

    /// Decode a named function's return data
    pub fn decode_output(&self, function_name: &str, data: &[u8]) -> Result<Vec<Token>, ClientError> {
        let function = self
            .function(function_name)
            .ok_or_else(|| ClientError::Abi(format!("unknown function: {}", function_name)))?;

        decode(&function.outputs, data)
    }
}

/// Builder for contract handles
pub struct ContractBuilder {
    address: Address,
    functions: Vec<FunctionDef>,
}

impl ContractBuilder {
    /// Start a contract definition at `address`
    pub fn new(address: Address) -> Self {
        Self {
            address,
            functions: Vec::new(),
        }
    }

    /// Add a prebuilt function definition
    pub fn def(mut self, function: FunctionDef) -> Self {
        self.functions.push(function);
        self
    }

    /// Add a function
    pub fn function(
        mut self,
        name: &str,
        signature: &str,
        inputs: Vec<ParamType>,
        outputs: Vec<ParamType>,
    ) -> Self {
        self.functions
            .push(FunctionDef::new(name, signature, inputs, outputs));
        self
    }

    /// Finish the contract handle
    pub fn build(self) -> Contract {
        Contract {
            address: self.address,
            functions: self.functions,
        }
    }
}
