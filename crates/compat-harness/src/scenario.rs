//! Scenario definitions: what to deploy, what to call, what to compare

use bytes::Bytes;
use compat_client::abi::ParamType;
use compat_client::types::Receipt;
use compat_client::{Contract, ContractBuilder, FunctionDef};
use compat_primitives::{Address, U256};

/// Row label carrying the expected post-transfer contract balance
pub const BALANCE_LABEL: &str = "balance_after_transfer";

/// Placeholder in an expected value that resolves to the per-case
/// deployment address at runtime
pub const CONTRACT_ADDRESS_PLACEHOLDER: &str = "@contract_address";

/// The query step of a scenario: which accessor to call and how to label
/// its positional return values for per-field assertions
#[derive(Debug, Clone)]
pub struct QuerySpec {
    /// Name of the accessor function (must exist in the scenario ABI)
    pub function: String,
    /// One label per return value, in positional order
    pub fields: Vec<String>,
}

/// One compatibility scenario: contract under test plus the operations the
/// orchestrator drives against it.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Scenario name, surfaced in logs
    pub name: String,
    /// Deployment bytecode of the contract under test
    pub bytecode: Bytes,
    /// ABI of the functions the scenario touches
    pub functions: Vec<FunctionDef>,
    /// Query accessor and its field labels
    pub query: QuerySpec,
    /// Value to transfer to the deployed contract, if the scenario
    /// exercises transfer behavior
    pub transfer_value: Option<U256>,
}

impl Scenario {
    /// ABI handle bound to a deployed instance
    pub fn contract_at(&self, address: Address) -> Contract {
        let mut builder = ContractBuilder::new(address);
        for function in &self.functions {
            builder = builder.def(function.clone());
        }
        builder.build()
    }

    /// Override the transfer value (or disable the transfer step)
    pub fn with_transfer_value(mut self, value: Option<U256>) -> Self {
        self.transfer_value = value;
        self
    }

    /// The address-members probe: deploys a contract whose accessor reports
    /// its own address and two zero-initialized counters, and transfers 300
    /// native units to it first.
    pub fn address_probe(bytecode: Bytes) -> Self {
        let one_unit = U256::from(10u64).pow(U256::from(18u64));
        Self {
            name: "address-probe".to_string(),
            bytecode,
            functions: vec![FunctionDef::new(
                "addressCheck",
                "addressCheck()",
                vec![],
                vec![
                    ParamType::Address,
                    ParamType::Uint(256),
                    ParamType::Uint(256),
                ],
            )],
            query: QuerySpec {
                function: "addressCheck".to_string(),
                fields: vec![
                    "self_address".to_string(),
                    "sent_count".to_string(),
                    "received_count".to_string(),
                ],
            },
            transfer_value: Some(U256::from(300u64) * one_unit),
        }
    }
}

/// Result of deploying the scenario contract for one case
#[derive(Debug)]
pub struct DeployedContract {
    /// Address the contract landed at
    pub address: Address,
    /// Receipt of the deploying transaction
    pub receipt: Receipt,
    /// ABI handle bound to the deployed address
    pub contract: Contract,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_probe_shape() {
        let scenario = Scenario::address_probe(Bytes::from(vec![0x60, 0x00]));
        assert_eq!(scenario.query.fields.len(), 3);
        assert_eq!(
            scenario.transfer_value,
            Some(U256::from_dec_str("300000000000000000000").unwrap())
        );

        let contract = scenario.contract_at(Address::from_bytes([0x42; 20]));
        assert!(contract.function("addressCheck").is_some());
    }

    #[test]
    fn transfer_value_override() {
        let scenario =
            Scenario::address_probe(Bytes::new()).with_transfer_value(Some(U256::from(300u64)));
        assert_eq!(scenario.transfer_value, Some(U256::from(300u64)));

        let no_transfer = Scenario::address_probe(Bytes::new()).with_transfer_value(None);
        assert!(no_transfer.transfer_value.is_none());
    }
}
