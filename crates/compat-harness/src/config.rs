//! Harness configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Harness configuration.
///
/// Deserializable so a run can be driven from a config file; every field
/// has a default matching the reference compatibility scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Gas limit for deployments and transfers
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    /// Gas price in wei
    #[serde(default = "default_gas_price")]
    pub gas_price: u128,
    /// Receipt poll interval, milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Hard deadline for receipt confirmation, milliseconds
    #[serde(default = "default_receipt_timeout_ms")]
    pub receipt_timeout_ms: u64,
    /// Consecutive transient poll failures tolerated before escalating
    #[serde(default = "default_poll_retry_limit")]
    pub poll_retry_limit: u32,
    /// Receipt status code the target chain reports for success.
    ///
    /// Status conventions differ across chain versions; the reference
    /// target reports success as `0x0`.
    #[serde(default = "default_success_status")]
    pub success_status: u64,
}

fn default_gas_limit() -> u64 {
    990_000
}

fn default_gas_price() -> u128 {
    1_000_000_000
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

fn default_receipt_timeout_ms() -> u64 {
    30_000
}

fn default_poll_retry_limit() -> u32 {
    3
}

fn default_success_status() -> u64 {
    0
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            gas_limit: default_gas_limit(),
            gas_price: default_gas_price(),
            poll_interval_ms: default_poll_interval_ms(),
            receipt_timeout_ms: default_receipt_timeout_ms(),
            poll_retry_limit: default_poll_retry_limit(),
            success_status: default_success_status(),
        }
    }
}

impl HarnessConfig {
    /// Poll interval as a [`Duration`]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Receipt deadline as a [`Duration`]
    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_millis(self.receipt_timeout_ms)
    }
}
