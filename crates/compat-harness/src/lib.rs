//! # compat-harness
//!
//! Data-driven compatibility harness for contract semantics.
//!
//! Each test case is one row of externally supplied expected values. The
//! harness deploys the scenario's contract, optionally transfers value to
//! it, invokes a query accessor, normalizes the observed values, and
//! asserts them against the row — producing exactly one [`CaseResult`]
//! per row, whatever the chain does.
//!
//! ## Design
//!
//! 1. **Deterministic verdicts**: every case ends in a pass/fail result
//!    with diagnostics; chain faults never crash a batch
//! 2. **Visible suspension**: submission and receipt polling are split, so
//!    the poll loop's deadline is explicit and testable
//! 3. **Canonical comparison**: observed and expected values meet in one
//!    normalized representation, so `"0x0"` equals `"0"` equals `0`
//!
//! ## Usage
//!
//! ```ignore
//! let client = ChainClient::connect("http://localhost:6789");
//! let runner = CaseRunner::new(client, config, scenario, sender);
//! let mut report = LogReport;
//! let summary = runner.run_batch(&rows, &mut report).await?;
//! ```

mod collector;
mod config;
mod lifecycle;
mod normalize;
mod orchestrator;
mod report;
mod row;
mod scenario;
mod scenarios;

pub use collector::{AssertionCollector, AssertionRecord, Verdict};
pub use config::HarnessConfig;
pub use lifecycle::{TransactionOutcome, TxLifecycle};
pub use normalize::{normalize_address, normalize_str, normalize_token, ComparableValue, NormalizationError};
pub use orchestrator::CaseRunner;
pub use report::{BatchSummary, CaseResult, FailureKind, LogReport, MemoryReport, ReportSink};
pub use row::{JsonRowSource, RowSource, TestCaseRow};
pub use scenario::{
    DeployedContract, QuerySpec, Scenario, BALANCE_LABEL, CONTRACT_ADDRESS_PLACEHOLDER,
};

use compat_client::ClientError;

/// Harness result type
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Harness-level errors
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// RPC/network failure
    #[error("transport error: {0}")]
    Transport(#[from] ClientError),

    /// Polling deadline exceeded
    #[error("timed out: {0}")]
    Timeout(String),

    /// Malformed value shape
    #[error(transparent)]
    Normalization(#[from] normalize::NormalizationError),

    /// A case finished without recording a single assertion
    #[error("case recorded no assertions")]
    EmptyAssertions,

    /// Case setup failed (deployment, scenario wiring)
    #[error("setup failed: {0}")]
    Setup(String),

    /// Row source failure
    #[error("row source error: {0}")]
    Row(String),
}
