//! Test case orchestration.
//!
//! Drives one row through deploy → transfer → balance check → query →
//! assertions. Every fault inside a case is caught at this boundary and
//! converted into a failed [`CaseResult`]; a single case can never take
//! down a batch run.

use compat_client::types::{BlockId, CallRequest, TxRequest};
use compat_client::{ChainClient, ClientError};
use compat_primitives::Address;
use tracing::{debug, error, info, warn};

use crate::collector::AssertionCollector;
use crate::lifecycle::{TransactionOutcome, TxLifecycle};
use crate::normalize::{normalize_str, normalize_token, ComparableValue};
use crate::report::{BatchSummary, CaseResult, FailureKind, ReportSink};
use crate::row::TestCaseRow;
use crate::scenario::{DeployedContract, Scenario, BALANCE_LABEL, CONTRACT_ADDRESS_PLACEHOLDER};
use crate::{HarnessConfig, HarnessError, HarnessResult};

/// A harness-level fault that aborts the remainder of a case
struct CaseFault {
    step: &'static str,
    kind: FailureKind,
    message: String,
}

impl CaseFault {
    fn new(step: &'static str, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            step,
            kind,
            message: message.into(),
        }
    }

    fn transport(step: &'static str, error: ClientError) -> Self {
        Self::new(step, FailureKind::Transport, error.to_string())
    }

    fn from_outcome(step: &'static str, outcome: TransactionOutcome) -> Self {
        match outcome {
            TransactionOutcome::Reverted(_, code) => Self::new(
                step,
                FailureKind::Setup,
                format!("transaction reverted with status {:#x}", code),
            ),
            TransactionOutcome::TimedOut => {
                Self::new(step, FailureKind::Timeout, "no receipt within deadline")
            }
            TransactionOutcome::TransportError(e) => Self::transport(step, e),
            TransactionOutcome::Confirmed(_) => {
                Self::new(step, FailureKind::Setup, "unexpected confirmed outcome")
            }
        }
    }
}

/// Runs parameterized test cases against a target node
pub struct CaseRunner {
    client: ChainClient,
    lifecycle: TxLifecycle,
    config: HarnessConfig,
    scenario: Scenario,
    sender: Address,
}

impl CaseRunner {
    /// Build a runner for one scenario.
    ///
    /// `sender` is a node-managed account with funds for deployment and
    /// the scenario's transfer.
    pub fn new(
        client: ChainClient,
        config: HarnessConfig,
        scenario: Scenario,
        sender: Address,
    ) -> Self {
        Self {
            lifecycle: TxLifecycle::from_config(&config),
            client,
            config,
            scenario,
            sender,
        }
    }

    /// The underlying chain client
    pub fn client(&self) -> &ChainClient {
        &self.client
    }

    /// Run one case to a deterministic result
    pub async fn run_case(&self, row: &TestCaseRow) -> CaseResult {
        info!(
            case = %row.id,
            name = %row.display_name,
            scenario = %self.scenario.name,
            "running case"
        );

        let mut collector = AssertionCollector::new();
        match self.execute(row, &mut collector).await {
            Ok(()) => match collector.verdict() {
                Ok(verdict) => CaseResult::from_verdict(row, verdict, collector.into_records()),
                Err(_) => CaseResult::fault(
                    row,
                    FailureKind::Setup,
                    "case recorded no assertions",
                    collector.into_records(),
                ),
            },
            Err(fault) => {
                warn!(
                    case = %row.id,
                    step = fault.step,
                    kind = %fault.kind,
                    error = %fault.message,
                    "case aborted"
                );
                CaseResult::fault(
                    row,
                    fault.kind,
                    format!("{}: {}", fault.step, fault.message),
                    collector.into_records(),
                )
            }
        }
    }

    /// Run every row, emitting one result per case to the sink.
    ///
    /// An unreachable node fails the whole batch with one escalated error
    /// rather than producing a failed result per row.
    pub async fn run_batch(
        &self,
        rows: &[TestCaseRow],
        sink: &mut dyn ReportSink,
    ) -> HarnessResult<BatchSummary> {
        if let Err(e) = self.client.chain_id().await {
            error!(error = %e, "target node unreachable, aborting batch");
            return Err(HarnessError::Transport(e));
        }

        let mut summary = BatchSummary::default();
        for row in rows {
            let result = self.run_case(row).await;
            summary.observe(&result);
            sink.record(&result);
        }
        info!(
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            "batch complete"
        );
        Ok(summary)
    }

    async fn execute(
        &self,
        row: &TestCaseRow,
        collector: &mut AssertionCollector,
    ) -> Result<(), CaseFault> {
        let deployed = self.deploy(row).await?;
        self.transfer_and_check(row, &deployed, collector).await?;
        self.query_and_assert(row, &deployed, collector).await
    }

    async fn deploy(&self, row: &TestCaseRow) -> Result<DeployedContract, CaseFault> {
        let request = TxRequest::deploy(
            self.sender,
            self.scenario.bytecode.clone(),
            self.config.gas_limit,
            self.config.gas_price,
        );

        let outcome = self.lifecycle.submit(&self.client, &request).await;
        let receipt = match outcome {
            TransactionOutcome::Confirmed(receipt) => receipt,
            other => return Err(CaseFault::from_outcome("deploy", other)),
        };

        let address = receipt.contract_address.ok_or_else(|| {
            CaseFault::new(
                "deploy",
                FailureKind::Setup,
                "deployment receipt carries no contract address",
            )
        })?;

        info!(
            case = %row.id,
            contract = %address,
            tx = %receipt.transaction_hash,
            "contract deployed"
        );
        Ok(DeployedContract {
            address,
            contract: self.scenario.contract_at(address),
            receipt,
        })
    }

    async fn transfer_and_check(
        &self,
        row: &TestCaseRow,
        deployed: &DeployedContract,
        collector: &mut AssertionCollector,
    ) -> Result<(), CaseFault> {
        let Some(value) = self.scenario.transfer_value else {
            return Ok(());
        };

        let request = TxRequest::transfer(
            self.sender,
            deployed.address,
            value,
            self.config.gas_limit,
            self.config.gas_price,
        );

        match self.lifecycle.submit(&self.client, &request).await {
            TransactionOutcome::Confirmed(receipt) => {
                info!(
                    case = %row.id,
                    contract = %deployed.address,
                    value = %value,
                    gas_used = ?receipt.gas_used,
                    "transfer confirmed"
                );
            }
            // The contract under test may legitimately reject the
            // transfer. The balance assertion below still runs, so an
            // expectation that required the transfer to land fails on
            // its own.
            outcome => {
                warn!(
                    case = %row.id,
                    contract = %deployed.address,
                    outcome = outcome.label(),
                    "transfer did not confirm"
                );
            }
        }

        if let Some(expected) = row.expected_value(BALANCE_LABEL) {
            let balance = self
                .client
                .get_balance(&deployed.address, BlockId::Latest)
                .await
                .map_err(|e| CaseFault::transport("balance", e))?;
            collector.assert_equal(
                ComparableValue::Integer(balance),
                normalize_str(expected),
                BALANCE_LABEL,
            );
        }
        Ok(())
    }

    async fn query_and_assert(
        &self,
        row: &TestCaseRow,
        deployed: &DeployedContract,
        collector: &mut AssertionCollector,
    ) -> Result<(), CaseFault> {
        let query = &self.scenario.query;
        let data = deployed
            .contract
            .encode_call(&query.function, &[])
            .map_err(|e| CaseFault::new("query", FailureKind::Setup, e.to_string()))?;

        let request = CallRequest {
            from: Some(self.sender),
            to: Some(deployed.address),
            data: Some(data),
            ..Default::default()
        };
        let raw = self
            .client
            .call(&request, BlockId::Latest)
            .await
            .map_err(|e| CaseFault::transport("query", e))?;

        let tokens = deployed
            .contract
            .decode_output(&query.function, &raw)
            .map_err(|e| CaseFault::new("query", FailureKind::Normalization, e.to_string()))?;

        if tokens.len() != query.fields.len() {
            return Err(CaseFault::new(
                "query",
                FailureKind::Normalization,
                format!(
                    "query returned {} values, scenario labels {}",
                    tokens.len(),
                    query.fields.len()
                ),
            ));
        }

        for (field, token) in query.fields.iter().zip(tokens.iter()) {
            let actual = normalize_token(token)
                .map_err(|e| CaseFault::new("query", FailureKind::Normalization, e.to_string()))?;

            match row.expected_value(field) {
                Some(raw_expected) => {
                    let resolved = self.resolve_expected(raw_expected, deployed);
                    collector.assert_equal(actual, normalize_str(&resolved), field);
                }
                None => {
                    debug!(case = %row.id, field = %field, "row carries no expectation, skipping");
                }
            }
        }
        Ok(())
    }

    /// Substitute runtime placeholders in a row's expected value
    fn resolve_expected(&self, raw: &str, deployed: &DeployedContract) -> String {
        if raw.trim() == CONTRACT_ADDRESS_PLACEHOLDER {
            deployed.address.to_hex()
        } else {
            raw.to_string()
        }
    }
}
