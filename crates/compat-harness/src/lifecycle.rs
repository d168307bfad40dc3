//! Transaction lifecycle: submit once, poll to a terminal outcome.
//!
//! Submission and confirmation are deliberately split: the suspension point
//! (the receipt poll loop) carries an explicit hard deadline and a bounded
//! transient-failure budget, so it can be exercised in isolation and never
//! blocks past its deadline.

use std::cmp;
use std::time::Duration;

use compat_client::types::{Receipt, TxRequest};
use compat_client::{ChainClient, ClientError, H256};
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::HarnessConfig;

/// Terminal outcome of one submitted transaction
#[derive(Debug)]
pub enum TransactionOutcome {
    /// Confirmed with the chain's success status
    Confirmed(Receipt),
    /// Confirmed with a non-success status code
    Reverted(Receipt, u64),
    /// No receipt within the deadline
    TimedOut,
    /// Submission or polling failed at the transport layer
    TransportError(ClientError),
}

impl TransactionOutcome {
    /// True for [`TransactionOutcome::Confirmed`]
    pub fn is_confirmed(&self) -> bool {
        matches!(self, TransactionOutcome::Confirmed(_))
    }

    /// Short tag for logs and diagnostics
    pub fn label(&self) -> &'static str {
        match self {
            TransactionOutcome::Confirmed(_) => "confirmed",
            TransactionOutcome::Reverted(..) => "reverted",
            TransactionOutcome::TimedOut => "timed-out",
            TransactionOutcome::TransportError(_) => "transport-error",
        }
    }

    /// The receipt, for outcomes that carry one
    pub fn receipt(&self) -> Option<&Receipt> {
        match self {
            TransactionOutcome::Confirmed(receipt)
            | TransactionOutcome::Reverted(receipt, _) => Some(receipt),
            _ => None,
        }
    }
}

/// Submits transactions and awaits exactly one terminal outcome per
/// submission.
#[derive(Debug, Clone)]
pub struct TxLifecycle {
    poll_interval: Duration,
    receipt_timeout: Duration,
    poll_retry_limit: u32,
    success_status: u64,
}

impl TxLifecycle {
    /// Build a lifecycle manager from harness configuration
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            receipt_timeout: config.receipt_timeout(),
            poll_retry_limit: config.poll_retry_limit,
            success_status: config.success_status,
        }
    }

    /// Submit a transaction and await its terminal outcome.
    ///
    /// The configured receipt timeout bounds the wait. The returned future
    /// is cancel-safe: dropping it abandons the poll loop without leaking a
    /// background wait (polling is read-only).
    pub async fn submit(&self, client: &ChainClient, request: &TxRequest) -> TransactionOutcome {
        self.submit_until(client, request, Instant::now() + self.receipt_timeout)
            .await
    }

    /// Submit with an externally imposed deadline.
    ///
    /// Submission happens exactly once; a submission failure is terminal
    /// (resubmitting risks a double spend or duplicate deployment).
    pub async fn submit_until(
        &self,
        client: &ChainClient,
        request: &TxRequest,
        deadline: Instant,
    ) -> TransactionOutcome {
        let hash = match client.send_transaction(request).await {
            Ok(hash) => hash,
            Err(e) => {
                warn!(error = %e, "transaction submission failed");
                return TransactionOutcome::TransportError(e);
            }
        };
        debug!(tx = %hash, "transaction submitted, awaiting receipt");
        self.await_receipt(client, &hash, deadline).await
    }

    async fn await_receipt(
        &self,
        client: &ChainClient,
        hash: &H256,
        deadline: Instant,
    ) -> TransactionOutcome {
        let mut consecutive_failures = 0u32;

        loop {
            if Instant::now() >= deadline {
                warn!(tx = %hash, "receipt deadline exceeded");
                return TransactionOutcome::TimedOut;
            }

            match client.get_receipt(hash).await {
                Ok(Some(receipt)) => return self.classify(receipt),
                Ok(None) => {
                    consecutive_failures = 0;
                    debug!(tx = %hash, "no receipt yet");
                }
                Err(e) => {
                    consecutive_failures += 1;
                    if consecutive_failures > self.poll_retry_limit {
                        warn!(tx = %hash, error = %e, "receipt poll retries exhausted");
                        return TransactionOutcome::TransportError(e);
                    }
                    debug!(tx = %hash, error = %e, attempt = consecutive_failures,
                        "transient receipt poll failure, retrying");
                }
            }

            let now = Instant::now();
            if now >= deadline {
                warn!(tx = %hash, "receipt deadline exceeded");
                return TransactionOutcome::TimedOut;
            }
            sleep(cmp::min(self.poll_interval, deadline - now)).await;
        }
    }

    fn classify(&self, receipt: Receipt) -> TransactionOutcome {
        let code = receipt.status_code();
        if code == self.success_status {
            TransactionOutcome::Confirmed(receipt)
        } else {
            debug!(tx = %receipt.transaction_hash, status = code, "transaction reverted on chain");
            TransactionOutcome::Reverted(receipt, code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compat_client::{Address, MockTransport, U256};
    use serde_json::{json, Value};
    use std::sync::Arc;

    const TX_HASH: &str = "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b";

    fn receipt_json(status: &str) -> Value {
        json!({
            "transactionHash": TX_HASH,
            "blockNumber": "0x10",
            "gasUsed": "0x5208",
            "status": status,
        })
    }

    fn transfer_request() -> TxRequest {
        TxRequest::transfer(
            Address::from_bytes([0x11; 20]),
            Address::from_bytes([0x22; 20]),
            U256::from(300u64),
            990_000,
            1_000_000_000,
        )
    }

    fn lifecycle() -> TxLifecycle {
        TxLifecycle::from_config(&HarnessConfig::default())
    }

    fn client_with(mock: &Arc<MockTransport>) -> ChainClient {
        mock.set_response("eth_sendTransaction", Value::String(TX_HASH.into()));
        ChainClient::with_transport(Arc::clone(mock))
    }

    #[tokio::test(start_paused = true)]
    async fn confirmed_after_pending_polls() {
        let mock = Arc::new(MockTransport::new());
        let client = client_with(&mock);
        mock.push_response("eth_getTransactionReceipt", Value::Null);
        mock.push_response("eth_getTransactionReceipt", Value::Null);
        mock.push_response("eth_getTransactionReceipt", receipt_json("0x0"));

        let outcome = lifecycle().submit(&client, &transfer_request()).await;

        assert!(outcome.is_confirmed());
        assert_eq!(mock.call_count("eth_sendTransaction"), 1);
        assert_eq!(mock.call_count("eth_getTransactionReceipt"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn non_success_status_is_reverted() {
        let mock = Arc::new(MockTransport::new());
        let client = client_with(&mock);
        mock.push_response("eth_getTransactionReceipt", receipt_json("0x1"));

        let outcome = lifecycle().submit(&client, &transfer_request()).await;

        match outcome {
            TransactionOutcome::Reverted(receipt, code) => {
                assert_eq!(code, 1);
                assert_eq!(receipt.gas_used, Some(21_000));
            }
            other => panic!("expected Reverted, got {}", other.label()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn success_status_is_configurable() {
        let mock = Arc::new(MockTransport::new());
        let client = client_with(&mock);
        mock.push_response("eth_getTransactionReceipt", receipt_json("0x1"));

        let config = HarnessConfig {
            success_status: 1,
            ..HarnessConfig::default()
        };
        let outcome = TxLifecycle::from_config(&config)
            .submit(&client, &transfer_request())
            .await;

        assert!(outcome.is_confirmed());
    }

    #[tokio::test(start_paused = true)]
    async fn submission_failure_is_terminal_and_never_polls() {
        let mock = Arc::new(MockTransport::new());
        mock.push_transport_error("eth_sendTransaction", "connection refused");
        let client = ChainClient::with_transport(Arc::clone(&mock));

        let outcome = lifecycle().submit(&client, &transfer_request()).await;

        assert!(matches!(outcome, TransactionOutcome::TransportError(_)));
        assert_eq!(mock.call_count("eth_sendTransaction"), 1);
        assert_eq!(mock.call_count("eth_getTransactionReceipt"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn no_receipt_times_out_at_deadline() {
        let mock = Arc::new(MockTransport::new());
        let client = client_with(&mock);
        mock.set_response("eth_getTransactionReceipt", Value::Null);

        let started = Instant::now();
        let outcome = lifecycle().submit(&client, &transfer_request()).await;
        let elapsed = started.elapsed();

        assert!(matches!(outcome, TransactionOutcome::TimedOut));
        // Deadline plus at most one poll interval of overhead
        assert!(elapsed >= Duration::from_secs(30));
        assert!(elapsed <= Duration::from_secs(31));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_poll_failures_are_retried() {
        let mock = Arc::new(MockTransport::new());
        let client = client_with(&mock);
        mock.push_transport_error("eth_getTransactionReceipt", "flaky");
        mock.push_transport_error("eth_getTransactionReceipt", "flaky");
        mock.push_response("eth_getTransactionReceipt", receipt_json("0x0"));

        let outcome = lifecycle().submit(&client, &transfer_request()).await;

        assert!(outcome.is_confirmed());
    }

    #[tokio::test(start_paused = true)]
    async fn consecutive_poll_failures_escalate() {
        let mock = Arc::new(MockTransport::new());
        let client = client_with(&mock);
        for _ in 0..4 {
            mock.push_transport_error("eth_getTransactionReceipt", "down");
        }

        let outcome = lifecycle().submit(&client, &transfer_request()).await;

        assert!(matches!(outcome, TransactionOutcome::TransportError(_)));
        // 3 retries tolerated, the 4th consecutive failure escalates
        assert_eq!(mock.call_count("eth_getTransactionReceipt"), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_poll_resets_failure_budget() {
        let mock = Arc::new(MockTransport::new());
        let client = client_with(&mock);
        // Three failures, a pending poll, then three more failures: the
        // budget resets and the final receipt is still reached.
        for _ in 0..3 {
            mock.push_transport_error("eth_getTransactionReceipt", "flaky");
        }
        mock.push_response("eth_getTransactionReceipt", Value::Null);
        for _ in 0..3 {
            mock.push_transport_error("eth_getTransactionReceipt", "flaky");
        }
        mock.push_response("eth_getTransactionReceipt", receipt_json("0x0"));

        let outcome = lifecycle().submit(&client, &transfer_request()).await;

        assert!(outcome.is_confirmed());
    }

    #[tokio::test(start_paused = true)]
    async fn external_deadline_is_honored() {
        let mock = Arc::new(MockTransport::new());
        let client = client_with(&mock);
        mock.set_response("eth_getTransactionReceipt", Value::Null);

        let started = Instant::now();
        let outcome = lifecycle()
            .submit_until(&client, &transfer_request(), started + Duration::from_secs(5))
            .await;

        assert!(matches!(outcome, TransactionOutcome::TimedOut));
        assert!(started.elapsed() <= Duration::from_secs(6));
    }
}
