//! Case results, batch summaries, and the reporting interface

use std::fmt;

use tracing::{info, warn};

use crate::collector::{AssertionRecord, Verdict};
use crate::row::TestCaseRow;

/// Classifies why a case failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// One or more recorded assertions failed
    Assertion,
    /// RPC/network failure
    Transport,
    /// Receipt polling deadline exceeded
    Timeout,
    /// Malformed value shape
    Normalization,
    /// Case setup failed (deployment, scenario wiring, empty case)
    Setup,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Assertion => "assertion",
            FailureKind::Transport => "transport",
            FailureKind::Timeout => "timeout",
            FailureKind::Normalization => "normalization",
            FailureKind::Setup => "setup",
        };
        f.write_str(s)
    }
}

/// Outcome of one test case
#[derive(Debug, Clone)]
pub struct CaseResult {
    /// Row identifier
    pub case_id: String,
    /// Human-readable case name
    pub display_name: String,
    /// Case verdict
    pub passed: bool,
    /// Failure classification, `None` when passed
    pub failure_kind: Option<FailureKind>,
    /// Labels of failing assertions, in recording order
    pub failing_labels: Vec<String>,
    /// Every assertion the case recorded
    pub records: Vec<AssertionRecord>,
    /// Harness-level error message, for non-assertion failures
    pub error: Option<String>,
}

impl CaseResult {
    /// Build a result from a completed case's verdict and records
    pub fn from_verdict(row: &TestCaseRow, verdict: Verdict, records: Vec<AssertionRecord>) -> Self {
        Self {
            case_id: row.id.clone(),
            display_name: row.display_name.clone(),
            passed: verdict.passed,
            failure_kind: (!verdict.passed).then_some(FailureKind::Assertion),
            failing_labels: verdict.failing,
            records,
            error: None,
        }
    }

    /// Build a failed result for a case aborted by a harness-level fault.
    ///
    /// Assertions recorded before the fault are preserved for diagnostics.
    pub fn fault(
        row: &TestCaseRow,
        kind: FailureKind,
        message: impl Into<String>,
        records: Vec<AssertionRecord>,
    ) -> Self {
        let failing_labels = records
            .iter()
            .filter(|r| !r.passed)
            .map(|r| r.label.clone())
            .collect();
        Self {
            case_id: row.id.clone(),
            display_name: row.display_name.clone(),
            passed: false,
            failure_kind: Some(kind),
            failing_labels,
            records,
            error: Some(message.into()),
        }
    }

    /// The primary diagnostic: the first failing label, or the fault message
    pub fn primary_diagnostic(&self) -> Option<&str> {
        self.failing_labels
            .first()
            .map(String::as_str)
            .or(self.error.as_deref())
    }
}

/// Receives one result per case (the external reporting collaborator)
pub trait ReportSink {
    /// Record one case result
    fn record(&mut self, result: &CaseResult);
}

/// Report sink that logs each result via tracing
#[derive(Debug, Default)]
pub struct LogReport;

impl ReportSink for LogReport {
    fn record(&mut self, result: &CaseResult) {
        if result.passed {
            info!(
                case = %result.case_id,
                name = %result.display_name,
                assertions = result.records.len(),
                "case passed"
            );
        } else {
            warn!(
                case = %result.case_id,
                name = %result.display_name,
                kind = %result.failure_kind.map(|k| k.to_string()).unwrap_or_default(),
                diagnostic = result.primary_diagnostic().unwrap_or("-"),
                failing = ?result.failing_labels,
                "case failed"
            );
        }
    }
}

/// Report sink that retains every result (useful in tests)
#[derive(Debug, Default)]
pub struct MemoryReport {
    /// Recorded results, in run order
    pub results: Vec<CaseResult>,
}

impl ReportSink for MemoryReport {
    fn record(&mut self, result: &CaseResult) {
        self.results.push(result.clone());
    }
}

/// Batch-level totals
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchSummary {
    /// Cases run
    pub total: usize,
    /// Cases that passed
    pub passed: usize,
    /// Cases that failed
    pub failed: usize,
}

impl BatchSummary {
    /// Fold one result into the totals
    pub fn observe(&mut self, result: &CaseResult) {
        self.total += 1;
        if result.passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
    }
}
