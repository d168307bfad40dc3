//! Per-case assertion collection.
//!
//! One collector lives for the duration of one test case and is discarded
//! at the case boundary; there is no cross-case state. Failures are
//! recorded rather than raised, so every assertion in a case executes.

use tracing::{debug, warn};

use crate::normalize::{normalize_str, ComparableValue};
use crate::{HarnessError, HarnessResult};

/// One recorded comparison
#[derive(Debug, Clone)]
pub struct AssertionRecord {
    /// Assertion label, surfaced in diagnostics
    pub label: String,
    /// Observed value, canonical form
    pub actual: ComparableValue,
    /// Expected value, canonical form
    pub expected: ComparableValue,
    /// Comparison result
    pub passed: bool,
}

/// Case-level verdict
#[derive(Debug, Clone)]
pub struct Verdict {
    /// Logical AND of all recorded assertions
    pub passed: bool,
    /// Labels of failing assertions, in recording order
    pub failing: Vec<String>,
}

/// Accumulates (actual, expected, label) triples for one test case
#[derive(Debug, Default)]
pub struct AssertionCollector {
    records: Vec<AssertionRecord>,
}

impl AssertionCollector {
    /// Fresh collector for one case
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one comparison of canonical values; returns whether it passed
    pub fn assert_equal(
        &mut self,
        actual: ComparableValue,
        expected: ComparableValue,
        label: &str,
    ) -> bool {
        let passed = actual == expected;
        if passed {
            debug!(label, "assertion passed");
        } else {
            warn!(label, actual = %actual, expected = %expected, "assertion failed");
        }
        self.records.push(AssertionRecord {
            label: label.to_string(),
            actual,
            expected,
            passed,
        });
        passed
    }

    /// Record one comparison of raw strings, normalizing both sides first
    pub fn assert_equal_raw(&mut self, actual: &str, expected: &str, label: &str) -> bool {
        self.assert_equal(normalize_str(actual), normalize_str(expected), label)
    }

    /// Number of recorded assertions
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Recorded assertions, in order
    pub fn records(&self) -> &[AssertionRecord] {
        &self.records
    }

    /// Consume the collector, yielding its records
    pub fn into_records(self) -> Vec<AssertionRecord> {
        self.records
    }

    /// Case verdict. A case that recorded no assertions is a harness
    /// design error, not a pass.
    pub fn verdict(&self) -> HarnessResult<Verdict> {
        if self.records.is_empty() {
            return Err(HarnessError::EmptyAssertions);
        }
        let failing: Vec<String> = self
            .records
            .iter()
            .filter(|r| !r.passed)
            .map(|r| r.label.clone())
            .collect();
        Ok(Verdict {
            passed: failing.is_empty(),
            failing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compat_primitives::U256;

    #[test]
    fn all_passing_yields_true_verdict() {
        let mut collector = AssertionCollector::new();
        collector.assert_equal_raw("300", "0x12c", "balance");
        collector.assert_equal_raw("0", "0x0", "counter");

        let verdict = collector.verdict().unwrap();
        assert!(verdict.passed);
        assert!(verdict.failing.is_empty());
        assert_eq!(collector.len(), 2);
    }

    #[test]
    fn single_failure_fails_case_and_names_label() {
        let mut collector = AssertionCollector::new();
        collector.assert_equal_raw("1", "1", "first");
        collector.assert_equal_raw("2", "3", "second");
        collector.assert_equal_raw("4", "4", "third");

        let verdict = collector.verdict().unwrap();
        assert!(!verdict.passed);
        assert_eq!(verdict.failing, vec!["second".to_string()]);
    }

    #[test]
    fn failures_keep_recording_order() {
        let mut collector = AssertionCollector::new();
        collector.assert_equal_raw("a", "b", "one");
        collector.assert_equal_raw("c", "c", "two");
        collector.assert_equal_raw("d", "e", "three");

        let verdict = collector.verdict().unwrap();
        assert_eq!(verdict.failing, vec!["one".to_string(), "three".to_string()]);
    }

    #[test]
    fn empty_collector_is_flagged() {
        let collector = AssertionCollector::new();
        assert!(matches!(
            collector.verdict(),
            Err(HarnessError::EmptyAssertions)
        ));
    }

    #[test]
    fn representation_differences_do_not_fail() {
        let mut collector = AssertionCollector::new();
        collector.assert_equal_raw(
            "0x742D35CC6634C0532925A3B844BC9E7595F0AB3D",
            "0x742d35cc6634c0532925a3b844bc9e7595f0ab3d",
            "address",
        );
        collector.assert_equal(
            ComparableValue::Integer(U256::from(300u64)),
            normalize_str(" 300 "),
            "amount",
        );
        assert!(collector.verdict().unwrap().passed);
    }

    #[test]
    fn records_expose_actual_and_expected() {
        let mut collector = AssertionCollector::new();
        collector.assert_equal_raw("2", "3", "only");

        let records = collector.into_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].actual, ComparableValue::Integer(U256::from(2u64)));
        assert_eq!(records[0].expected, ComparableValue::Integer(U256::from(3u64)));
        assert!(!records[0].passed);
    }
}
