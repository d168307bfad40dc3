//! Test case rows and the data-source interface

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{HarnessError, HarnessResult};

/// One parameterized scenario instance: an identifier, display metadata,
/// and the named expected values it asserts against.
///
/// Rows are immutable once loaded; the orchestrator reads them only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCaseRow {
    /// Stable case identifier
    pub id: String,
    /// Human-readable case name, surfaced in reports
    #[serde(default)]
    pub display_name: String,
    /// Case author
    #[serde(default)]
    pub author: String,
    /// Expected values keyed by field label
    #[serde(default)]
    pub expected: BTreeMap<String, String>,
}

impl TestCaseRow {
    /// Create a row with an id and no expectations (tests build on this)
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
            author: String::new(),
            expected: BTreeMap::new(),
        }
    }

    /// Attach one expected value
    pub fn with_expected(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.expected.insert(label.into(), value.into());
        self
    }

    /// Expected value for a field label, if the row carries one
    pub fn expected_value(&self, label: &str) -> Option<&str> {
        self.expected.get(label).map(String::as_str)
    }
}

/// Supplies the ordered, finite sequence of rows for a run.
///
/// Restartable: `load_rows` may be called once per run, across runs.
pub trait RowSource {
    /// Load all rows
    fn load_rows(&self) -> HarnessResult<Vec<TestCaseRow>>;
}

/// Row source backed by a JSON file holding an array of rows
#[derive(Debug, Clone)]
pub struct JsonRowSource {
    path: PathBuf,
}

impl JsonRowSource {
    /// Read rows from `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RowSource for JsonRowSource {
    fn load_rows(&self) -> HarnessResult<Vec<TestCaseRow>> {
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| HarnessError::Row(format!("{}: {}", self.path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| HarnessError::Row(format!("{}: {}", self.path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn row_builder_and_lookup() {
        let row = TestCaseRow::new("case-1")
            .with_expected("self_address", "@contract_address")
            .with_expected("sent_count", "0");

        assert_eq!(row.display_name, "case-1");
        assert_eq!(row.expected_value("sent_count"), Some("0"));
        assert_eq!(row.expected_value("missing"), None);
    }

    #[test]
    fn json_source_loads_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id": "c1", "display_name": "address members", "author": "albedo",
                  "expected": {{"self_address": "@contract_address", "sent_count": "0"}}}},
                {{"id": "c2"}}
            ]"#
        )
        .unwrap();

        let rows = JsonRowSource::new(file.path()).load_rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "c1");
        assert_eq!(rows[0].author, "albedo");
        assert_eq!(rows[0].expected_value("sent_count"), Some("0"));
        assert!(rows[1].expected.is_empty());
    }

    #[test]
    fn missing_file_is_row_error() {
        let err = JsonRowSource::new("/nonexistent/rows.json")
            .load_rows()
            .unwrap_err();
        assert!(matches!(err, HarnessError::Row(_)));
    }

    #[test]
    fn malformed_json_is_row_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = JsonRowSource::new(file.path()).load_rows().unwrap_err();
        assert!(matches!(err, HarnessError::Row(_)));
    }
}
