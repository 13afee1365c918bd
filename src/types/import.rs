//! Import types for the CSV task import

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One rejected row: 1-indexed source row number plus a human-readable
/// reason. Row 1 is the header, so the first data row is row 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRejection {
    pub row_number: u32,
    pub reason: String,
}

impl RowRejection {
    pub fn new(row_number: u32, reason: impl Into<String>) -> Self {
        Self {
            row_number,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {}", self.row_number, self.reason)
    }
}

/// Outcome of one data row. Every record read from the file produces
/// exactly one of these.
#[derive(Debug, Clone)]
pub enum RowOutcome {
    Imported(Uuid),
    Rejected(RowRejection),
}

/// Final report of one import pass. Errors keep input row order;
/// the report is never mutated after the pass completes.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub imported_count: u32,
    pub errors: Vec<RowRejection>,
}

impl ImportReport {
    pub fn total_errors(&self) -> u32 {
        self.errors.len() as u32
    }
}

/// Request to import tasks from an uploaded CSV file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportTasksRequest {
    pub filename: String,
    /// Raw file bytes, base64-encoded by the uploading frontend
    pub content_base64: String,
}

/// Wire shape of a completed import. Field names are part of the
/// frontend contract and stay snake_case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportTasksResponse {
    pub message: String,
    pub imported_count: u32,
    pub errors: Vec<String>,
    pub total_errors: u32,
}

impl From<ImportReport> for ImportTasksResponse {
    fn from(report: ImportReport) -> Self {
        Self {
            message: "CSV import completed".to_string(),
            imported_count: report.imported_count,
            errors: report.errors.iter().map(|e| e.to_string()).collect(),
            total_errors: report.total_errors(),
        }
    }
}

/// Static descriptor of the expected CSV layout, served to the frontend
/// so users can download a template before uploading.
#[derive(Debug, Clone, Serialize)]
pub struct TaskCsvTemplate {
    pub headers: [&'static str; 5],
    pub example_row: TemplateRow,
    pub instructions: [&'static str; 5],
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateRow {
    pub title: &'static str,
    pub description: &'static str,
    pub priority: &'static str,
    pub due_date: &'static str,
    pub finish_date: &'static str,
}
