//! Bulk CSV task import
//!
//! One forward pass over the uploaded byte stream: decode records, validate
//! each row independently, persist the valid ones, and report every row's
//! outcome. A bad row never aborts the batch; only a structurally unreadable
//! file does.
//!
//! Row numbers in the report are 1-indexed over the physical file (the
//! header is row 1), so they match what the user sees in a spreadsheet.

pub mod accumulator;
pub mod dates;
pub mod reader;
pub mod row;

use std::io::Read;

use thiserror::Error;
use uuid::Uuid;

use crate::services::task_store::TaskStore;
use crate::types::{ImportReport, TaskCsvTemplate, TemplateRow};

use accumulator::ImportAccumulator;
use reader::CsvStreamReader;
use row::parse_row;

/// Whole-file failures. Row-level problems are recorded in the report and
/// never surface here.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The byte stream cannot be decoded as delimited rows; client error
    #[error("malformed CSV file: {0}")]
    MalformedFile(String),

    /// The byte source itself failed mid-stream; server error
    #[error("failed to read upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Run one import pass for the given owner.
///
/// Processes rows strictly in file order on the calling task. Returns the
/// complete report, or a whole-file error with no report; rows persisted
/// before a mid-stream failure stay persisted (each create commits
/// independently, there is no batch transaction).
pub async fn import_tasks<R: Read>(
    source: R,
    owner_id: Uuid,
    store: &dyn TaskStore,
) -> Result<ImportReport, ImportError> {
    let reader = CsvStreamReader::new(source)?;
    let mut accumulator = ImportAccumulator::new(store, owner_id);

    for record in reader {
        let record = record?;
        let row_number = record.row_number;
        accumulator.process(row_number, parse_row(&record)).await;
    }

    Ok(accumulator.finish())
}

/// The CSV layout we accept, as a static descriptor for the frontend.
/// Not derived from any store; repeated calls return identical data.
pub fn template() -> TaskCsvTemplate {
    TaskCsvTemplate {
        headers: ["title", "description", "priority", "due_date", "finish_date"],
        example_row: TemplateRow {
            title: "Complete project documentation",
            description: "Write comprehensive documentation for the project",
            priority: "high",
            due_date: "2024-12-31",
            finish_date: "",
        },
        instructions: [
            "title: Required field, maximum 255 characters",
            "description: Optional field, any text",
            "priority: Optional field, must be one of: high, medium, low (default: medium)",
            "due_date: Optional field, format: YYYY-MM-DD",
            "finish_date: Optional field, format: YYYY-MM-DD (leave empty for incomplete tasks)",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::task_store::{PersistenceError, TaskStore};
    use crate::types::{TaskDraft, TaskPriority};
    use async_trait::async_trait;
    use std::sync::Mutex;

    // ==========================================================================
    // In-memory stores
    // ==========================================================================

    /// Records every accepted draft; never fails
    #[derive(Default)]
    struct MemoryTaskStore {
        created: Mutex<Vec<(Uuid, TaskDraft)>>,
    }

    impl MemoryTaskStore {
        fn created(&self) -> Vec<(Uuid, TaskDraft)> {
            self.created.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TaskStore for MemoryTaskStore {
        async fn create_task(
            &self,
            owner_id: Uuid,
            draft: &TaskDraft,
        ) -> Result<Uuid, PersistenceError> {
            self.created.lock().unwrap().push((owner_id, draft.clone()));
            Ok(Uuid::new_v4())
        }
    }

    /// Fails creation for one specific title, accepts everything else
    struct FailingTaskStore {
        fail_title: &'static str,
        inner: MemoryTaskStore,
    }

    #[async_trait]
    impl TaskStore for FailingTaskStore {
        async fn create_task(
            &self,
            owner_id: Uuid,
            draft: &TaskDraft,
        ) -> Result<Uuid, PersistenceError> {
            if draft.title == self.fail_title {
                return Err(PersistenceError("duplicate task".to_string()));
            }
            self.inner.create_task(owner_id, draft).await
        }
    }

    fn owner() -> Uuid {
        Uuid::new_v4()
    }

    // ==========================================================================
    // Pipeline tests
    // ==========================================================================

    #[tokio::test]
    async fn test_clean_file_imports_every_row() {
        let store = MemoryTaskStore::default();
        let csv = b"title,description,priority,due_date,finish_date\n\
                    Buy milk,weekly shop,high,2024-12-31,\n\
                    Call bank,,low,,\n\
                    Water plants,balcony,medium,Dec 1 2024,\n";

        let report = import_tasks(&csv[..], owner(), &store).await.unwrap();

        assert_eq!(report.imported_count, 3);
        assert!(report.errors.is_empty());
        assert_eq!(report.total_errors(), 0);
        assert_eq!(store.created().len(), 3);
    }

    #[tokio::test]
    async fn test_mixed_file_reports_row_addressable_errors() {
        let store = MemoryTaskStore::default();
        let csv = b"title,priority,due_date\n\
                    Buy milk,High,2024-12-31\n\
                    ,low,\n\
                    Call bank,medium,not-a-date\n";

        let report = import_tasks(&csv[..], owner(), &store).await.unwrap();

        assert_eq!(report.imported_count, 1);
        assert_eq!(report.total_errors(), 2);
        let errors: Vec<String> = report.errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            errors,
            vec!["Row 3: Title is required", "Row 4: Invalid due_date format"]
        );

        // Rejected rows were never persisted
        let created = store.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].1.title, "Buy milk");
        assert_eq!(created[0].1.priority, TaskPriority::High);
    }

    #[tokio::test]
    async fn test_every_row_yields_exactly_one_outcome() {
        let store = MemoryTaskStore::default();
        let csv = b"title,due_date\n\
                    One,\n\
                    ,bad\n\
                    Two,nope\n\
                    Three,2024-06-01\n";

        let report = import_tasks(&csv[..], owner(), &store).await.unwrap();

        // 4 data rows, each imported or rejected, nothing dropped
        assert_eq!(report.imported_count + report.total_errors(), 4);
        assert_eq!(report.imported_count, 2);
    }

    #[tokio::test]
    async fn test_unknown_priority_persists_as_medium() {
        let store = MemoryTaskStore::default();
        let csv = b"title,priority\nBuy milk,URGENT\nCall bank,\n";

        let report = import_tasks(&csv[..], owner(), &store).await.unwrap();

        assert_eq!(report.imported_count, 2);
        for (_, draft) in store.created() {
            assert_eq!(draft.priority, TaskPriority::Medium);
        }
    }

    #[tokio::test]
    async fn test_owner_is_attached_to_every_created_task() {
        let store = MemoryTaskStore::default();
        let owner_id = owner();
        let csv = b"title\nOne\nTwo\n";

        import_tasks(&csv[..], owner_id, &store).await.unwrap();

        for (created_owner, _) in store.created() {
            assert_eq!(created_owner, owner_id);
        }
    }

    #[tokio::test]
    async fn test_persistence_failure_becomes_row_error() {
        let store = FailingTaskStore {
            fail_title: "Call bank",
            inner: MemoryTaskStore::default(),
        };
        let csv = b"title\nBuy milk\nCall bank\nWater plants\n";

        let report = import_tasks(&csv[..], owner(), &store).await.unwrap();

        // The failing row is reported with the store's message and the
        // pass continues past it
        assert_eq!(report.imported_count, 2);
        assert_eq!(report.total_errors(), 1);
        assert_eq!(report.errors[0].row_number, 3);
        assert_eq!(report.errors[0].reason, "duplicate task");
        assert_eq!(store.inner.created().len(), 2);
    }

    #[tokio::test]
    async fn test_rerunning_the_same_file_imports_again() {
        let store = MemoryTaskStore::default();
        let csv = b"title\nBuy milk\n";

        let first = import_tasks(&csv[..], owner(), &store).await.unwrap();
        let second = import_tasks(&csv[..], owner(), &store).await.unwrap();

        // No deduplication across runs
        assert_eq!(first.imported_count, 1);
        assert_eq!(second.imported_count, 1);
        assert_eq!(store.created().len(), 2);
    }

    #[tokio::test]
    async fn test_header_only_file_reports_zero_everything() {
        let store = MemoryTaskStore::default();
        let csv = b"title,description,priority,due_date,finish_date\n";

        let report = import_tasks(&csv[..], owner(), &store).await.unwrap();

        assert_eq!(report.imported_count, 0);
        assert_eq!(report.total_errors(), 0);
    }

    #[tokio::test]
    async fn test_binary_garbage_fails_without_a_report() {
        let store = MemoryTaskStore::default();
        let garbage: &[u8] = &[0xff, 0xfe, 0x00, 0x9c, 0x01, 0x80, 0xff];

        let result = import_tasks(garbage, owner(), &store).await;

        assert!(matches!(result, Err(ImportError::MalformedFile(_))));
        assert!(store.created().is_empty());
    }

    #[tokio::test]
    async fn test_rows_persisted_before_mid_stream_failure_stay_persisted() {
        let store = MemoryTaskStore::default();
        let mut data = b"title\nBuy milk\n".to_vec();
        data.extend_from_slice(&[0xff, 0xfe, 0x9c]);
        data.extend_from_slice(b"\nCall bank\n");

        let result = import_tasks(data.as_slice(), owner(), &store).await;

        assert!(matches!(result, Err(ImportError::MalformedFile(_))));
        // The row before the corruption was already committed; no rollback
        assert_eq!(store.created().len(), 1);
    }

    // ==========================================================================
    // Template tests
    // ==========================================================================

    #[test]
    fn test_template_is_idempotent() {
        let first = serde_json::to_value(template()).unwrap();
        let second = serde_json::to_value(template()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_template_shape() {
        let value = serde_json::to_value(template()).unwrap();

        let headers: Vec<&str> = value["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| h.as_str().unwrap())
            .collect();
        assert_eq!(
            headers,
            vec!["title", "description", "priority", "due_date", "finish_date"]
        );

        assert_eq!(value["example_row"]["priority"], "high");
        assert_eq!(value["example_row"]["finish_date"], "");
        assert_eq!(value["instructions"].as_array().unwrap().len(), 5);
    }
}
