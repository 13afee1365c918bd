//! Row outcome accumulation
//!
//! Consumes the outcome of every data row in file order and builds the
//! final report. Row-level failures are recorded, never propagated; the
//! pass always runs to the end of the stream.

use tracing::debug;
use uuid::Uuid;

use crate::services::task_store::TaskStore;
use crate::types::{ImportReport, RowOutcome, RowRejection, TaskDraft};

pub struct ImportAccumulator<'a> {
    store: &'a dyn TaskStore,
    owner_id: Uuid,
    imported_count: u32,
    errors: Vec<RowRejection>,
}

impl<'a> ImportAccumulator<'a> {
    pub fn new(store: &'a dyn TaskStore, owner_id: Uuid) -> Self {
        Self {
            store,
            owner_id,
            imported_count: 0,
            errors: Vec::new(),
        }
    }

    /// Resolve one parsed row into exactly one [`RowOutcome`] and tally it.
    ///
    /// A persistence failure for an otherwise-valid row becomes a row
    /// rejection carrying the store's message; it never aborts the pass.
    pub async fn process(&mut self, row_number: u32, parsed: Result<TaskDraft, RowRejection>) {
        let outcome = match parsed {
            Ok(draft) => match self.store.create_task(self.owner_id, &draft).await {
                Ok(task_id) => RowOutcome::Imported(task_id),
                Err(e) => RowOutcome::Rejected(RowRejection::new(row_number, e.to_string())),
            },
            Err(rejection) => RowOutcome::Rejected(rejection),
        };

        match outcome {
            RowOutcome::Imported(task_id) => {
                debug!("Row {} imported as task {}", row_number, task_id);
                self.imported_count += 1;
            }
            RowOutcome::Rejected(rejection) => {
                debug!("{}", rejection);
                self.errors.push(rejection);
            }
        }
    }

    pub fn finish(self) -> ImportReport {
        ImportReport {
            imported_count: self.imported_count,
            errors: self.errors,
        }
    }
}
