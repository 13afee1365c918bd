//! Persistence seam for task creation
//!
//! The import pipeline only ever needs "create one task, atomically".
//! Everything else about storage stays behind this trait so tests can
//! inject an in-memory store.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::db::queries;
use crate::types::TaskDraft;

/// Failure of a single create operation. Carries the underlying message
/// so it can be reported against the originating row.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct PersistenceError(pub String);

/// Narrow persistence interface used by the import pipeline.
///
/// Each create commits independently; a failed create leaves no partial
/// task behind.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create_task(&self, owner_id: Uuid, draft: &TaskDraft) -> Result<Uuid, PersistenceError>;
}

/// PostgreSQL-backed store
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn create_task(&self, owner_id: Uuid, draft: &TaskDraft) -> Result<Uuid, PersistenceError> {
        let task = queries::task::create_task(&self.pool, owner_id, draft)
            .await
            .map_err(|e| PersistenceError(e.to_string()))?;
        Ok(task.id)
    }
}
