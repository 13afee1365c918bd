//! Task database queries

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::types::{Task, TaskDraft};

/// Insert a single task for the given owner.
///
/// Commits on its own; the import pipeline calls this once per accepted
/// row, so a failed insert affects only that row.
pub async fn create_task(pool: &PgPool, user_id: Uuid, draft: &TaskDraft) -> Result<Task> {
    let task = sqlx::query_as::<_, Task>(
        r#"
        INSERT INTO tasks (
            id, user_id, title, description, priority,
            due_date, finish_date, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
        RETURNING
            id, user_id, title, description, priority,
            due_date, finish_date, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&draft.title)
    .bind(&draft.description)
    .bind(draft.priority.as_str())
    .bind(draft.due_date)
    .bind(draft.finish_date)
    .fetch_one(pool)
    .await?;

    Ok(task)
}
