//! Per-row validation and normalization

use crate::types::{RowRejection, TaskDraft, TaskPriority};

use super::dates::normalize_date;
use super::reader::RawRecord;

const MAX_TITLE_CHARS: usize = 255;

fn parse_priority(s: &str) -> Option<TaskPriority> {
    match s.trim().to_lowercase().as_str() {
        "high" => Some(TaskPriority::High),
        "medium" => Some(TaskPriority::Medium),
        "low" => Some(TaskPriority::Low),
        _ => None,
    }
}

/// Validate one record into a [`TaskDraft`], short-circuiting on the
/// first failing rule. The rejection reasons are part of the frontend
/// contract and must not be reworded.
///
/// Rules, in order:
/// 1. `title` missing or blank after trimming rejects the row.
/// 2. `title` over 255 characters rejects the row.
/// 3. `priority` outside high/medium/low silently defaults to medium.
/// 4. `description` is trimmed; missing reads as empty.
/// 5. `due_date`/`finish_date` must each parse or be empty.
pub fn parse_row(record: &RawRecord) -> Result<TaskDraft, RowRejection> {
    let title = record.title().map(str::trim).unwrap_or("");
    if title.is_empty() {
        return Err(RowRejection::new(record.row_number, "Title is required"));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(RowRejection::new(
            record.row_number,
            "Title must not exceed 255 characters",
        ));
    }

    let priority = record
        .priority()
        .and_then(parse_priority)
        .unwrap_or(TaskPriority::Medium);

    let description = record.description().map(str::trim).unwrap_or("").to_string();

    let due_date = normalize_date(record.due_date().unwrap_or(""))
        .map_err(|_| RowRejection::new(record.row_number, "Invalid due_date format"))?;

    let finish_date = normalize_date(record.finish_date().unwrap_or(""))
        .map_err(|_| RowRejection::new(record.row_number, "Invalid finish_date format"))?;

    Ok(TaskDraft {
        title: title.to_string(),
        description,
        priority,
        due_date,
        finish_date,
    })
}
