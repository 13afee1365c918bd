//! Flexible date parsing for CSV imports

use chrono::NaiveDate;
use thiserror::Error;

/// Input that could not be parsed as a calendar date
#[derive(Debug, Clone, Error)]
#[error("unrecognized date '{value}'")]
pub struct DateParseError {
    pub value: String,
}

/// Accepted input formats, tried in order. ISO first, then the common
/// human phrasings users paste from spreadsheets.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%m/%d/%Y",
    "%b %d %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Parse a date cell into a canonical calendar date.
///
/// Empty or whitespace-only input means "no date" and is not an error.
/// Dates are calendar dates; no time-zone conversion is performed.
pub fn normalize_date(raw: &str) -> Result<Option<NaiveDate>, DateParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(Some(date));
        }
    }

    Err(DateParseError {
        value: trimmed.to_string(),
    })
}
