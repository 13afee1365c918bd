//! Streaming CSV record reader
//!
//! Decodes an uploaded byte stream into a lazy, forward-only sequence of
//! header-mapped records. The whole file is never held in memory; only the
//! current record is.

use std::io::Read;

use csv::StringRecord;

use super::ImportError;

/// Positions of the recognized columns within a record, resolved once
/// from the header row. Unknown columns are ignored; headers are matched
/// after trimming, case-insensitively.
#[derive(Debug, Clone, Copy, Default)]
struct ColumnMap {
    title: Option<usize>,
    description: Option<usize>,
    priority: Option<usize>,
    due_date: Option<usize>,
    finish_date: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Self {
        let mut map = Self::default();
        for (idx, name) in headers.iter().enumerate() {
            let slot = match name.trim().to_ascii_lowercase().as_str() {
                "title" => &mut map.title,
                "description" => &mut map.description,
                "priority" => &mut map.priority,
                "due_date" => &mut map.due_date,
                "finish_date" => &mut map.finish_date,
                _ => continue,
            };
            // First occurrence wins if a header is duplicated
            if slot.is_none() {
                *slot = Some(idx);
            }
        }
        map
    }
}

/// One data row of the upload, addressable by column name.
///
/// `row_number` is 1-indexed over the physical file: the header is row 1,
/// so the first data row is row 2.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub row_number: u32,
    columns: ColumnMap,
    values: StringRecord,
}

impl RawRecord {
    fn field(&self, index: Option<usize>) -> Option<&str> {
        index.and_then(|i| self.values.get(i))
    }

    pub fn title(&self) -> Option<&str> {
        self.field(self.columns.title)
    }

    pub fn description(&self) -> Option<&str> {
        self.field(self.columns.description)
    }

    pub fn priority(&self) -> Option<&str> {
        self.field(self.columns.priority)
    }

    pub fn due_date(&self) -> Option<&str> {
        self.field(self.columns.due_date)
    }

    pub fn finish_date(&self) -> Option<&str> {
        self.field(self.columns.finish_date)
    }
}

/// Lazy, single-pass reader over an uploaded CSV byte stream.
///
/// Construction reads the header row and fails fast with
/// [`ImportError::MalformedFile`] if the stream cannot be decoded as
/// delimited text (e.g. binary garbage). Iteration yields each data row
/// exactly once, in file order.
pub struct CsvStreamReader<R: Read> {
    records: csv::StringRecordsIntoIter<R>,
    columns: ColumnMap,
    row_number: u32,
}

impl<R: Read> CsvStreamReader<R> {
    pub fn new(source: R) -> Result<Self, ImportError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(source);

        let headers = reader.headers().map_err(classify_csv_error)?;
        let columns = ColumnMap::from_headers(headers);

        Ok(Self {
            records: reader.into_records(),
            columns,
            // Header occupies row 1; incremented before each data row
            row_number: 1,
        })
    }
}

impl<R: Read> Iterator for CsvStreamReader<R> {
    type Item = Result<RawRecord, ImportError>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.records.next()?;
        self.row_number += 1;

        match result {
            Ok(values) => Some(Ok(RawRecord {
                row_number: self.row_number,
                columns: self.columns,
                values,
            })),
            Err(e) => Some(Err(classify_csv_error(e))),
        }
    }
}

/// Split CSV-layer failures into the import taxonomy: an I/O failure of
/// the underlying byte source is a server-class error, everything else
/// means the stream is not decodable as delimited rows.
fn classify_csv_error(err: csv::Error) -> ImportError {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(e) => ImportError::Io(e),
        _ => ImportError::MalformedFile(message),
    }
}
