use std::collections::HashSet;

use csv::{ErrorKind, ReaderBuilder, StringRecord};
use serde_json::Value;

use super::{Row, TableParser, TabularData, TabularFormat};
use crate::error::FormatError;

/// Header-first delimited text. Every cell is kept as a string.
pub struct DelimitedParser {
    format: TabularFormat,
    delimiter: u8,
}

impl DelimitedParser {
    pub fn comma() -> Self {
        Self {
            format: TabularFormat::Csv,
            delimiter: b',',
        }
    }

    pub fn pipe() -> Self {
        Self {
            format: TabularFormat::Psv,
            delimiter: b'|',
        }
    }

    fn header_columns(headers: &StringRecord) -> Result<Vec<String>, FormatError> {
        let mut seen = HashSet::new();
        let mut columns = Vec::with_capacity(headers.len());
        for name in headers.iter() {
            if !seen.insert(name) {
                return Err(FormatError::Delimited(format!(
                    "duplicate column '{}' in header",
                    name
                )));
            }
            columns.push(name.to_string());
        }
        Ok(columns)
    }
}

impl TableParser for DelimitedParser {
    fn parse(&self, bytes: &[u8]) -> Result<TabularData, FormatError> {
        // The csv reader runs an open quote to end of input without complaint.
        if ends_inside_quotes(bytes, self.delimiter) {
            return Err(FormatError::Delimited(
                "unterminated quoted field".to_string(),
            ));
        }

        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(false)
            .from_reader(bytes);

        let headers = reader.headers().map_err(map_csv_error)?.clone();
        let columns = Self::header_columns(&headers)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(map_csv_error)?;
            let row: Row = columns
                .iter()
                .zip(record.iter())
                .map(|(column, cell)| (column.clone(), Value::String(cell.to_string())))
                .collect();
            rows.push(row);
        }

        Ok(TabularData::new(columns, rows))
    }

    fn supports(&self, format: TabularFormat) -> bool {
        format == self.format
    }
}

/// Tracks quoting the way the csv reader does: a quote opens a quoted field
/// only as the first byte of a field, and `""` inside one is a literal quote.
fn ends_inside_quotes(bytes: &[u8], delimiter: u8) -> bool {
    let bytes = bytes.strip_prefix(&b"\xEF\xBB\xBF"[..]).unwrap_or(bytes);
    let mut in_quotes = false;
    let mut at_field_start = true;
    let mut iter = bytes.iter().copied().peekable();

    while let Some(b) = iter.next() {
        if in_quotes {
            if b == b'"' {
                if iter.peek() == Some(&b'"') {
                    iter.next();
                } else {
                    in_quotes = false;
                }
            }
            continue;
        }
        match b {
            b'"' if at_field_start => {
                in_quotes = true;
                at_field_start = false;
            }
            b'\n' | b'\r' => at_field_start = true,
            _ if b == delimiter => at_field_start = true,
            _ => at_field_start = false,
        }
    }
    in_quotes
}

fn map_csv_error(err: csv::Error) -> FormatError {
    match err.kind() {
        ErrorKind::Utf8 { .. } => FormatError::InvalidUtf8(err.to_string()),
        _ => FormatError::Delimited(err.to_string()),
    }
}
