use serde_json::Value;

use super::{TableParser, TabularData, TabularFormat};
use crate::error::FormatError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A JSON array of objects. Values keep their JSON types.
#[derive(Debug, Default)]
pub struct JsonParser;

impl JsonParser {
    pub fn new() -> Self {
        Self
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl TableParser for JsonParser {
    fn parse(&self, bytes: &[u8]) -> Result<TabularData, FormatError> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let text =
            std::str::from_utf8(bytes).map_err(|e| FormatError::InvalidUtf8(e.to_string()))?;
        let value: Value =
            serde_json::from_str(text).map_err(|e| FormatError::InvalidJson(e.to_string()))?;

        let elements = match value {
            Value::Array(elements) => elements,
            other => {
                return Err(FormatError::ExpectedArrayOfObjects(format!(
                    "top-level value is {}",
                    kind_of(&other)
                )))
            }
        };

        let mut rows = Vec::with_capacity(elements.len());
        for (index, element) in elements.into_iter().enumerate() {
            match element {
                Value::Object(row) => rows.push(row),
                other => {
                    return Err(FormatError::ExpectedArrayOfObjects(format!(
                        "element {} is {}",
                        index,
                        kind_of(&other)
                    )))
                }
            }
        }

        let columns = rows
            .first()
            .map(|first| first.keys().cloned().collect())
            .unwrap_or_default();

        Ok(TabularData::new(columns, rows))
    }

    fn supports(&self, format: TabularFormat) -> bool {
        format == TabularFormat::Json
    }
}
