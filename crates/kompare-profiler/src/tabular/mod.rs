//! Tabular input: raw upload bytes to a row-oriented table.

pub mod delimited;
pub mod json;
pub mod loader;

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::FormatError;

pub use delimited::DelimitedParser;
pub use json::JsonParser;
pub use loader::TabularLoader;

/// One row: column name to value, in column order.
pub type Row = Map<String, Value>;

/// Rows plus the column order taken from the first row (or the header line).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TabularData {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl TabularData {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabularFormat {
    Csv,
    Psv,
    Json,
}

impl TabularFormat {
    /// `csv` and `psv` (any case) are delimited; everything else, including
    /// no extension at all, is read as JSON.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "csv" => TabularFormat::Csv,
            "psv" => TabularFormat::Psv,
            _ => TabularFormat::Json,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TabularFormat::Csv => "csv",
            TabularFormat::Psv => "psv",
            TabularFormat::Json => "json",
        }
    }
}

impl fmt::Display for TabularFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait TableParser: Send + Sync {
    fn parse(&self, bytes: &[u8]) -> Result<TabularData, FormatError>;
    fn supports(&self, format: TabularFormat) -> bool;
}

pub struct ParserRegistry {
    parsers: Vec<Box<dyn TableParser>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(DelimitedParser::comma()));
        registry.register(Box::new(DelimitedParser::pipe()));
        registry.register(Box::new(JsonParser::new()));
        registry
    }

    pub fn empty() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    pub fn register(&mut self, parser: Box<dyn TableParser>) {
        self.parsers.push(parser);
    }

    pub fn parse(&self, bytes: &[u8], extension: &str) -> Result<TabularData, FormatError> {
        let format = TabularFormat::from_extension(extension);

        for parser in &self.parsers {
            if parser.supports(format) {
                return parser.parse(bytes);
            }
        }

        Err(FormatError::Unsupported(format.to_string()))
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}
