//! Records
//!
//! Request bodies accepted by the remote script and a typed view over the
//! rows it returns. Responses are otherwise passed through as raw JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of an `insert` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertRequest {
    pub sheet: String,
    pub data: Value,
}

impl InsertRequest {
    pub fn new(sheet: &str, data: Value) -> Self {
        Self {
            sheet: sheet.to_string(),
            data,
        }
    }
}

/// Body of a `delete` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub sheet: String,
    pub row: u64,
}

impl DeleteRequest {
    pub fn new(sheet: &str, row: u64) -> Self {
        Self {
            sheet: sheet.to_string(),
            row,
        }
    }
}

/// A persisted record
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Spreadsheet row number assigned by the script
    pub row: u64,
    /// Every other field of the record
    pub fields: Map<String, Value>,
}

impl Row {
    fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let row = object.get("row").and_then(|v| v.as_u64())?;

        let fields = object
            .iter()
            .filter(|(key, _)| key.as_str() != "row")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Some(Self { row, fields })
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

/// Rows of a `{ "data": [...] }` response.
/// Entries without a numeric `row` are skipped.
pub fn rows(response: &Value) -> Vec<Row> {
    response
        .get("data")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(Row::from_value).collect())
        .unwrap_or_default()
}
