use serde::{Deserialize, Serialize};

/// A single column of a warehouse table schema, in the shape the BigQuery
/// REST API uses for `TableFieldSchema`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name, unique among siblings
    pub name: String,

    /// Column type (e.g. "INTEGER", "STRING"); "RECORD" marks a composite
    /// column that owns child columns
    #[serde(rename = "type")]
    pub field_type: String,

    /// Repetition semantics: "REQUIRED", "NULLABLE" or "REPEATED"
    /// Absent on the wire means NULLABLE
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    /// Column description, at most 1024 characters on write
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Child columns; non-empty only when the type is RECORD
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<ColumnSchema>,
}

impl ColumnSchema {
    /// Create a new leaf column with no description
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            mode: None,
            description: None,
            fields: Vec::new(),
        }
    }

    /// Whether this column is a composite that owns child columns
    pub fn is_record(&self) -> bool {
        self.field_type == "RECORD"
    }
}
