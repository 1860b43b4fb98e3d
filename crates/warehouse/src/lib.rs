use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use schema::ColumnSchema;

pub mod bigquery;
pub mod error;

pub use bigquery::BigQueryClient;
pub use error::{Result, WarehouseError};

/// Fully qualified warehouse table
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableId {
    pub project: String,
    pub dataset: String,
    pub table: String,
}

impl TableId {
    /// Create a new TableId
    pub fn new(
        project: impl Into<String>,
        dataset: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            dataset: dataset.into(),
            table: table.into(),
        }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project, self.dataset, self.table)
    }
}

/// The warehouse operations the batch driver needs
///
/// Tables are assumed pre-provisioned; creation is out of scope.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Load a local parquet file into a table, replacing its contents, and
    /// wait for the load job to complete
    async fn load_parquet(&self, table: &TableId, file: &Path) -> Result<()>;

    /// Fetch the table's live column schema
    async fn table_schema(&self, table: &TableId) -> Result<Vec<ColumnSchema>>;

    /// Replace the table's schema metadata in a single update call
    async fn update_table_schema(&self, table: &TableId, columns: Vec<ColumnSchema>) -> Result<()>;
}
