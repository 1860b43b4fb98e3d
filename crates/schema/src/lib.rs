pub mod column;
pub mod error;
pub mod loader;
pub mod reconcile;

pub use column::ColumnSchema;
pub use error::{Result, SchemaError};
pub use loader::{field_properties, latest_schema_file, load_schema_doc};
pub use reconcile::{reconcile, Reconciled, MAX_DESCRIPTION_LEN};
