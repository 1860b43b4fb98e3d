use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{Result, SchemaError};

/// Load an external schema document as raw JSON.
///
/// No validation beyond well-formedness happens here: a document without
/// the expected `schema`/`properties` keys loads fine and surfaces
/// downstream as an empty merge.
pub fn load_schema_doc(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(SchemaError::NotFound(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path)?;
    let doc = serde_json::from_str(&contents).map_err(|source| SchemaError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(doc)
}

/// Navigate to the top-level field mapping of a schema document
/// (`schema.properties`). Returns None for mis-keyed documents.
pub fn field_properties(doc: &Value) -> Option<&Map<String, Value>> {
    doc.get("schema")?.get("properties")?.as_object()
}

/// Find the newest schema document for a table in a directory.
///
/// Filenames must match `<table>_schema_version_<N>.json` exactly; the file
/// with the maximum integer `<N>` wins. Returns Ok(None) when nothing
/// matches — callers treat that as "no schema update available".
pub fn latest_schema_file(dir: &Path, table: &str) -> Result<Option<PathBuf>> {
    let prefix = format!("{table}_schema_version_");
    let mut best: Option<(u64, PathBuf)> = None;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };

        let Some(version) = name
            .strip_prefix(&prefix)
            .and_then(|rest| rest.strip_suffix(".json"))
            .and_then(|digits| digits.parse::<u64>().ok())
        else {
            continue;
        };

        if best.as_ref().is_none_or(|(highest, _)| version > *highest) {
            best = Some((version, entry.path()));
        }
    }

    Ok(best.map(|(_, path)| path))
}
