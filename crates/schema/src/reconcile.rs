use serde_json::{Map, Value};

use crate::column::ColumnSchema;

/// Column-description length limit enforced by the warehouse
pub const MAX_DESCRIPTION_LEN: usize = 1024;

/// Outcome of a description merge
///
/// `applied` and `truncated` exist so callers can detect a merge that
/// silently did nothing (e.g. a mis-keyed document): the merge itself never
/// errors on missing or unexpected keys.
#[derive(Debug, Default, PartialEq)]
pub struct Reconciled {
    /// The rebuilt column tree, same structure and order as the input
    pub columns: Vec<ColumnSchema>,
    /// Number of descriptions taken from the document
    pub applied: usize,
    /// Number of descriptions cut at the length limit
    pub truncated: usize,
}

/// Merge field descriptions from an external schema document onto a
/// warehouse column tree.
///
/// `properties` maps column name to a field spec (an object with an
/// optional `description` string and, for nested fields, its own
/// `properties` object). Matching is by name at each level, never by
/// position. The column tree's structure — names, types, modes, nesting,
/// sibling order — is carried through unchanged; only descriptions change.
/// Columns absent from `properties` pass through untouched, and spec
/// entries with no matching column are ignored.
pub fn reconcile(columns: &[ColumnSchema], properties: Option<&Map<String, Value>>) -> Reconciled {
    let mut applied = 0;
    let mut truncated = 0;
    let columns = merge_level(columns, properties, &mut applied, &mut truncated);

    Reconciled {
        columns,
        applied,
        truncated,
    }
}

fn merge_level(
    columns: &[ColumnSchema],
    properties: Option<&Map<String, Value>>,
    applied: &mut usize,
    truncated: &mut usize,
) -> Vec<ColumnSchema> {
    let mut merged = Vec::with_capacity(columns.len());

    for column in columns {
        let Some(spec) = properties.and_then(|props| props.get(&column.name)) else {
            // Not documented externally: pass the column through untouched
            merged.push(column.clone());
            continue;
        };

        let description = match spec.get("description").and_then(Value::as_str) {
            Some(text) => {
                *applied += 1;
                Some(clip_description(text, truncated))
            }
            // No description key: keep whatever the warehouse already has
            None => column.description.clone(),
        };

        let fields = if column.is_record() {
            let nested = spec.get("properties").and_then(Value::as_object);
            merge_level(&column.fields, nested, applied, truncated)
        } else {
            Vec::new()
        };

        merged.push(ColumnSchema {
            name: column.name.clone(),
            field_type: column.field_type.clone(),
            mode: column.mode.clone(),
            description,
            fields,
        });
    }

    merged
}

fn clip_description(text: &str, truncated: &mut usize) -> String {
    match text.char_indices().nth(MAX_DESCRIPTION_LEN) {
        Some((cut, _)) => {
            *truncated += 1;
            text[..cut].to_string()
        }
        None => text.to_string(),
    }
}
