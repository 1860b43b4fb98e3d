use std::sync::Arc;

use context::run_batch;
use schema::ColumnSchema;
use serde_json::json;
use tests::{FakeWarehouse, StubDap};

fn accounts_schema() -> Vec<ColumnSchema> {
    vec![
        ColumnSchema {
            name: "id".to_string(),
            field_type: "INTEGER".to_string(),
            mode: Some("REQUIRED".to_string()),
            description: Some(String::new()),
            fields: Vec::new(),
        },
        ColumnSchema {
            name: "user".to_string(),
            field_type: "RECORD".to_string(),
            mode: Some("NULLABLE".to_string()),
            description: None,
            fields: vec![ColumnSchema {
                name: "email".to_string(),
                field_type: "STRING".to_string(),
                mode: Some("NULLABLE".to_string()),
                description: Some(String::new()),
                fields: Vec::new(),
            }],
        },
    ]
}

#[tokio::test]
async fn test_full_pipeline_loads_and_syncs_descriptions() {
    let stub = StubDap::new("accounts");
    stub.add_schema_doc(
        "accounts",
        &json!({
            "schema": {
                "properties": {
                    "id": {"description": "Primary key"},
                    "user": {"properties": {"email": {"description": "User email"}}}
                }
            }
        }),
    );
    let fake = FakeWarehouse::with_schema("accounts", accounts_schema());
    let ctx = stub.context(fake.clone());

    run_batch(&ctx).await.expect("Batch failed");

    let loads = fake.loads.lock().unwrap().clone();
    assert_eq!(loads.len(), 1);
    assert_eq!(loads[0].0, "accounts");
    assert!(loads[0].1.ends_with("part-000.parquet"));

    let updated = fake
        .updated_schema("accounts")
        .expect("No schema committed");
    assert_eq!(updated[0].description.as_deref(), Some("Primary key"));
    assert_eq!(
        updated[1].fields[0].description.as_deref(),
        Some("User email")
    );
    // Structure rides through the merge untouched
    assert_eq!(updated[0].mode.as_deref(), Some("REQUIRED"));
    assert_eq!(updated[1].description, None);

    // Staging artifacts are gone after a successful table
    assert!(!stub.downloads.join("job-accounts").exists());
    assert!(!stub.downloads.join("accounts_schema_version_3.json").exists());
}

#[tokio::test]
async fn test_table_without_schema_doc_still_loads() {
    let stub = StubDap::new("users");
    let fake = FakeWarehouse::with_schema(
        "users",
        vec![ColumnSchema::new("id", "INTEGER")],
    );
    let ctx = stub.context(fake.clone());

    run_batch(&ctx).await.expect("Batch failed");

    assert_eq!(fake.loaded_tables(), vec!["users"]);
    // No document means no schema commit, and the table still succeeds
    assert!(fake.updates.lock().unwrap().is_empty());
    assert!(!stub.downloads.join("job-users").exists());
}

#[tokio::test]
async fn test_failing_table_does_not_stop_the_batch() {
    let stub = StubDap::new("bad good");
    let fake = FakeWarehouse::with_schema("good", vec![ColumnSchema::new("id", "INTEGER")]);
    fake.fail_load_for("bad");
    let ctx = stub.context(fake.clone());

    run_batch(&ctx).await.expect("Batch failed");

    assert_eq!(fake.loaded_tables(), vec!["good"]);
}

#[tokio::test]
async fn test_empty_table_list_is_a_clean_run() {
    let stub = StubDap::new("");
    let fake = Arc::new(FakeWarehouse::default());
    let ctx = stub.context(fake.clone());

    run_batch(&ctx).await.expect("Batch failed");

    assert!(fake.loads.lock().unwrap().is_empty());
    assert!(fake.updates.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_mis_keyed_document_commits_schema_unchanged() {
    let stub = StubDap::new("accounts");
    stub.add_schema_doc("accounts", &json!({"wrong_key": {"id": "ignored"}}));
    let fake = FakeWarehouse::with_schema("accounts", accounts_schema());
    let ctx = stub.context(fake.clone());

    run_batch(&ctx).await.expect("Batch failed");

    // A permissively-empty merge still commits, with nothing changed
    let updated = fake
        .updated_schema("accounts")
        .expect("No schema committed");
    assert_eq!(updated, accounts_schema());
}
