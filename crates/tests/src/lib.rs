use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use config::Config;
use context::EtlContext;
use schema::ColumnSchema;
use warehouse::{TableId, Warehouse, WarehouseError};

/// In-memory warehouse double that records every call
#[derive(Debug, Default)]
pub struct FakeWarehouse {
    /// Live schema served per table name
    pub schemas: Mutex<HashMap<String, Vec<ColumnSchema>>>,
    /// (table name, file path) pairs in load order
    pub loads: Mutex<Vec<(String, PathBuf)>>,
    /// Last schema committed per table name
    pub updates: Mutex<HashMap<String, Vec<ColumnSchema>>>,
    /// Table names whose loads fail with an injected error
    pub fail_loads: Mutex<HashSet<String>>,
}

impl FakeWarehouse {
    /// A fake that serves the given live schema for one table
    pub fn with_schema(table: &str, columns: Vec<ColumnSchema>) -> Arc<Self> {
        let fake = Self::default();
        fake.schemas
            .lock()
            .unwrap()
            .insert(table.to_string(), columns);
        Arc::new(fake)
    }

    /// Make every load for `table` fail
    pub fn fail_load_for(&self, table: &str) {
        self.fail_loads.lock().unwrap().insert(table.to_string());
    }

    /// Table names that were successfully loaded, in order
    pub fn loaded_tables(&self) -> Vec<String> {
        self.loads
            .lock()
            .unwrap()
            .iter()
            .map(|(table, _)| table.clone())
            .collect()
    }

    /// The schema last committed for `table`, if any
    pub fn updated_schema(&self, table: &str) -> Option<Vec<ColumnSchema>> {
        self.updates.lock().unwrap().get(table).cloned()
    }
}

#[async_trait]
impl Warehouse for FakeWarehouse {
    async fn load_parquet(&self, table: &TableId, file: &Path) -> warehouse::Result<()> {
        if self.fail_loads.lock().unwrap().contains(&table.table) {
            return Err(WarehouseError::LoadJob(format!(
                "injected failure for {}",
                table.table
            )));
        }

        self.loads
            .lock()
            .unwrap()
            .push((table.table.clone(), file.to_path_buf()));
        Ok(())
    }

    async fn table_schema(&self, table: &TableId) -> warehouse::Result<Vec<ColumnSchema>> {
        Ok(self
            .schemas
            .lock()
            .unwrap()
            .get(&table.table)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_table_schema(
        &self,
        table: &TableId,
        columns: Vec<ColumnSchema>,
    ) -> warehouse::Result<()> {
        self.updates
            .lock()
            .unwrap()
            .insert(table.table.clone(), columns);
        Ok(())
    }
}

/// Filesystem sandbox with a stub extraction binary
///
/// The stub mimics the dap CLI surface: `list` prints the configured table
/// names, `snapshot` stages a parquet file under a fresh job directory and
/// `schema` stages a versioned description document when a fixture exists
/// for the table.
pub struct StubDap {
    pub root: tempfile::TempDir,
    pub downloads: PathBuf,
    pub fixtures: PathBuf,
    pub binary: PathBuf,
}

impl StubDap {
    /// Create the sandbox; `tables` is what the stub's `list` prints
    pub fn new(tables: &str) -> Self {
        let root = tempfile::tempdir().expect("Failed to create sandbox");
        let downloads = root.path().join("downloads");
        let fixtures = root.path().join("fixtures");
        fs::create_dir_all(&downloads).expect("Failed to create downloads dir");
        fs::create_dir_all(&fixtures).expect("Failed to create fixtures dir");

        let binary = root.path().join("dap-stub.sh");
        let script = format!(
            r#"#!/bin/sh
# Stub extraction tool. Argument layout from DapClient:
#   --base-url U --client-id I --client-secret S <operation ...> --namespace N
set -e
DOWNLOADS="{downloads}"
FIXTURES="{fixtures}"
op="$7"
case "$op" in
    list)
        echo "{tables}"
        ;;
    snapshot)
        table="$9"
        rm -rf "$DOWNLOADS"/job-*
        mkdir -p "$DOWNLOADS/job-$table"
        printf 'PAR1' > "$DOWNLOADS/job-$table/part-000.parquet"
        ;;
    schema)
        table="$9"
        if [ -f "$FIXTURES/$table.json" ]; then
            cp "$FIXTURES/$table.json" "$DOWNLOADS/${{table}}_schema_version_3.json"
        fi
        ;;
    *)
        echo "unknown operation: $op" >&2
        exit 64
        ;;
esac
"#,
            downloads = downloads.display(),
            fixtures = fixtures.display(),
            tables = tables
        );
        fs::write(&binary, script).expect("Failed to write stub script");

        let mut perms = fs::metadata(&binary)
            .expect("Failed to stat stub script")
            .permissions();
        use std::os::unix::fs::PermissionsExt;
        perms.set_mode(0o755);
        fs::set_permissions(&binary, perms).expect("Failed to mark stub executable");

        Self {
            root,
            downloads,
            fixtures,
            binary,
        }
    }

    /// Drop a schema description document the stub's `schema` operation
    /// will stage for `table`
    pub fn add_schema_doc(&self, table: &str, doc: &serde_json::Value) {
        fs::write(self.fixtures.join(format!("{table}.json")), doc.to_string())
            .expect("Failed to write schema fixture");
    }

    /// An EtlContext wired to the stub binary and the given warehouse
    pub fn context(&self, fake: Arc<FakeWarehouse>) -> EtlContext {
        let mut config = Config::default();
        config.dap.binary = self.binary.to_str().unwrap().to_string();
        config.dap.client_id = "test-client".to_string();
        config.dap.client_secret = "test-secret".to_string();
        config.dap.downloads_dir = self.downloads.to_str().unwrap().to_string();
        config.warehouse.project = "test-project".to_string();
        config.warehouse.dataset = "test_dataset".to_string();
        config.warehouse.access_token = "test-token".to_string();

        EtlContext::new(config, fake)
    }
}
