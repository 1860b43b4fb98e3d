use chrono::{DateTime, Utc};
use config::DapConfig;
use tokio::process::Command;
use tracing::debug;

use crate::error::{DapError, Result};

/// Wrapper around the DAP extraction CLI
///
/// Every operation shells out to the configured binary with the base URL,
/// client credentials and namespace from configuration. Outputs land under
/// the tool's `downloads/` staging directory (see `staging`).
#[derive(Debug, Clone)]
pub struct DapClient {
    config: DapConfig,
}

impl DapClient {
    /// Create a new DapClient
    pub fn new(config: DapConfig) -> Self {
        Self { config }
    }

    /// List the tables available for extraction
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        let stdout = self.run(&["list"]).await?;
        Ok(stdout.split_whitespace().map(str::to_string).collect())
    }

    /// Extract a full snapshot of a table in parquet format
    pub async fn snapshot(&self, table: &str) -> Result<()> {
        self.run(&["snapshot", "--table", table, "--format", "parquet"])
            .await?;
        Ok(())
    }

    /// Extract the rows changed since a point in time
    ///
    /// Kept for parity with the extraction tool's surface; the batch driver
    /// performs full snapshots only.
    pub async fn incremental(&self, table: &str, since: DateTime<Utc>) -> Result<()> {
        let since = since.to_rfc3339();
        self.run(&[
            "incremental",
            "--table",
            table,
            "--format",
            "parquet",
            "--since",
            &since,
        ])
        .await?;
        Ok(())
    }

    /// Export the table's schema description document
    pub async fn export_schema(&self, table: &str) -> Result<()> {
        self.run(&["schema", "--table", table]).await?;
        Ok(())
    }

    /// Full argument vector for one operation: connection flags, then the
    /// operation, then the namespace
    fn command_args(&self, operation: &[&str]) -> Vec<String> {
        let mut args = vec![
            "--base-url".to_string(),
            self.config.base_url.clone(),
            "--client-id".to_string(),
            self.config.client_id.clone(),
            "--client-secret".to_string(),
            self.config.client_secret.clone(),
        ];
        args.extend(operation.iter().map(|part| part.to_string()));
        args.push("--namespace".to_string());
        args.push(self.config.namespace.clone());
        args
    }

    async fn run(&self, operation: &[&str]) -> Result<String> {
        // Log the operation only; the full argument vector carries secrets
        debug!("Running {} {}", self.config.binary, operation.join(" "));

        let output = Command::new(&self.config.binary)
            .args(self.command_args(operation))
            .output()
            .await?;

        if !output.status.success() {
            return Err(DapError::ExtractionFailed {
                operation: operation.join(" "),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| DapError::NonUtf8Output {
            operation: operation.join(" "),
        })
    }
}
