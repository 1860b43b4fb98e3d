use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use config::WarehouseConfig;
use schema::ColumnSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, WarehouseError};
use crate::{TableId, Warehouse};

/// BigQuery REST client
///
/// Covers the three operations the batch driver needs: load a parquet file
/// with overwrite, read table schema metadata, and patch it back.
#[derive(Debug, Clone)]
pub struct BigQueryClient {
    http: reqwest::Client,
    endpoint: String,
    access_token: String,
    poll_interval: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
struct TableSchema {
    #[serde(default)]
    fields: Vec<ColumnSchema>,
}

#[derive(Debug, Deserialize)]
struct TableResource {
    #[serde(default)]
    schema: Option<TableSchema>,
}

#[derive(Debug, Serialize)]
struct SchemaPatch {
    schema: TableSchema,
}

#[derive(Debug, Serialize)]
struct JobResource {
    configuration: JobConfiguration,
}

#[derive(Debug, Serialize)]
struct JobConfiguration {
    load: LoadConfiguration,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoadConfiguration {
    destination_table: DestinationTable,
    source_format: String,
    write_disposition: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DestinationTable {
    project_id: String,
    dataset_id: String,
    table_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmittedJob {
    job_reference: JobReference,
    status: JobStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobReference {
    job_id: String,
    #[serde(default)]
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobStatus {
    state: String,
    #[serde(default)]
    error_result: Option<ErrorProto>,
}

#[derive(Debug, Deserialize)]
struct ErrorProto {
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorProto {
    fn describe(&self) -> String {
        format!(
            "{}: {}",
            self.reason.as_deref().unwrap_or("unknown"),
            self.message.as_deref().unwrap_or_default()
        )
    }
}

impl BigQueryClient {
    /// Create a new BigQueryClient from configuration
    pub fn new(config: &WarehouseConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            poll_interval: Duration::from_secs(config.poll_interval_secs),
        }
    }

    fn table_url(&self, table: &TableId) -> String {
        format!(
            "{}/bigquery/v2/projects/{}/datasets/{}/tables/{}",
            self.endpoint, table.project, table.dataset, table.table
        )
    }

    fn job_url(&self, project: &str, job_id: &str) -> String {
        format!(
            "{}/bigquery/v2/projects/{}/jobs/{}",
            self.endpoint, project, job_id
        )
    }

    fn upload_url(&self, project: &str) -> String {
        format!(
            "{}/upload/bigquery/v2/projects/{}/jobs?uploadType=resumable",
            self.endpoint, project
        )
    }

    /// Map non-2xx responses to WarehouseError::Api
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(WarehouseError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Poll a submitted job until it reports DONE
    ///
    /// No timeout: the batch blocks on the warehouse, matching the
    /// sequential one-table-at-a-time model.
    async fn wait_for_job(&self, project: &str, job: &JobReference) -> Result<()> {
        loop {
            let mut request = self
                .http
                .get(self.job_url(project, &job.job_id))
                .bearer_auth(&self.access_token);
            if let Some(location) = &job.location {
                request = request.query(&[("location", location)]);
            }

            let response = Self::check(request.send().await?).await?;
            let current: SubmittedJob = response.json().await?;

            if current.status.state == "DONE" {
                if let Some(error) = current.status.error_result {
                    return Err(WarehouseError::LoadJob(error.describe()));
                }
                return Ok(());
            }

            debug!("Load job {} is {}", job.job_id, current.status.state);
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl Warehouse for BigQueryClient {
    async fn load_parquet(&self, table: &TableId, file: &Path) -> Result<()> {
        let job = JobResource {
            configuration: JobConfiguration {
                load: LoadConfiguration {
                    destination_table: DestinationTable {
                        project_id: table.project.clone(),
                        dataset_id: table.dataset.clone(),
                        table_id: table.table.clone(),
                    },
                    source_format: "PARQUET".to_string(),
                    write_disposition: "WRITE_TRUNCATE".to_string(),
                },
            },
        };

        // Open a resumable upload session for the load job
        let response = self
            .http
            .post(self.upload_url(&table.project))
            .bearer_auth(&self.access_token)
            .json(&job)
            .send()
            .await?;
        let response = Self::check(response).await?;

        let session_url = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                WarehouseError::LoadJob("Upload session response carried no Location".to_string())
            })?;

        // Ship the file bytes through the session
        let payload = tokio::fs::read(file).await?;
        info!(
            "Uploading {} ({} bytes) into {}",
            file.display(),
            payload.len(),
            table
        );
        let response = self
            .http
            .put(&session_url)
            .bearer_auth(&self.access_token)
            .body(payload)
            .send()
            .await?;
        let response = Self::check(response).await?;
        let submitted: SubmittedJob = response.json().await?;

        self.wait_for_job(&table.project, &submitted.job_reference)
            .await
    }

    async fn table_schema(&self, table: &TableId) -> Result<Vec<ColumnSchema>> {
        let response = self
            .http
            .get(self.table_url(table))
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let response = Self::check(response).await?;
        let resource: TableResource = response.json().await?;

        Ok(resource.schema.map(|schema| schema.fields).unwrap_or_default())
    }

    async fn update_table_schema(&self, table: &TableId, columns: Vec<ColumnSchema>) -> Result<()> {
        let patch = SchemaPatch {
            schema: TableSchema { fields: columns },
        };

        let response = self
            .http
            .patch(self.table_url(table))
            .bearer_auth(&self.access_token)
            .json(&patch)
            .send()
            .await?;
        Self::check(response).await?;

        Ok(())
    }
}
