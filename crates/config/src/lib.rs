use anyhow::{Context, Result};
use config_rs::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[derive(Default)]
pub struct Config {
    /// Extraction tool (DAP CLI) configuration
    #[serde(default)]
    pub dap: DapConfig,

    /// Destination warehouse configuration
    #[serde(default)]
    pub warehouse: WarehouseConfig,
}

/// Configuration for the DAP extraction tool subprocess
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DapConfig {
    /// Extraction tool executable name or path
    #[serde(default = "default_binary")]
    pub binary: String,

    /// API gateway base URL the tool talks to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// OAuth client id for the extraction tool
    #[serde(default)]
    pub client_id: String,

    /// OAuth client secret for the extraction tool
    #[serde(default)]
    pub client_secret: String,

    /// Source namespace passed to every invocation
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Directory the extraction tool stages its outputs under
    #[serde(default = "default_downloads_dir")]
    pub downloads_dir: String,
}

/// Configuration for the destination warehouse (BigQuery)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Destination project id
    #[serde(default)]
    pub project: String,

    /// Destination dataset id
    #[serde(default)]
    pub dataset: String,

    /// REST endpoint, overridable for emulators and tests
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// OAuth2 bearer token; acquisition is outside this tool
    #[serde(default)]
    pub access_token: String,

    /// Seconds between load-job status polls
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

// Default value functions
fn default_binary() -> String {
    "dap".to_string()
}

fn default_base_url() -> String {
    "https://api-gateway.instructure.com".to_string()
}

fn default_namespace() -> String {
    "canvas".to_string()
}

fn default_downloads_dir() -> String {
    "downloads".to_string()
}

fn default_endpoint() -> String {
    "https://bigquery.googleapis.com".to_string()
}

fn default_poll_interval() -> u64 {
    5
}

impl Default for DapConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            base_url: default_base_url(),
            client_id: String::new(),
            client_secret: String::new(),
            namespace: default_namespace(),
            downloads_dir: default_downloads_dir(),
        }
    }
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            project: String::new(),
            dataset: String::new(),
            endpoint: default_endpoint(),
            access_token: String::new(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl Config {
    /// Load Config with layered configuration priority:
    /// 1. Default values
    /// 2. TOML file (if provided)
    /// 3. Environment variables (DAP__* / WAREHOUSE__* nested keys)
    /// 4. Conventional environment names (API_KEY, API_SECRET, PROJECT,
    ///    DATASET, WAREHOUSE_ACCESS_TOKEN) as fallback for empty values
    pub fn load(config_file: Option<&str>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder()
            // DAP defaults
            .set_default("dap.binary", default_binary())?
            .set_default("dap.base_url", default_base_url())?
            .set_default("dap.client_id", "")?
            .set_default("dap.client_secret", "")?
            .set_default("dap.namespace", default_namespace())?
            .set_default("dap.downloads_dir", default_downloads_dir())?
            // Warehouse defaults
            .set_default("warehouse.project", "")?
            .set_default("warehouse.dataset", "")?
            .set_default("warehouse.endpoint", default_endpoint())?
            .set_default("warehouse.access_token", "")?
            .set_default("warehouse.poll_interval_secs", default_poll_interval())?;

        // Add TOML file if provided
        if let Some(file_path) = config_file {
            let path = Path::new(file_path);
            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            builder = builder.add_source(File::from(path));
        }

        // Nested keys via double underscore, e.g. DAP__CLIENT_ID,
        // WAREHOUSE__PROJECT
        builder = builder.add_source(Environment::default().separator("__").try_parsing(true));

        let config = builder.build().context("Failed to build configuration")?;

        let mut app_config: Config = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        // Fallback: the conventional names the batch job has always been
        // configured with
        if app_config.dap.client_id.is_empty() {
            if let Ok(key) = std::env::var("API_KEY") {
                app_config.dap.client_id = key;
            }
        }

        if app_config.dap.client_secret.is_empty() {
            if let Ok(secret) = std::env::var("API_SECRET") {
                app_config.dap.client_secret = secret;
            }
        }

        if app_config.warehouse.project.is_empty() {
            if let Ok(project) = std::env::var("PROJECT") {
                app_config.warehouse.project = project;
            }
        }

        if app_config.warehouse.dataset.is_empty() {
            if let Ok(dataset) = std::env::var("DATASET") {
                app_config.warehouse.dataset = dataset;
            }
        }

        if app_config.warehouse.access_token.is_empty() {
            if let Ok(token) = std::env::var("WAREHOUSE_ACCESS_TOKEN") {
                app_config.warehouse.access_token = token;
            }
        }

        Ok(app_config)
    }

    /// Load Config from a TOML file
    ///
    /// Environment variables can still override values from the file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load(path.as_ref().to_str())
    }

    /// Create a new Config from environment variables with defaults
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.dap.validate()?;
        self.warehouse.validate()?;
        Ok(())
    }
}

impl DapConfig {
    /// Validate the DAP configuration
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.binary.is_empty(), "DAP binary cannot be empty");
        anyhow::ensure!(
            !self.client_id.is_empty(),
            "DAP client id cannot be empty (set API_KEY)"
        );
        anyhow::ensure!(
            !self.client_secret.is_empty(),
            "DAP client secret cannot be empty (set API_SECRET)"
        );
        anyhow::ensure!(!self.namespace.is_empty(), "DAP namespace cannot be empty");
        anyhow::ensure!(
            !self.downloads_dir.is_empty(),
            "DAP downloads directory cannot be empty"
        );

        url::Url::parse(&self.base_url)
            .with_context(|| format!("Invalid DAP base URL: {}", self.base_url))?;

        Ok(())
    }
}

impl WarehouseConfig {
    /// Validate the warehouse configuration
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.project.is_empty(),
            "Warehouse project cannot be empty (set PROJECT)"
        );
        anyhow::ensure!(
            !self.dataset.is_empty(),
            "Warehouse dataset cannot be empty (set DATASET)"
        );
        anyhow::ensure!(
            !self.access_token.is_empty(),
            "Warehouse access token cannot be empty (set WAREHOUSE_ACCESS_TOKEN)"
        );

        url::Url::parse(&self.endpoint)
            .with_context(|| format!("Invalid warehouse endpoint: {}", self.endpoint))?;

        Ok(())
    }
}
