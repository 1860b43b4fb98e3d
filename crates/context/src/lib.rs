use std::sync::Arc;

use anyhow::{Context as _, Result};
use config::Config;
use dap::DapClient;
use tracing::info;
use warehouse::{BigQueryClient, Warehouse};

pub mod batch;

pub use batch::run_batch;

/// Everything one batch run needs, explicitly constructed and passed
///
/// There is no process-global client or configuration; integration tests
/// build a context around an in-memory warehouse.
pub struct EtlContext {
    pub config: Config,
    pub dap: DapClient,
    pub warehouse: Arc<dyn Warehouse>,
}

impl EtlContext {
    /// Build a context from an already-loaded configuration and a
    /// warehouse implementation
    pub fn new(config: Config, warehouse: Arc<dyn Warehouse>) -> Self {
        let dap = DapClient::new(config.dap.clone());
        Self {
            config,
            dap,
            warehouse,
        }
    }
}

/// Create the batch context
///
/// Parameters:
/// - config_file: Optional path to TOML configuration file. If None, uses
///   environment variables.
pub fn create_context(config_file: Option<&str>) -> Result<EtlContext> {
    let app_config = Config::load(config_file).context("Failed to load configuration")?;

    if let Some(file) = config_file {
        info!("Loaded configuration from: {}", file);
    } else {
        info!("Loaded configuration from environment variables");
    }

    // Validate the configuration - fail if invalid
    app_config.validate().context("Invalid configuration")?;

    info!("Using DAP configuration:");
    info!("  Base URL: {}", app_config.dap.base_url);
    info!("  Namespace: {}", app_config.dap.namespace);
    info!("  Downloads directory: {}", app_config.dap.downloads_dir);

    info!("Using warehouse configuration:");
    info!("  Project: {}", app_config.warehouse.project);
    info!("  Dataset: {}", app_config.warehouse.dataset);
    info!("  Endpoint: {}", app_config.warehouse.endpoint);

    let bigquery = Arc::new(BigQueryClient::new(&app_config.warehouse));

    Ok(EtlContext::new(app_config, bigquery))
}
