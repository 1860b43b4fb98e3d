use anyhow::Result;
use clap::Parser;
use context::{create_context, run_batch};
use tracing::info;

/// DAP to BigQuery batch loader
#[derive(Parser, Debug)]
#[command(name = "dap-bigquery")]
#[command(
    about = "Load DAP table snapshots into BigQuery and sync schema descriptions",
    long_about = None
)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber with environment filter
    // Set RUST_LOG environment variable to control log level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    info!("Starting DAP to BigQuery");

    let ctx = create_context(args.config.as_deref())?;
    run_batch(&ctx).await?;

    Ok(())
}
