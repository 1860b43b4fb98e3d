use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};
use tracing::{error, info, warn};
use warehouse::TableId;

use crate::EtlContext;

/// Process every available table once: extract, load, sync schema
/// descriptions, clean up
///
/// Each table is wrapped in its own failure boundary: an error is logged
/// with the table name and the batch moves on. No retry, no early abort.
pub async fn run_batch(ctx: &EtlContext) -> Result<()> {
    let tables = ctx
        .dap
        .list_tables()
        .await
        .context("Failed to list tables")?;

    if tables.is_empty() {
        warn!("No tables found.");
        return Ok(());
    }

    info!("Processing {} tables", tables.len());

    for table in &tables {
        if let Err(e) = process_table(ctx, table).await {
            error!("Error loading table {} to BigQuery: {:#}", table, e);
        }
    }

    Ok(())
}

/// One table's full pipeline: snapshot, locate staged parquet, load with
/// overwrite, export and merge schema descriptions, clean up staging
async fn process_table(ctx: &EtlContext, table: &str) -> Result<()> {
    let downloads_dir = Path::new(&ctx.config.dap.downloads_dir);
    let table_id = TableId::new(
        &ctx.config.warehouse.project,
        &ctx.config.warehouse.dataset,
        table,
    );

    ctx.dap.snapshot(table).await?;

    let Some(job_id) = dap::staging::discover_job_id(downloads_dir)? else {
        warn!("No extraction job directory found for table {}", table);
        return Ok(());
    };
    let job_dir = downloads_dir.join(&job_id);

    let files = dap::staging::parquet_files(&job_dir)?;
    let Some(parquet_file) = files.first() else {
        warn!("No parquet files found for job {}.", job_id);
        return Ok(());
    };

    ctx.warehouse
        .load_parquet(&table_id, parquet_file)
        .await
        .with_context(|| {
            format!(
                "Failed to load {} into {}",
                parquet_file.display(),
                table_id
            )
        })?;

    // Refresh the description document, then merge it into the live schema.
    // A table without a document still counts as successfully loaded.
    ctx.dap.export_schema(table).await?;
    let schema_file = schema::latest_schema_file(downloads_dir, table)?;
    match &schema_file {
        Some(path) => sync_schema(ctx, &table_id, path).await?,
        None => info!(
            "No schema document available for table {}, skipping description sync",
            table
        ),
    }

    // Staging artifacts are per-iteration; drop them once the table is in
    dap::staging::cleanup_job(&job_dir)?;
    if let Some(path) = &schema_file {
        fs::remove_file(path)
            .with_context(|| format!("Failed to remove schema document {}", path.display()))?;
    }

    info!("Table {} loaded to BigQuery.", table);
    Ok(())
}

/// Merge the descriptions from one schema document into the table's live
/// schema and commit the result
async fn sync_schema(ctx: &EtlContext, table_id: &TableId, doc_path: &Path) -> Result<()> {
    let doc = schema::load_schema_doc(doc_path)?;
    let live = ctx.warehouse.table_schema(table_id).await?;

    let merged = schema::reconcile(&live, schema::field_properties(&doc));
    if merged.applied == 0 {
        // A mis-keyed document merges nothing and raises nothing; surface
        // the emptiness here
        warn!(
            "Schema document {} applied no descriptions to {}",
            doc_path.display(),
            table_id
        );
    } else {
        info!(
            "Applied {} column descriptions to {} ({} truncated)",
            merged.applied, table_id, merged.truncated
        );
    }

    ctx.warehouse
        .update_table_schema(table_id, merged.columns)
        .await?;

    Ok(())
}
