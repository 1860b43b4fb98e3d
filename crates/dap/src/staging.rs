use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;

/// Discover the job id of the current extraction run: the first
/// subdirectory found under the downloads directory
pub fn discover_job_id(downloads_dir: &Path) -> Result<Option<String>> {
    for entry in fs::read_dir(downloads_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                return Ok(Some(name.to_string()));
            }
        }
    }

    Ok(None)
}

/// List the parquet payload files in a job's staging directory
///
/// Exactly one file is expected per job; callers treat an empty listing as
/// "no data extracted" and skip the table.
pub fn parquet_files(job_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(job_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "parquet") {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Remove a job's staging directory and everything in it
pub fn cleanup_job(job_dir: &Path) -> Result<()> {
    debug!("Removing staging directory {}", job_dir.display());
    fs::remove_dir_all(job_dir)?;
    Ok(())
}
