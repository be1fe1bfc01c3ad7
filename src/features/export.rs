use std::fs;
use std::path::PathBuf;

use log::info;

use crate::error::MarkerError;
use crate::features::action_log::ActionLog;
use crate::features::storage::output_dir_for;

/// Write the log export as a plain-text file and return its path. An empty
/// log is refused rather than producing an empty file.
pub fn write_export(
    log: &ActionLog,
    source_uri: Option<&str>,
    file_name: &str,
) -> Result<PathBuf, MarkerError> {
    let text = log.export().ok_or(MarkerError::EmptyLog)?;
    let path = output_dir_for(source_uri).join(file_name);
    fs::write(&path, text.as_bytes()).map_err(|e| MarkerError::ExportFailed(e.to_string()))?;
    info!("exported {} log entries to {}", log.len(), path.display());
    Ok(path)
}
