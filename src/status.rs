//! Reader for the status record written alongside a backup.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// File name the backup job writes into the backup directory.
pub const STATUS_FILE: &str = "backup_status.json";

/// Binlog position of the origin node at backup time.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MasterCoordinates {
    pub file: String,
    pub position: u64,
}

/// Replication position of the origin node's own master at backup time.
/// Present only when the backup was taken from a slave.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SlaveCoordinates {
    pub relay_master_log_file: String,
    pub exec_master_log_pos: u64,
    /// IP address (or name) of the master the origin slave was replicating from.
    pub master_host: String,
}

/// Metadata recorded when the backup was taken. Read-only for the run.
#[derive(Debug, Clone, Deserialize)]
pub struct BackupStatus {
    pub copy_method: String,
    pub origin_host: String,
    pub master_coordinates: Option<MasterCoordinates>,
    pub slave_coordinates: Option<SlaveCoordinates>,
    /// Data subdirectories the backup carries; used as a cleanup manifest.
    #[serde(default)]
    pub dirs_to_restore: Vec<String>,
}

/// Loads the status record from a backup directory.
/// Returns `Ok(None)` when the directory has no status file at all.
pub fn load_status(dir: &Path) -> Result<Option<BackupStatus>> {
    let path = dir.join(STATUS_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read backup status at {}", path.display()))?;
    let status = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse backup status at {}", path.display()))?;
    Ok(Some(status))
}
