// restoretool/src/transport/rsync.rs
//
// Backup layout produced by the backup job:
//   <backup-dir>/backup_status.json
//   <backup-dir>/data/               base copy
//   <backup-dir>/increments/<ver>/   one overlay per incremental version

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;
use which::which;

use super::BackupTransport;
use crate::status::BackupStatus;

const DATA_SUBDIR: &str = "data";
const INCREMENTS_SUBDIR: &str = "increments";

// Replication state files that must not survive a restore; a restored node
// gets fresh coordinates (or none at all).
const STALE_STATE_FILES: &[&str] = &["master.info", "relay-log.info", "auto.cnf"];

pub struct RsyncTransport;

impl RsyncTransport {
    pub fn new() -> Self {
        RsyncTransport
    }
}

impl Default for RsyncTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn find_rsync_executable() -> Result<PathBuf> {
    which("rsync").context("rsync executable not found in PATH")
}

/// Runs rsync and folds a non-zero exit into an error carrying stderr.
fn run_rsync(args: &[&str]) -> Result<()> {
    let rsync_path = find_rsync_executable()?;
    debug!(?args, "running rsync");
    let output = Command::new(rsync_path)
        .args(args)
        .output()
        .context("Failed to execute rsync")?;
    if !output.status.success() {
        anyhow::bail!(
            "rsync failed (status {}).\nStderr: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(())
}

fn check_dir(dir: &Path, what: &str) -> Result<()> {
    let meta = fs::metadata(dir)
        .with_context(|| format!("{} directory {} is not accessible", what, dir.display()))?;
    if !meta.is_dir() {
        anyhow::bail!("{} path {} is not a directory", what, dir.display());
    }
    Ok(())
}

/// Incremental versions present under the backup dir, sorted ascending.
fn available_increments(dir: &Path) -> Result<Vec<String>> {
    let increments_dir = dir.join(INCREMENTS_SUBDIR);
    if !increments_dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut versions = Vec::new();
    for entry in fs::read_dir(&increments_dir)
        .with_context(|| format!("Failed to list {}", increments_dir.display()))?
    {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            versions.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    versions.sort();
    Ok(versions)
}

/// rsync source argument with a trailing slash so the directory contents are
/// copied rather than the directory itself.
fn dir_contents_arg(dir: &Path) -> String {
    format!("{}/", dir.display())
}

impl BackupTransport for RsyncTransport {
    async fn check_source(&self, dir: &Path) -> Result<()> {
        check_dir(dir, "Backup source")?;
        check_dir(&dir.join(DATA_SUBDIR), "Backup data")
    }

    async fn check_destination(&self, dir: &Path) -> Result<()> {
        check_dir(dir, "Restore destination")
    }

    async fn list_increments(&self, dir: &Path, method: &str) -> Result<()> {
        let versions = available_increments(dir)?;
        if versions.is_empty() {
            println!("No incremental versions found under {} (copy method: {})", dir.display(), method);
        } else {
            println!("Available incremental versions under {} (copy method: {}):", dir.display(), method);
            for version in versions {
                println!("  {}", version);
            }
        }
        Ok(())
    }

    async fn restore(&self, method: &str, src: &Path, dst: &Path) -> Result<()> {
        println!("📦 Restoring full backup ({}) from {} to {}", method, src.display(), dst.display());
        let base = src.join(DATA_SUBDIR);
        run_rsync(&["-a", "--delete", &dir_contents_arg(&base), &dir_contents_arg(dst)])
            .with_context(|| format!("Full restore from {} failed", base.display()))
    }

    async fn restore_incremental(
        &self,
        method: &str,
        src: &Path,
        dst: &Path,
        version: &str,
    ) -> Result<()> {
        let versions = available_increments(src)?;
        if !versions.iter().any(|v| v == version) {
            anyhow::bail!(
                "Incremental version '{}' not found under {} (available: {})",
                version,
                src.display(),
                if versions.is_empty() { "none".to_string() } else { versions.join(", ") }
            );
        }

        println!(
            "📦 Restoring incremental backup ({}) from {} to {}, up to version {}",
            method,
            src.display(),
            dst.display(),
            version
        );
        let base = src.join(DATA_SUBDIR);
        run_rsync(&["-a", "--delete", &dir_contents_arg(&base), &dir_contents_arg(dst)])
            .with_context(|| format!("Base restore from {} failed", base.display()))?;

        // Overlay increments in order; no --delete, deltas only add or replace.
        for v in versions.iter().take_while(|v| v.as_str() <= version) {
            let increment = src.join(INCREMENTS_SUBDIR).join(v);
            println!("  applying increment {}", v);
            run_rsync(&["-a", &dir_contents_arg(&increment), &dir_contents_arg(dst)])
                .with_context(|| format!("Applying increment {} failed", v))?;
        }
        Ok(())
    }

    async fn cleanup(&self, status: &BackupStatus, dst: &Path) -> Result<()> {
        for name in STALE_STATE_FILES {
            let path = dst.join(name);
            if path.exists() {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
                println!("🧹 Removed stale {}", path.display());
            }
        }
        for entry in fs::read_dir(dst)
            .with_context(|| format!("Failed to list restore dir {}", dst.display()))?
        {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.contains("relay-bin") && entry.file_type()?.is_file() {
                fs::remove_file(entry.path())
                    .with_context(|| format!("Failed to remove {}", entry.path().display()))?;
                println!("🧹 Removed stale relay log {}", name);
            }
        }

        // The status manifest names the directories the backup carried; all of
        // them must have made it across.
        for dir in &status.dirs_to_restore {
            let path = dst.join(dir);
            if !path.is_dir() {
                anyhow::bail!(
                    "Restored tree is missing directory '{}' listed in the backup status",
                    dir
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_status(dirs: Vec<&str>) -> BackupStatus {
        serde_json::from_value(json!({
            "copy_method": "rsync",
            "origin_host": "node2",
            "dirs_to_restore": dirs
        }))
        .expect("valid status json")
    }

    #[tokio::test]
    async fn test_check_source_requires_data_subdir() -> anyhow::Result<()> {
        let transport = RsyncTransport::new();
        let dir = tempfile::tempdir()?;
        assert!(transport.check_source(dir.path()).await.is_err());

        fs::create_dir(dir.path().join(DATA_SUBDIR))?;
        transport.check_source(dir.path()).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_check_destination_rejects_missing_dir() {
        let transport = RsyncTransport::new();
        let result = transport
            .check_destination(Path::new("/nonexistent/restore/dir"))
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_available_increments_sorted() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let increments = dir.path().join(INCREMENTS_SUBDIR);
        for v in ["0003", "0001", "0002"] {
            fs::create_dir_all(increments.join(v))?;
        }
        // Plain files under increments/ are not versions.
        fs::write(increments.join("notes.txt"), "x")?;

        assert_eq!(available_increments(dir.path())?, vec!["0001", "0002", "0003"]);
        Ok(())
    }

    #[test]
    fn test_available_increments_empty_without_dir() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        assert!(available_increments(dir.path())?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_restore_incremental_rejects_unknown_version() -> anyhow::Result<()> {
        let transport = RsyncTransport::new();
        let src = tempfile::tempdir()?;
        let dst = tempfile::tempdir()?;
        fs::create_dir_all(src.path().join(INCREMENTS_SUBDIR).join("0001"))?;

        let result = transport
            .restore_incremental("rsync-incr", src.path(), dst.path(), "0009")
            .await;
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("0009"));
        assert!(message.contains("0001"));
        Ok(())
    }

    #[tokio::test]
    async fn test_cleanup_removes_stale_replication_state() -> anyhow::Result<()> {
        let transport = RsyncTransport::new();
        let dst = tempfile::tempdir()?;
        for name in ["master.info", "relay-log.info", "auto.cnf", "node1-relay-bin.000002"] {
            fs::write(dst.path().join(name), "stale")?;
        }
        fs::write(dst.path().join("ibdata1"), "keep")?;
        fs::create_dir(dst.path().join("mydb"))?;

        transport.cleanup(&sample_status(vec!["mydb"]), dst.path()).await?;

        assert!(!dst.path().join("master.info").exists());
        assert!(!dst.path().join("relay-log.info").exists());
        assert!(!dst.path().join("auto.cnf").exists());
        assert!(!dst.path().join("node1-relay-bin.000002").exists());
        assert!(dst.path().join("ibdata1").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_cleanup_checks_manifest() -> anyhow::Result<()> {
        let transport = RsyncTransport::new();
        let dst = tempfile::tempdir()?;
        let result = transport.cleanup(&sample_status(vec!["missing_db"]), dst.path()).await;
        assert!(format!("{:#}", result.unwrap_err()).contains("missing_db"));
        Ok(())
    }
}
