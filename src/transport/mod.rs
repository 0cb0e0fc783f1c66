// restoretool/src/transport/mod.rs
pub(crate) mod rsync;

pub use rsync::RsyncTransport;

use anyhow::Result;
use std::path::Path;

use crate::status::BackupStatus;

/// Moves backup bytes around. The restore flow is generic over this trait so
/// tests can substitute a recording implementation.
pub trait BackupTransport {
    /// Checks that the backup source directory is usable.
    async fn check_source(&self, dir: &Path) -> Result<()>;

    /// Checks that the restore destination directory is usable.
    async fn check_destination(&self, dir: &Path) -> Result<()>;

    /// Prints the incremental versions available under the backup directory.
    async fn list_increments(&self, dir: &Path, method: &str) -> Result<()>;

    /// Applies a full (non-incremental) backup onto the destination.
    async fn restore(&self, method: &str, src: &Path, dst: &Path) -> Result<()>;

    /// Applies the base copy plus every increment up to and including `version`.
    async fn restore_incremental(
        &self,
        method: &str,
        src: &Path,
        dst: &Path,
        version: &str,
    ) -> Result<()>;

    /// Strips stale replication state from the restored data directory and
    /// verifies the restored tree against the status manifest.
    async fn cleanup(&self, status: &BackupStatus, dst: &Path) -> Result<()>;
}
