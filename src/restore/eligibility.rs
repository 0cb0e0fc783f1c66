//! Decides whether the backup is restorable at all, before anything is touched.

use std::path::Path;
use tracing::warn;

use crate::config::ClusterTopology;
use crate::errors::{AppError, Result};
use crate::status::BackupStatus;
use crate::transport::BackupTransport;

/// The literal version argument that turns the run into a listing.
pub const VERSION_LIST: &str = "list";

#[derive(Debug, PartialEq, Eq)]
pub enum Eligibility {
    /// Operator asked for the increment list; the run stops here, successfully.
    ListRequested,
    Ready { version: Option<String> },
}

/// Validates the backup's copy method and the incremental-version argument.
///
/// Incremental backups cannot be applied without a version, so omitting it is
/// a hard failure; the available versions are printed first so the operator
/// can pick one.
pub async fn check_eligibility<T: BackupTransport>(
    status: &BackupStatus,
    topology: &ClusterTopology,
    version_arg: Option<&str>,
    src_dir: &Path,
    transport: &T,
) -> Result<Eligibility> {
    let method = topology
        .copy_method(&status.copy_method)
        .ok_or_else(|| AppError::UnknownCopyMethod(status.copy_method.clone()))?;

    if version_arg == Some(VERSION_LIST) {
        transport
            .list_increments(src_dir, &status.copy_method)
            .await
            .map_err(|source| AppError::Collaborator { step: "list-increments", source })?;
        return Ok(Eligibility::ListRequested);
    }

    if method.incremental {
        match version_arg {
            Some(version) if !version.is_empty() => Ok(Eligibility::Ready {
                version: Some(version.to_string()),
            }),
            _ => {
                eprintln!(
                    "⚠️ Copy method '{}' is incremental; --version is required.",
                    status.copy_method
                );
                if let Err(e) = transport.list_increments(src_dir, &status.copy_method).await {
                    warn!("could not list available increments: {e:#}");
                }
                Err(AppError::MissingVersion(status.copy_method.clone()))
            }
        }
    } else {
        Ok(Eligibility::Ready {
            version: version_arg.map(str::to_string),
        })
    }
}
