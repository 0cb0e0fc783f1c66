//! Sequences the restore: validate everything, report the plan, then run the
//! side-effecting steps in order. Safety comes from validating beforehand,
//! not from rolling back afterwards.

use chrono::Local;
use std::path::PathBuf;
use tracing::info;

use crate::config::{ClusterTopology, NodeInfo};
use crate::dbctl::{ChangeMasterParams, DatabaseControl};
use crate::errors::{AppError, Result};
use crate::restore::coordinates::{select_coordinates, CoordinateSelection};
use crate::restore::eligibility::{check_eligibility, Eligibility};
use crate::restore::mode::{RestoreMode, Role};
use crate::restore::peer::{resolve_peer, PeerResolution};
use crate::status::{load_status, BackupStatus};
use crate::transport::BackupTransport;

/// Operator input for one restore run, resolved from the CLI.
#[derive(Debug, Clone)]
pub struct RestoreSettings {
    pub mode: String,
    pub src_dir: Option<PathBuf>,
    pub dest_dir: Option<PathBuf>,
    pub version: Option<String>,
    pub dry_run: bool,
    pub skip_mysqld: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RestoreOutcome {
    Completed,
    DryRun,
    ListedVersions,
}

/// Everything needed to point the restored node at its master.
/// Computed once, consumed exactly once.
#[derive(Debug, Clone)]
struct ReplicationPlan {
    peer_host: String,
    peer: NodeInfo,
    master_log_file: String,
    master_log_pos: u64,
}

fn step_failed(step: &'static str) -> impl FnOnce(anyhow::Error) -> AppError {
    move |source| AppError::Collaborator { step, source }
}

/// Runs one restore end to end. All validation happens before the first
/// side-effecting step; once side effects begin, the first failure is fatal
/// and nothing is undone.
pub async fn run_restore_flow<T, D>(
    settings: &RestoreSettings,
    topology: &ClusterTopology,
    transport: &T,
    dbctl: &D,
) -> Result<RestoreOutcome>
where
    T: BackupTransport,
    D: DatabaseControl,
{
    let mode = RestoreMode::parse(&settings.mode)?;
    let skip_mysqld = settings.skip_mysqld || mode.skips_mysqld();

    let local = topology.local();
    let src_dir = settings
        .src_dir
        .clone()
        .unwrap_or_else(|| local.backup_dir.clone());
    let dest_dir = settings
        .dest_dir
        .clone()
        .unwrap_or_else(|| local.restore_dir.clone());

    transport
        .check_source(&src_dir)
        .await
        .map_err(step_failed("check-source"))?;
    transport
        .check_destination(&dest_dir)
        .await
        .map_err(step_failed("check-destination"))?;

    let status = load_status(&src_dir)
        .map_err(|e| AppError::Config(format!("{e:#}")))?
        .ok_or_else(|| AppError::StatusMissing(src_dir.display().to_string()))?;

    let version = match check_eligibility(
        &status,
        topology,
        settings.version.as_deref(),
        &src_dir,
        transport,
    )
    .await?
    {
        Eligibility::ListRequested => return Ok(RestoreOutcome::ListedVersions),
        Eligibility::Ready { version } => version,
    };
    let incremental = topology
        .copy_method(&status.copy_method)
        .is_some_and(|m| m.incremental);

    // Peer and coordinates are resolved while the node is still untouched; an
    // unknown peer must never leave a half-restored data directory behind.
    let plan = match resolve_peer(mode, &status, topology, skip_mysqld)? {
        PeerResolution::None => None,
        PeerResolution::Peer { host, node } => match select_coordinates(mode, &status)? {
            CoordinateSelection::Skip => None,
            CoordinateSelection::Coordinates { file, position } => Some(ReplicationPlan {
                peer_host: host,
                peer: node,
                master_log_file: file,
                master_log_pos: position,
            }),
        },
    };

    report_plan(mode, &src_dir, &dest_dir, &status, incremental, version.as_deref(), skip_mysqld, plan.as_ref());

    if settings.dry_run {
        println!("💡 Dry run requested; nothing was changed.");
        return Ok(RestoreOutcome::DryRun);
    }

    if skip_mysqld {
        info!("mysqld stop skipped");
    } else {
        dbctl.stop().await.map_err(step_failed("stop-mysqld"))?;
    }

    if incremental {
        // Eligibility guarantees a version for incremental methods.
        let v = version
            .as_deref()
            .ok_or_else(|| AppError::MissingVersion(status.copy_method.clone()))?;
        transport
            .restore_incremental(&status.copy_method, &src_dir, &dest_dir, v)
            .await
            .map_err(step_failed("restore-data"))?;
    } else {
        transport
            .restore(&status.copy_method, &src_dir, &dest_dir)
            .await
            .map_err(step_failed("restore-data"))?;
    }

    transport
        .cleanup(&status, &dest_dir)
        .await
        .map_err(step_failed("cleanup"))?;

    if skip_mysqld {
        info!("mysqld start skipped");
    } else {
        dbctl.start().await.map_err(step_failed("start-mysqld"))?;
    }

    match plan {
        Some(plan) => {
            let params = ChangeMasterParams {
                master_host: plan.peer.ip.clone(),
                master_port: plan.peer.mysql_port,
                master_user: plan.peer.repl_user.clone(),
                master_password: plan.peer.repl_password.clone(),
                master_log_file: plan.master_log_file.clone(),
                master_log_pos: plan.master_log_pos,
            };
            dbctl
                .change_master_to(&params)
                .await
                .map_err(step_failed("change-master"))?;
        }
        None if mode.dest_role() == Some(Role::Single) => {
            println!("ℹ️ Destination role is single; replication not configured.");
        }
        None => {}
    }

    Ok(RestoreOutcome::Completed)
}

#[allow(clippy::too_many_arguments)]
fn report_plan(
    mode: RestoreMode,
    src_dir: &std::path::Path,
    dest_dir: &std::path::Path,
    status: &BackupStatus,
    incremental: bool,
    version: Option<&str>,
    skip_mysqld: bool,
    plan: Option<&ReplicationPlan>,
) {
    println!("📋 Restore plan ({})", Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!("   mode:         {}", mode);
    println!("   source:       {}", src_dir.display());
    println!("   destination:  {}", dest_dir.display());
    println!(
        "   copy method:  {}{}",
        status.copy_method,
        if incremental { " (incremental)" } else { "" }
    );
    if let Some(v) = version {
        println!("   version:      {}", v);
    }
    println!(
        "   mysqld:       {}",
        if skip_mysqld { "untouched" } else { "stop before restore, start after" }
    );
    match plan {
        Some(p) => println!(
            "   replication:  from {} ({}:{}) starting at {}:{}",
            p.peer_host, p.peer.ip, p.peer.mysql_port, p.master_log_file, p.master_log_pos
        ),
        None => println!("   replication:  not configured"),
    }
}
