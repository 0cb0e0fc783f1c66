//! Command line argument definitions.

use clap::Parser;
use std::path::PathBuf;

/// Restore this node from a backup and rewire replication against its peer.
#[derive(Parser, Debug)]
#[command(name = "restoretool", disable_version_flag = true)]
pub struct Cli {
    /// Path to the cluster topology config (JSON)
    #[arg(long, value_name = "FILE", default_value = "restore.json")]
    pub config: PathBuf,

    /// Backup directory to restore from (defaults to this node's backup_dir)
    #[arg(long, value_name = "DIR")]
    pub src_dir: Option<PathBuf>,

    /// Directory to restore the data into (defaults to this node's restore_dir)
    #[arg(long, value_name = "DIR")]
    pub dest_dir: Option<PathBuf>,

    /// Restore mode: <source-role>-<dest-role> (e.g. master-slave) or data-only
    #[arg(long, value_name = "MODE")]
    pub mode: Option<String>,

    /// Incremental version to restore up to; pass 'list' to show available versions
    #[arg(long, value_name = "VERSION")]
    pub version: Option<String>,

    /// Report the restore plan and exit without touching anything
    #[arg(long)]
    pub dry_run: bool,

    /// Skip stopping/starting mysqld and replication wiring
    #[arg(long)]
    pub skip_mysqld: bool,

    /// Print program version and exit
    #[arg(long)]
    pub version_info: bool,
}
