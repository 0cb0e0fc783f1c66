//! Cluster Node Restore Tool
//!
//! Restores this node from a backup and re-establishes it as a standalone
//! node, a replication master, or a replication slave.

// restoretool/src/main.rs
mod cli;
mod config;
mod dbctl;
mod errors;
mod restore;
mod status;
mod transport;

use clap::Parser;
use std::process::ExitCode;

use cli::Cli;
use config::ClusterTopology;
use dbctl::MysqlControl;
use errors::{AppError, Result};
use restore::{RestoreOutcome, RestoreSettings};
use transport::RsyncTransport;

const EXIT_USAGE: u8 = 1;
const EXIT_FATAL: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // clap prints --help output on stdout; real usage errors go to
            // stderr and exit 1.
            let is_usage_error = e.use_stderr();
            let _ = e.print();
            return if is_usage_error {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if cli.version_info {
        println!("restoretool {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    init_logging();

    let Some(mode) = cli.mode.clone() else {
        eprintln!("❌ --mode is required (e.g. --mode master-slave, --mode data-only)");
        return ExitCode::from(EXIT_USAGE);
    };

    match run_app(cli, mode).await {
        Ok(RestoreOutcome::Completed) => {
            println!("✅ Restore completed successfully.");
            ExitCode::SUCCESS
        }
        Ok(RestoreOutcome::DryRun) | Ok(RestoreOutcome::ListedVersions) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ Error: {:#}", anyhow::Error::new(e));
            ExitCode::from(EXIT_FATAL)
        }
    }
}

async fn run_app(cli: Cli, mode: String) -> Result<RestoreOutcome> {
    let topology = ClusterTopology::load_from_json(&cli.config)
        .map_err(|e| AppError::Config(format!("{e:#}")))?;

    let transport = RsyncTransport::new();
    let dbctl = MysqlControl::from_topology(&topology)
        .map_err(|e| AppError::Config(format!("{e:#}")))?;

    let settings = RestoreSettings {
        mode,
        src_dir: cli.src_dir,
        dest_dir: cli.dest_dir,
        version: cli.version,
        dry_run: cli.dry_run,
        skip_mysqld: cli.skip_mysqld,
    };

    restore::run_restore_flow(&settings, &topology, &transport, &dbctl).await
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();
}
