// restoretool/src/dbctl/mysql.rs
use anyhow::{Context, Result};
use sqlx::mysql::MySqlConnection;
use sqlx::{Connection, Executor};
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;
use url::Url;
use which::which;

use super::{ChangeMasterParams, DatabaseControl};
use crate::config::ClusterTopology;

/// Drives the local mysqld: process lifecycle through systemctl, replication
/// configuration through an admin SQL connection.
pub struct MysqlControl {
    service: String,
    admin_url: String,
}

impl MysqlControl {
    /// Builds the controller for the topology's local node.
    pub fn from_topology(topology: &ClusterTopology) -> Result<Self> {
        let local = topology.local();
        let mut url = Url::parse(&format!("mysql://{}:{}/", local.ip, local.mysql_port))
            .with_context(|| {
                format!("Invalid local node address {}:{}", local.ip, local.mysql_port)
            })?;
        url.set_username(&local.admin_user)
            .ok()
            .context("Failed to set admin user on connection URL")?;
        url.set_password(Some(&local.admin_password))
            .ok()
            .context("Failed to set admin password on connection URL")?;

        Ok(MysqlControl {
            service: topology.mysql_service.clone(),
            admin_url: url.to_string(),
        })
    }
}

fn find_systemctl_executable() -> Result<PathBuf> {
    which("systemctl").context("systemctl executable not found in PATH")
}

fn run_systemctl(action: &str, service: &str) -> Result<()> {
    let systemctl_path = find_systemctl_executable()?;
    debug!(action, service, "running systemctl");
    let output = Command::new(systemctl_path)
        .args([action, service])
        .output()
        .with_context(|| format!("Failed to execute systemctl {} {}", action, service))?;
    if !output.status.success() {
        anyhow::bail!(
            "systemctl {} {} failed (status {}).\nStderr: {}",
            action,
            service,
            output.status,
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(())
}

/// Escapes a value for inclusion in a single-quoted SQL string literal.
/// CHANGE MASTER TO does not accept bound placeholders.
fn sql_quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "''")
}

impl DatabaseControl for MysqlControl {
    async fn stop(&self) -> Result<()> {
        println!("🛑 Stopping service '{}'...", self.service);
        run_systemctl("stop", &self.service)
    }

    async fn start(&self) -> Result<()> {
        println!("🚀 Starting service '{}'...", self.service);
        run_systemctl("start", &self.service)
    }

    async fn change_master_to(&self, params: &ChangeMasterParams) -> Result<()> {
        println!(
            "🔗 Configuring replication from {}:{} at {}:{}",
            params.master_host, params.master_port, params.master_log_file, params.master_log_pos
        );
        let mut conn = MySqlConnection::connect(&self.admin_url)
            .await
            .context("Failed to connect to local mysqld with admin credentials")?;

        conn.execute("STOP SLAVE")
            .await
            .context("STOP SLAVE failed")?;

        let change_master_sql = format!(
            "CHANGE MASTER TO MASTER_HOST = '{}', MASTER_PORT = {}, MASTER_USER = '{}', \
             MASTER_PASSWORD = '{}', MASTER_LOG_FILE = '{}', MASTER_LOG_POS = {}",
            sql_quote(&params.master_host),
            params.master_port,
            sql_quote(&params.master_user),
            sql_quote(&params.master_password),
            sql_quote(&params.master_log_file),
            params.master_log_pos,
        );
        conn.execute(change_master_sql.as_str())
            .await
            .context("CHANGE MASTER TO failed")?;

        conn.execute("START SLAVE")
            .await
            .context("START SLAVE failed")?;

        conn.close().await.context("Failed to close admin connection")?;
        println!("✓ Replication configured.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_quote_escapes_literals() {
        assert_eq!(sql_quote("plain"), "plain");
        assert_eq!(sql_quote("o'brien"), "o''brien");
        assert_eq!(sql_quote("back\\slash"), "back\\\\slash");
    }
}
