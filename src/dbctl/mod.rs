// restoretool/src/dbctl/mod.rs
pub(crate) mod mysql;

pub use mysql::MysqlControl;

use anyhow::Result;

/// Parameters for pointing the restored node at its replication master.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeMasterParams {
    pub master_host: String,
    pub master_port: u16,
    pub master_user: String,
    pub master_password: String,
    pub master_log_file: String,
    pub master_log_pos: u64,
}

/// Controls the database process on this node. The restore flow is generic
/// over this trait so tests can substitute a recording implementation.
pub trait DatabaseControl {
    async fn stop(&self) -> Result<()>;

    async fn start(&self) -> Result<()>;

    async fn change_master_to(&self, params: &ChangeMasterParams) -> Result<()>;
}
