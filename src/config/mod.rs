// restoretool/src/config/mod.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A single cluster member as declared in the topology config.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NodeInfo {
    pub ip: String,
    pub mysql_port: u16,
    pub admin_user: String,
    pub admin_password: String,
    pub repl_user: String,
    pub repl_password: String,
    pub backup_dir: PathBuf,
    pub restore_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CopyMethod {
    #[serde(default)]
    pub incremental: bool,
}

// Raw shape of the JSON config file.
#[derive(Debug, Deserialize)]
struct RawTopologyConfig {
    nodes: Option<HashMap<String, NodeInfo>>,
    #[serde(default)]
    copy_methods: HashMap<String, CopyMethod>,
    local_node: Option<String>,
    mysql_service: Option<String>,
}

const DEFAULT_MYSQL_SERVICE: &str = "mysqld";

/// Cluster node definitions plus the copy-method registry.
/// Loaded once at startup; read-only for the remainder of the run.
#[derive(Debug, Clone)]
pub struct ClusterTopology {
    pub nodes: HashMap<String, NodeInfo>,
    pub copy_methods: HashMap<String, CopyMethod>,
    pub local_node: String,
    pub mysql_service: String,
}

impl ClusterTopology {
    pub fn load_from_json(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;
        let raw: RawTopologyConfig = serde_json::from_str(&config_content).with_context(|| {
            format!(
                "Failed to parse JSON from config file at {}",
                config_path.display()
            )
        })?;

        let nodes = raw.nodes.filter(|n| !n.is_empty()).with_context(|| {
            format!(
                "Config file {} must contain a non-empty 'nodes' section",
                config_path.display()
            )
        })?;

        let local_node = match raw.local_node {
            Some(name) => name,
            None => whoami::fallible::hostname()
                .context("'local_node' not set in config and hostname lookup failed")?,
        };
        if !nodes.contains_key(&local_node) {
            anyhow::bail!(
                "Local node '{}' has no entry in the 'nodes' section of {}",
                local_node,
                config_path.display()
            );
        }

        Ok(ClusterTopology {
            nodes,
            copy_methods: raw.copy_methods,
            local_node,
            mysql_service: raw
                .mysql_service
                .unwrap_or_else(|| DEFAULT_MYSQL_SERVICE.to_string()),
        })
    }

    /// The entry for the node this process runs on. Presence is validated at load.
    pub fn local(&self) -> &NodeInfo {
        &self.nodes[&self.local_node]
    }

    pub fn copy_method(&self, name: &str) -> Option<&CopyMethod> {
        self.copy_methods.get(name)
    }

    /// Reverse lookup: maps a recorded IP address back to a node name.
    pub fn node_by_ip(&self, ip: &str) -> Option<&str> {
        self.nodes
            .iter()
            .find(|(_, info)| info.ip == ip)
            .map(|(name, _)| name.as_str())
    }
}
