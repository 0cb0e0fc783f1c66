//! Determines which cluster node the restored instance must replicate from.

use crate::config::{ClusterTopology, NodeInfo};
use crate::errors::{AppError, Result};
use crate::restore::mode::{RestoreMode, Role};
use crate::status::BackupStatus;

#[derive(Debug, Clone, PartialEq)]
pub enum PeerResolution {
    /// Replication will not be configured; no peer validation performed.
    None,
    Peer { host: String, node: NodeInfo },
}

/// Resolves the replication peer from backup metadata and topology.
///
/// Runs before any destructive step: an unknown peer must abort the run while
/// the node is still untouched.
pub fn resolve_peer(
    mode: RestoreMode,
    status: &BackupStatus,
    topology: &ClusterTopology,
    skip_mysqld: bool,
) -> Result<PeerResolution> {
    // Only a slave destination gets replication wired up; everything else
    // needs no peer, even if the backup metadata names an unknown host.
    if skip_mysqld || mode.dest_role() != Some(Role::Slave) {
        return Ok(PeerResolution::None);
    }

    let host = match mode.source_role() {
        Some(Role::Slave) => {
            // The backup recorded the IP of the origin slave's master; map it
            // back to a node name. Unresolvable values stay as-is and fail the
            // topology check below.
            let recorded = status
                .slave_coordinates
                .as_ref()
                .map(|s| s.master_host.as_str())
                .ok_or(AppError::IncompleteStatus("slave_coordinates"))?;
            topology.node_by_ip(recorded).unwrap_or(recorded).to_string()
        }
        _ => status.origin_host.clone(),
    };

    match topology.nodes.get(&host) {
        Some(node) => Ok(PeerResolution::Peer { host, node: node.clone() }),
        None => Err(AppError::UnknownPeer(host)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::restore::logic::tests::{sample_status, sample_topology};

    fn mode(s: &str) -> RestoreMode {
        RestoreMode::parse(s).expect("valid mode")
    }

    #[test]
    fn test_single_dest_skips_peer_validation() -> anyhow::Result<()> {
        let topology = sample_topology();
        let mut status = sample_status();
        // Unknown origin must not matter when replication is off the table.
        status.origin_host = "ghost-node".to_string();

        for m in ["single-single", "slave-single", "master-single"] {
            assert_eq!(
                resolve_peer(mode(m), &status, &topology, false)?,
                PeerResolution::None,
                "mode {m}"
            );
        }
        assert_eq!(
            resolve_peer(mode("data-only"), &status, &topology, false)?,
            PeerResolution::None
        );
        Ok(())
    }

    #[test]
    fn test_skip_mysqld_skips_peer_validation() -> anyhow::Result<()> {
        let topology = sample_topology();
        let mut status = sample_status();
        status.origin_host = "ghost-node".to_string();
        assert_eq!(
            resolve_peer(mode("master-slave"), &status, &topology, true)?,
            PeerResolution::None
        );
        Ok(())
    }

    #[test]
    fn test_master_source_uses_origin_host() -> anyhow::Result<()> {
        let topology = sample_topology();
        let status = sample_status(); // origin_host = node2
        match resolve_peer(mode("master-slave"), &status, &topology, false)? {
            PeerResolution::Peer { host, node } => {
                assert_eq!(host, "node2");
                assert_eq!(node.ip, "10.0.0.2");
            }
            other => panic!("expected peer, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_slave_source_reverse_looks_up_master_ip() -> anyhow::Result<()> {
        let topology = sample_topology();
        let status = sample_status(); // slave_coordinates.master_host = 10.0.0.3 = node3
        match resolve_peer(mode("slave-slave"), &status, &topology, false)? {
            PeerResolution::Peer { host, .. } => assert_eq!(host, "node3"),
            other => panic!("expected peer, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_unknown_peer_is_fatal() {
        let topology = sample_topology();
        let mut status = sample_status();
        status.origin_host = "ghost-node".to_string();
        match resolve_peer(mode("master-slave"), &status, &topology, false) {
            Err(AppError::UnknownPeer(host)) => assert_eq!(host, "ghost-node"),
            other => panic!("expected UnknownPeer, got {other:?}"),
        }
    }

    #[test]
    fn test_unresolvable_master_ip_is_unknown_peer() {
        let topology = sample_topology();
        let mut status = sample_status();
        status.slave_coordinates.as_mut().unwrap().master_host = "192.168.99.99".to_string();
        match resolve_peer(mode("slave-slave"), &status, &topology, false) {
            Err(AppError::UnknownPeer(host)) => assert_eq!(host, "192.168.99.99"),
            other => panic!("expected UnknownPeer, got {other:?}"),
        }
    }

    #[test]
    fn test_slave_source_without_slave_coordinates() {
        let topology = sample_topology();
        let mut status = sample_status();
        status.slave_coordinates = None;
        assert!(matches!(
            resolve_peer(mode("slave-slave"), &status, &topology, false),
            Err(AppError::IncompleteStatus("slave_coordinates"))
        ));
    }
}
