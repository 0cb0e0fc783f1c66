//! Picks the replication coordinates to seed, keyed on (source role, dest role).
//!
//! Picking the wrong pair silently corrupts replication, so unsupported
//! combinations skip replication wiring instead of guessing.

use crate::errors::{AppError, Result};
use crate::restore::mode::{RestoreMode, Role};
use crate::status::BackupStatus;

#[derive(Debug, Clone, PartialEq)]
pub enum CoordinateSelection {
    /// Replication will not be configured.
    Skip,
    Coordinates { file: String, position: u64 },
}

/// Decision table:
/// master→slave takes the origin's own binlog position; slave→slave takes the
/// position the origin slave had executed of *its* master's log. Any
/// destination other than slave needs no coordinates. A combination outside
/// the table skips with a warning (deliberate leniency, kept from the
/// operational tool this replaces).
pub fn select_coordinates(mode: RestoreMode, status: &BackupStatus) -> Result<CoordinateSelection> {
    let (Some(source), Some(dest)) = (mode.source_role(), mode.dest_role()) else {
        return Ok(CoordinateSelection::Skip); // data-only
    };
    if dest != Role::Slave {
        return Ok(CoordinateSelection::Skip);
    }

    match source {
        Role::Master => {
            let coords = status
                .master_coordinates
                .as_ref()
                .ok_or(AppError::IncompleteStatus("master_coordinates"))?;
            Ok(CoordinateSelection::Coordinates {
                file: coords.file.clone(),
                position: coords.position,
            })
        }
        Role::Slave => {
            let coords = status
                .slave_coordinates
                .as_ref()
                .ok_or(AppError::IncompleteStatus("slave_coordinates"))?;
            Ok(CoordinateSelection::Coordinates {
                file: coords.relay_master_log_file.clone(),
                position: coords.exec_master_log_pos,
            })
        }
        Role::Single => {
            eprintln!(
                "⚠️ Replication setup for mode '{}' is unsupported; skipping replication wiring.",
                mode
            );
            Ok(CoordinateSelection::Skip)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::restore::logic::tests::sample_status;

    fn mode(s: &str) -> RestoreMode {
        RestoreMode::parse(s).expect("valid mode")
    }

    #[test]
    fn test_master_slave_takes_master_coordinates() -> anyhow::Result<()> {
        let status = sample_status();
        assert_eq!(
            select_coordinates(mode("master-slave"), &status)?,
            CoordinateSelection::Coordinates {
                file: "bin.000005".to_string(),
                position: 107
            }
        );
        Ok(())
    }

    #[test]
    fn test_slave_slave_takes_slave_coordinates() -> anyhow::Result<()> {
        let status = sample_status();
        assert_eq!(
            select_coordinates(mode("slave-slave"), &status)?,
            CoordinateSelection::Coordinates {
                file: "master-bin.000012".to_string(),
                position: 4242
            }
        );
        Ok(())
    }

    #[test]
    fn test_every_other_mode_skips() -> anyhow::Result<()> {
        let status = sample_status();
        for m in ["data-only", "single-single", "slave-single", "master-single"] {
            assert_eq!(
                select_coordinates(mode(m), &status)?,
                CoordinateSelection::Skip,
                "mode {m}"
            );
        }
        Ok(())
    }

    #[test]
    fn test_single_source_to_slave_warns_and_skips() -> anyhow::Result<()> {
        // Not reachable through RestoreMode::parse, but the table must not
        // guess if the mode set ever widens.
        let status = sample_status();
        let mode = RestoreMode::Pair { source: Role::Single, dest: Role::Slave };
        assert_eq!(select_coordinates(mode, &status)?, CoordinateSelection::Skip);
        Ok(())
    }

    #[test]
    fn test_missing_coordinate_block_is_fatal() {
        let mut status = sample_status();
        status.master_coordinates = None;
        assert!(matches!(
            select_coordinates(mode("master-slave"), &status),
            Err(AppError::IncompleteStatus("master_coordinates"))
        ));

        let mut status = sample_status();
        status.slave_coordinates = None;
        assert!(matches!(
            select_coordinates(mode("slave-slave"), &status),
            Err(AppError::IncompleteStatus("slave_coordinates"))
        ));
    }
}
