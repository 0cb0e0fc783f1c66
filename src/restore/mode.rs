//! Restore-mode parsing: the role the backup was taken from paired with the
//! role the restored node should assume.

use crate::errors::AppError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Single,
    Master,
    Slave,
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(Role::Single),
            "master" => Ok(Role::Master),
            "slave" => Ok(Role::Slave),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Single => write!(f, "single"),
            Role::Master => write!(f, "master"),
            Role::Slave => write!(f, "slave"),
        }
    }
}

/// Validated operator-requested restore mode. Derived once from operator
/// input, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreMode {
    /// Restore the data directory only; mysqld is never touched.
    DataOnly,
    Pair { source: Role, dest: Role },
}

impl RestoreMode {
    /// Parses a mode string into one of the six supported combinations.
    /// Pure; anything else fails with `InvalidMode`.
    pub fn parse(s: &str) -> Result<Self, AppError> {
        if s == "data-only" {
            return Ok(RestoreMode::DataOnly);
        }
        let invalid = || AppError::InvalidMode(s.to_string());
        let (source_str, dest_str) = s.split_once('-').ok_or_else(invalid)?;
        let source: Role = source_str.parse().map_err(|_| invalid())?;
        let dest: Role = dest_str.parse().map_err(|_| invalid())?;

        match (source, dest) {
            (Role::Single, Role::Single)
            | (Role::Slave, Role::Single)
            | (Role::Master, Role::Single)
            | (Role::Master, Role::Slave)
            | (Role::Slave, Role::Slave) => Ok(RestoreMode::Pair { source, dest }),
            _ => Err(invalid()),
        }
    }

    pub fn source_role(&self) -> Option<Role> {
        match self {
            RestoreMode::DataOnly => None,
            RestoreMode::Pair { source, .. } => Some(*source),
        }
    }

    pub fn dest_role(&self) -> Option<Role> {
        match self {
            RestoreMode::DataOnly => None,
            RestoreMode::Pair { dest, .. } => Some(*dest),
        }
    }

    /// data-only restores never stop, start, or reconfigure mysqld.
    pub fn skips_mysqld(&self) -> bool {
        matches!(self, RestoreMode::DataOnly)
    }
}

impl fmt::Display for RestoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestoreMode::DataOnly => write!(f, "data-only"),
            RestoreMode::Pair { source, dest } => write!(f, "{}-{}", source, dest),
        }
    }
}
