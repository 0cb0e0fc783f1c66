use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(
        "Invalid restore mode '{0}'. Valid modes: data-only, single-single, slave-single, master-single, master-slave, slave-slave"
    )]
    InvalidMode(String),

    #[error("Unknown copy method '{0}': not registered in the topology's copy_methods section")]
    UnknownCopyMethod(String),

    #[error("Backup was taken with incremental copy method '{0}' but no --version was given")]
    MissingVersion(String),

    #[error("Replication peer '{0}' is not a known cluster node")]
    UnknownPeer(String),

    #[error("No backup status found under {0}")]
    StatusMissing(String),

    #[error("Backup status is missing the {0} section required by this restore mode")]
    IncompleteStatus(&'static str),

    #[error("Step '{step}' failed")]
    Collaborator {
        step: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
