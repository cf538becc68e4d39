//! Runtime errors.

use std::path::PathBuf;

/// Errors surfaced by the shard runtime layer. The combat core itself never
/// fails a tick; everything here comes from configuration, data files, or
/// task plumbing around it.
#[derive(Debug, thiserror::Error)]
pub enum ShardError {
    #[error("failed to read data file {path}")]
    DataIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse data file {path}")]
    DataParse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("shard driver task join failed")]
    DriverJoin(#[source] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, ShardError>;
