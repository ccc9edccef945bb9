//! Error types for the runpad core.

use std::path::PathBuf;

use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result type used across the runpad core.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors produced by the runpad core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A configuration value failed validation.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The Docker daemon rejected an operation or could not be reached.
    #[error("docker error: {0}")]
    Docker(#[from] bollard::errors::Error),

    /// Filesystem or other I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The sandbox pool's channel closed. Does not happen while the pool
    /// itself is alive.
    #[error("sandbox pool is closed")]
    PoolClosed,

    /// No sandbox became available within the configured window.
    #[error("timed out after {0}s waiting for a free sandbox")]
    AcquireTimeout(u64),

    /// The note identifier is empty or would escape the snapshot root.
    #[error("invalid note id: {0:?}")]
    InvalidNoteId(String),

    /// A file in a note directory carries the snapshot extension but its
    /// name does not parse back into a timestamp.
    #[error("corrupt snapshot entry: {}", .0.display())]
    CorruptSnapshot(PathBuf),
}
