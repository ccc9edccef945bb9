//! Configuration types for the runpad core.
//!
//! Both structures are read once at startup (deserialized from the server's
//! configuration file or built directly in tests) and passed by reference to
//! the components that need them. There is no hot reload and no ambient
//! global configuration.

use std::path::PathBuf;

use getset::Getters;
use serde::Deserialize;

use crate::{
    runtime::{MountKind, MountSpec},
    CoreError, CoreResult,
};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// In-container path where the shared staging directory is mounted.
pub const STAGING_MOUNT_TARGET: &str = "/code";

/// Name of the persistent volume mounted into every sandbox.
pub const PERSIST_VOLUME: &str = "runpad-persist";

/// In-container path where the persistent volume is mounted.
pub const PERSIST_MOUNT_TARGET: &str = "/persist";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Settings for the sandbox pool and the execution orchestrator.
#[derive(Debug, Clone, Deserialize, Getters)]
#[getset(get = "pub with_prefix")]
pub struct EngineConfig {
    /// Image every sandbox is created from.
    image: String,

    /// Number of sandboxes created at startup; also the execution
    /// concurrency bound.
    max_sandboxes: usize,

    /// Host directory where submissions are staged before execution. Shared
    /// between the host and every sandbox.
    staging_dir: PathBuf,

    /// Command prefix the staged file's in-container path is appended to,
    /// e.g. `["go", "run"]`.
    run_command: Vec<String>,

    /// Extension of staged and persisted code files, without the dot.
    file_extension: String,

    /// Upper bound in seconds on waiting for a free sandbox. `None` blocks
    /// indefinitely, matching pool exhaustion queueing semantics.
    #[serde(default)]
    acquire_timeout_secs: Option<u64>,
}

/// Settings for the versioned snapshot store.
#[derive(Debug, Clone, Deserialize, Getters)]
#[getset(get = "pub with_prefix")]
pub struct StoreConfig {
    /// Root directory holding one subdirectory per note.
    persist_dir: PathBuf,

    /// Number of snapshots kept per note; older ones are pruned after each
    /// save.
    retention: usize,
}

//--------------------------------------------------------------------------------------------------
// Implementations
//--------------------------------------------------------------------------------------------------

impl EngineConfig {
    /// Create a validated engine configuration.
    pub fn new(
        image: impl Into<String>,
        max_sandboxes: usize,
        staging_dir: PathBuf,
        run_command: Vec<String>,
        file_extension: impl Into<String>,
        acquire_timeout_secs: Option<u64>,
    ) -> CoreResult<Self> {
        let config = Self {
            image: image.into(),
            max_sandboxes,
            staging_dir,
            run_command,
            file_extension: file_extension.into(),
            acquire_timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the engine cannot work with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.image.is_empty() {
            return Err(CoreError::Config("sandbox image must not be empty".to_string()));
        }
        if self.max_sandboxes == 0 {
            return Err(CoreError::Config("max_sandboxes must be at least 1".to_string()));
        }
        if self.run_command.is_empty() {
            return Err(CoreError::Config("run_command must not be empty".to_string()));
        }
        if self.file_extension.is_empty() || self.file_extension.contains(['.', '/']) {
            return Err(CoreError::Config(format!(
                "invalid file extension {:?}",
                self.file_extension
            )));
        }
        Ok(())
    }

    /// Mounts every sandbox is created with: the shared staging directory
    /// (read/write bind) and the named persistent volume.
    pub fn mounts(&self) -> Vec<MountSpec> {
        vec![
            MountSpec {
                source: self.staging_dir.display().to_string(),
                target: STAGING_MOUNT_TARGET.to_string(),
                kind: MountKind::Bind,
            },
            MountSpec {
                source: PERSIST_VOLUME.to_string(),
                target: PERSIST_MOUNT_TARGET.to_string(),
                kind: MountKind::Volume,
            },
        ]
    }
}

impl StoreConfig {
    /// Create a validated store configuration.
    pub fn new(persist_dir: PathBuf, retention: usize) -> CoreResult<Self> {
        let config = Self { persist_dir, retention };
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the store cannot work with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.retention == 0 {
            return Err(CoreError::Config("retention must be at least 1".to_string()));
        }
        Ok(())
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
