//! Execution orchestration for code submissions.
//!
//! [`Orchestra`] drives one submission end to end: the code is staged into
//! the shared directory both the host and every sandbox see, a sandbox is
//! borrowed from the pool, the configured command runs against the staged
//! file inside it, and the raw multiplexed output is decoded into text. For
//! a single request, staging happens before acquisition, acquisition before
//! exec, and cleanup is unconditional; nothing is guaranteed about ordering
//! across concurrent requests.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::Mutex;

use crate::{
    config::{EngineConfig, STAGING_MOUNT_TARGET},
    pool::SandboxPool,
    runtime::ContainerRuntime,
    stream, CoreResult,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Coordinates staging, sandbox acquisition, and execution.
pub struct Orchestra {
    runtime: Arc<dyn ContainerRuntime>,
    pool: SandboxPool,
    config: EngineConfig,
    staging_lock: Mutex<()>,
}

//--------------------------------------------------------------------------------------------------
// Implementations
//--------------------------------------------------------------------------------------------------

impl Orchestra {
    /// Create an orchestrator over an already-provisioned pool.
    pub fn new(runtime: Arc<dyn ContainerRuntime>, pool: SandboxPool, config: EngineConfig) -> Self {
        Self {
            runtime,
            pool,
            config,
            staging_lock: Mutex::new(()),
        }
    }

    /// Run one code submission and return its decoded stdout/stderr.
    ///
    /// The staged file is removed on every exit path, and the sandbox lease
    /// returns its sandbox the same way. Pool exhaustion blocks the caller
    /// unless an acquire timeout is configured.
    pub async fn run(&self, code: &str) -> CoreResult<String> {
        let (path, filename) = self.stage(code).await?;
        let _cleanup = scopeguard::guard(path, |path| {
            if let Err(err) = std::fs::remove_file(&path) {
                tracing::warn!("failed to remove staged file {}: {}", path.display(), err);
            }
        });

        let lease = match self.config.get_acquire_timeout_secs() {
            Some(secs) => self.pool.acquire_timeout(*secs).await?,
            None => self.pool.acquire().await?,
        };

        let mut cmd = self.config.get_run_command().clone();
        cmd.push(format!("{}/{}", STAGING_MOUNT_TARGET, filename));

        let exec_id = self
            .runtime
            .exec_create(lease.sandbox().get_id(), &cmd)
            .await?;
        let raw = self.runtime.exec_attach_and_read(&exec_id).await?;

        Ok(stream::demux(&raw))
    }

    /// Capacity of the underlying sandbox pool.
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Write the submission into the staging directory under a fresh
    /// nanosecond-timestamp name. The lock serializes name generation and
    /// the write; it is released before the caller waits on the pool.
    async fn stage(&self, code: &str) -> CoreResult<(PathBuf, String)> {
        let _guard = self.staging_lock.lock().await;

        let mut nanos = unix_nanos();
        loop {
            let filename = format!("main_{}.{}", nanos, self.config.get_file_extension());
            let path = self.config.get_staging_dir().join(&filename);
            if !tokio::fs::try_exists(&path).await? {
                tokio::fs::write(&path, code).await?;
                return Ok((path, filename));
            }
            nanos += 1;
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

fn unix_nanos() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default()
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
