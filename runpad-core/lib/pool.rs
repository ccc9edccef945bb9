//! Fixed-capacity pool of pre-warmed sandboxes.
//!
//! The pool is provisioned once at startup: exactly `max_sandboxes`
//! containers are created and started before any traffic is served, and the
//! set never grows or refills afterwards. A sandbox is either idle inside
//! the pool or on loan to exactly one caller through a [`SandboxLease`];
//! dropping the lease returns it. Acquisition blocks until a sandbox is
//! idle, optionally bounded by [`SandboxPool::acquire_timeout`].

use std::time::Duration;

use getset::Getters;
use tokio::sync::{mpsc, Mutex};

use crate::{config::EngineConfig, runtime::ContainerRuntime, CoreError, CoreResult};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// An isolated execution environment owned by the pool.
#[derive(Debug, Getters)]
#[getset(get = "pub with_prefix")]
pub struct Sandbox {
    /// Opaque handle assigned by the container runtime at creation.
    id: String,
}

/// Fixed set of idle sandboxes with blocking hand-off semantics.
pub struct SandboxPool {
    tx: mpsc::Sender<Sandbox>,
    rx: Mutex<mpsc::Receiver<Sandbox>>,
    capacity: usize,
}

/// Scoped loan of one sandbox.
///
/// Dropping the lease returns the sandbox to the pool, on success, failure,
/// and panic unwinding alike. At-most-one concurrent user per sandbox is
/// structural: a sandbox exists either in the pool's channel or inside
/// exactly one live lease.
pub struct SandboxLease {
    sandbox: Option<Sandbox>,
    pool: mpsc::Sender<Sandbox>,
}

//--------------------------------------------------------------------------------------------------
// Implementations
//--------------------------------------------------------------------------------------------------

impl SandboxPool {
    /// Create and start `max_sandboxes` containers via the runtime and park
    /// them in the pool. Any creation failure is returned immediately;
    /// startup treats that as fatal and the pool never retries.
    pub async fn provision(
        runtime: &dyn ContainerRuntime,
        config: &EngineConfig,
    ) -> CoreResult<Self> {
        let capacity = *config.get_max_sandboxes();
        let (tx, rx) = mpsc::channel(capacity);
        let mounts = config.mounts();

        for n in 0..capacity {
            let id = runtime.create_and_start(config.get_image(), &mounts).await?;
            tracing::info!("sandbox {}/{} ready: {}", n + 1, capacity, id);
            if tx.send(Sandbox { id }).await.is_err() {
                return Err(CoreError::PoolClosed);
            }
        }

        Ok(Self {
            tx,
            rx: Mutex::new(rx),
            capacity,
        })
    }

    /// Take a sandbox out of the pool, waiting until one is idle.
    pub async fn acquire(&self) -> CoreResult<SandboxLease> {
        let mut rx = self.rx.lock().await;
        let sandbox = rx.recv().await.ok_or(CoreError::PoolClosed)?;
        Ok(SandboxLease {
            sandbox: Some(sandbox),
            pool: self.tx.clone(),
        })
    }

    /// Like [`acquire`](Self::acquire), but gives up after `secs` seconds
    /// instead of queueing indefinitely.
    pub async fn acquire_timeout(&self, secs: u64) -> CoreResult<SandboxLease> {
        tokio::time::timeout(Duration::from_secs(secs), self.acquire())
            .await
            .map_err(|_| CoreError::AcquireTimeout(secs))?
    }

    /// Number of sandboxes in circulation.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl SandboxLease {
    /// The sandbox on loan.
    pub fn sandbox(&self) -> &Sandbox {
        match &self.sandbox {
            Some(sandbox) => sandbox,
            None => unreachable!("sandbox is present until the lease drops"),
        }
    }
}

impl Drop for SandboxLease {
    fn drop(&mut self) {
        if let Some(sandbox) = self.sandbox.take() {
            // Channel capacity equals the number of sandboxes in
            // circulation, so a returning sandbox always has room.
            if self.pool.try_send(sandbox).is_err() {
                tracing::error!("sandbox pool is gone; dropping returned sandbox");
            }
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use super::*;
    use crate::runtime::MockRuntime;

    fn test_config(max_sandboxes: usize) -> EngineConfig {
        EngineConfig::new(
            "golang:1.22-alpine",
            max_sandboxes,
            PathBuf::from("/tmp/staging"),
            vec!["go".to_string(), "run".to_string()],
            "go",
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn provision_creates_exactly_capacity_sandboxes() {
        let runtime = Arc::new(MockRuntime::with_stdout("ok"));
        let pool = SandboxPool::provision(runtime.as_ref(), &test_config(3))
            .await
            .unwrap();

        assert_eq!(runtime.created(), 3);
        assert_eq!(pool.capacity(), 3);
    }

    #[tokio::test]
    async fn acquire_blocks_at_capacity_until_release() {
        let runtime = MockRuntime::with_stdout("ok");
        let pool = SandboxPool::provision(&runtime, &test_config(1)).await.unwrap();

        let lease = pool.acquire().await.unwrap();
        let held_id = lease.sandbox().get_id().clone();

        // Pool is exhausted; a second caller must wait.
        let blocked = tokio::time::timeout(Duration::from_millis(50), pool.acquire()).await;
        assert!(blocked.is_err());

        drop(lease);

        let lease = tokio::time::timeout(Duration::from_secs(1), pool.acquire())
            .await
            .expect("acquire should complete after release")
            .unwrap();
        assert_eq!(lease.sandbox().get_id(), &held_id);
    }

    #[tokio::test]
    async fn acquire_timeout_expires_when_exhausted() {
        let runtime = MockRuntime::with_stdout("ok");
        let pool = SandboxPool::provision(&runtime, &test_config(1)).await.unwrap();

        let _lease = pool.acquire().await.unwrap();
        let result = pool.acquire_timeout(1).await;
        assert!(matches!(result, Err(CoreError::AcquireTimeout(1))));
    }

    #[tokio::test]
    async fn at_most_capacity_leases_outstanding() {
        let runtime = MockRuntime::with_stdout("ok");
        let pool = Arc::new(SandboxPool::provision(&runtime, &test_config(2)).await.unwrap());

        let first = pool.acquire().await.unwrap();
        let second = pool.acquire().await.unwrap();
        assert_ne!(first.sandbox().get_id(), second.sandbox().get_id());

        let third = tokio::time::timeout(Duration::from_millis(50), pool.acquire()).await;
        assert!(third.is_err());

        drop(first);
        drop(second);

        let _a = pool.acquire().await.unwrap();
        let _b = pool.acquire().await.unwrap();
    }
}
