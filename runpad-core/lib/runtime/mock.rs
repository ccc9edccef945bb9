//! Canned container runtime for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::{
    runtime::{ContainerRuntime, MountSpec},
    stream, CoreResult,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Runtime double that serves canned exec output without a daemon.
///
/// Every exec returns the same raw multiplexed bytes. The double counts
/// created containers, total execs, and the peak number of execs in flight
/// at once, so tests can assert the pool's concurrency discipline.
pub struct MockRuntime {
    output: Bytes,
    exec_delay: Option<Duration>,
    fail_exec: bool,
    created: AtomicUsize,
    execs: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

//--------------------------------------------------------------------------------------------------
// Implementations
//--------------------------------------------------------------------------------------------------

impl MockRuntime {
    /// Runtime returning the given raw multiplexed bytes from every exec.
    pub fn new(output: Bytes) -> Self {
        Self {
            output,
            exec_delay: None,
            fail_exec: false,
            created: AtomicUsize::new(0),
            execs: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Runtime whose every exec emits `stdout` on the primary stream.
    pub fn with_stdout(stdout: &str) -> Self {
        Self::new(Bytes::from(stream::frame(stream::STDOUT_TAG, stdout.as_bytes())))
    }

    /// Runtime whose every exec fails with an I/O error.
    pub fn failing() -> Self {
        let mut mock = Self::new(Bytes::new());
        mock.fail_exec = true;
        mock
    }

    /// Add artificial latency to every exec.
    pub fn with_exec_delay(mut self, delay: Duration) -> Self {
        self.exec_delay = Some(delay);
        self
    }

    /// Number of containers created so far.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Number of execs served so far.
    pub fn execs(&self) -> usize {
        self.execs.load(Ordering::SeqCst)
    }

    /// Highest number of execs observed in flight at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContainerRuntime for MockRuntime {
    async fn create_and_start(&self, _image: &str, _mounts: &[MountSpec]) -> CoreResult<String> {
        let n = self.created.fetch_add(1, Ordering::SeqCst);
        Ok(format!("sandbox-{}", n))
    }

    async fn exec_create(&self, container_id: &str, _cmd: &[String]) -> CoreResult<String> {
        let n = self.execs.fetch_add(1, Ordering::SeqCst);
        Ok(format!("exec-{}-{}", container_id, n))
    }

    async fn exec_attach_and_read(&self, _exec_id: &str) -> CoreResult<Bytes> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.exec_delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_exec {
            return Err(std::io::Error::other("exec failed").into());
        }
        Ok(self.output.clone())
    }
}
