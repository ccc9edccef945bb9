//! Boundary to the container runtime.
//!
//! The pool and the orchestrator never talk to Docker directly; they go
//! through [`ContainerRuntime`]. The trait covers exactly the three
//! operations the engine needs: creating and starting a sandbox, registering
//! an exec inside it, and reading an exec's raw multiplexed output to
//! end-of-stream. [`DockerRuntime`] is the production implementation;
//! [`MockRuntime`] is the in-tree double used by tests.

mod docker;
mod mock;

use async_trait::async_trait;
use bytes::Bytes;

use crate::CoreResult;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// How a mount source is interpreted by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountKind {
    /// Host directory bind-mounted into the container.
    Bind,

    /// Named volume managed by the runtime.
    Volume,
}

/// One mount attached to a sandbox at creation.
#[derive(Debug, Clone)]
pub struct MountSpec {
    /// Bind source path or volume name.
    pub source: String,

    /// Absolute path inside the container.
    pub target: String,

    /// Bind or volume semantics.
    pub kind: MountKind,
}

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// Control surface of the container runtime the engine runs against.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Create a container from `image` with the given mounts and start it.
    /// Returns the runtime-assigned handle.
    async fn create_and_start(&self, image: &str, mounts: &[MountSpec]) -> CoreResult<String>;

    /// Register a command execution inside a running container. Returns the
    /// exec id.
    async fn exec_create(&self, container_id: &str, cmd: &[String]) -> CoreResult<String>;

    /// Start the exec, attach to its combined stdout/stderr, and read the
    /// raw multiplexed stream to end-of-stream.
    async fn exec_attach_and_read(&self, exec_id: &str) -> CoreResult<Bytes>;
}

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use docker::*;
pub use mock::*;
