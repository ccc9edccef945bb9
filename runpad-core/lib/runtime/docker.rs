//! Docker-backed container runtime.

use async_trait::async_trait;
use bollard::container::{Config as ContainerConfig, CreateContainerOptions, LogOutput};
use bollard::exec::{CreateExecOptions, StartExecResults};
use bollard::service::{HostConfig, Mount, MountTypeEnum};
use bollard::Docker;
use bytes::Bytes;
use futures::StreamExt;

use crate::{
    runtime::{ContainerRuntime, MountKind, MountSpec},
    stream, CoreResult,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Container runtime backed by the local Docker daemon.
pub struct DockerRuntime {
    docker: Docker,
}

//--------------------------------------------------------------------------------------------------
// Implementations
//--------------------------------------------------------------------------------------------------

impl DockerRuntime {
    /// Connect to the local daemon and verify it responds.
    pub async fn connect() -> CoreResult<Self> {
        let docker = Docker::connect_with_local_defaults()?;
        docker.ping().await?;
        Ok(Self { docker })
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn create_and_start(&self, image: &str, mounts: &[MountSpec]) -> CoreResult<String> {
        let mounts = mounts
            .iter()
            .map(|mount| Mount {
                source: Some(mount.source.clone()),
                target: Some(mount.target.clone()),
                typ: Some(match mount.kind {
                    MountKind::Bind => MountTypeEnum::BIND,
                    MountKind::Volume => MountTypeEnum::VOLUME,
                }),
                ..Default::default()
            })
            .collect();

        // Sandboxes idle between execs; keep PID 1 parked.
        let config = ContainerConfig {
            image: Some(image.to_string()),
            cmd: Some(vec![
                "tail".to_string(),
                "-f".to_string(),
                "/dev/null".to_string(),
            ]),
            tty: Some(true),
            host_config: Some(HostConfig {
                mounts: Some(mounts),
                ..Default::default()
            }),
            ..Default::default()
        };

        let created = self
            .docker
            .create_container(None::<CreateContainerOptions<String>>, config)
            .await?;
        self.docker
            .start_container::<String>(&created.id, None)
            .await?;

        Ok(created.id)
    }

    async fn exec_create(&self, container_id: &str, cmd: &[String]) -> CoreResult<String> {
        let exec = self
            .docker
            .create_exec(
                container_id,
                CreateExecOptions {
                    cmd: Some(cmd.to_vec()),
                    attach_stdout: Some(true),
                    attach_stderr: Some(true),
                    ..Default::default()
                },
            )
            .await?;

        Ok(exec.id)
    }

    async fn exec_attach_and_read(&self, exec_id: &str) -> CoreResult<Bytes> {
        let mut raw = Vec::new();

        // bollard parses the daemon's attach stream into typed frames; the
        // trait contract carries the raw wire form.
        if let StartExecResults::Attached {
            output: mut frames, ..
        } = self.docker.start_exec(exec_id, None).await?
        {
            while let Some(chunk) = frames.next().await {
                match chunk? {
                    LogOutput::StdOut { message } => {
                        raw.extend(stream::frame(stream::STDOUT_TAG, &message));
                    }
                    LogOutput::StdErr { message } => {
                        raw.extend(stream::frame(stream::STDERR_TAG, &message));
                    }
                    _ => {}
                }
            }
        }

        Ok(Bytes::from(raw))
    }
}
