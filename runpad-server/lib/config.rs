//! Configuration for the runpad server.
//!
//! The whole configuration lives in one YAML file read once at startup;
//! there is no hot reload. Load or validation failure is fatal to startup.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use getset::Getters;
use runpad_core::config::{EngineConfig, StoreConfig};
use serde::Deserialize;

use crate::error::{ServerError, ServerResult};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Listener settings and the static frontend location.
#[derive(Debug, Clone, Deserialize, Getters)]
#[getset(get = "pub with_prefix")]
pub struct ServerSection {
    /// Address the listener binds to.
    host: IpAddr,

    /// Port the listener binds to.
    port: u16,

    /// Directory of static frontend assets served at the root path.
    frontend_dir: PathBuf,
}

/// Access-control settings for the save endpoint.
#[derive(Debug, Clone, Deserialize, Getters)]
#[getset(get = "pub with_prefix")]
pub struct SecuritySection {
    /// Callers whose address contains one of these entries may save code.
    #[serde(default)]
    allowed_ips: Vec<String>,
}

/// Top-level server configuration.
#[derive(Debug, Clone, Deserialize, Getters)]
#[getset(get = "pub with_prefix")]
pub struct Config {
    /// Listener settings.
    server: ServerSection,

    /// Sandbox pool and execution settings.
    sandbox: EngineConfig,

    /// Snapshot store settings.
    storage: StoreConfig,

    /// Access control for the save endpoint.
    security: SecuritySection,
}

//--------------------------------------------------------------------------------------------------
// Implementations
//--------------------------------------------------------------------------------------------------

impl SecuritySection {
    /// Whether `addr` may use the save endpoint. An address is allowed when
    /// any configured entry occurs within it; an empty list denies everyone.
    pub fn is_allowed(&self, addr: &str) -> bool {
        self.allowed_ips.iter().any(|allowed| addr.contains(allowed))
    }
}

impl Config {
    /// Read and validate the configuration file.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            ServerError::Config(format!("cannot read {}: {}", path.display(), err))
        })?;
        let config: Config = serde_yaml::from_str(&raw).map_err(|err| {
            ServerError::Config(format!("cannot parse {}: {}", path.display(), err))
        })?;

        config.sandbox.validate()?;
        config.storage.validate()?;

        Ok(config)
    }

    /// Socket address the server listens on.
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(*self.server.get_host(), *self.server.get_port())
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"
server:
  host: 127.0.0.1
  port: 8080
  frontend_dir: ./frontend
sandbox:
  image: golang:1.22-alpine
  max_sandboxes: 4
  staging_dir: ./data/staging
  run_command: ["go", "run"]
  file_extension: go
storage:
  persist_dir: ./data/persist
  retention: 20
security:
  allowed_ips:
    - "127.0.0.1"
    - "10.0.0."
"#;

    #[test]
    fn example_config_parses() {
        let config: Config = serde_yaml::from_str(EXAMPLE).unwrap();
        assert_eq!(config.addr().to_string(), "127.0.0.1:8080");
        assert_eq!(*config.get_sandbox().get_max_sandboxes(), 4);
        assert_eq!(*config.get_storage().get_retention(), 20);
        assert!(config.get_sandbox().get_acquire_timeout_secs().is_none());
    }

    #[test]
    fn allowlist_matches_by_substring() {
        let config: Config = serde_yaml::from_str(EXAMPLE).unwrap();
        let security = config.get_security();

        assert!(security.is_allowed("127.0.0.1"));
        assert!(security.is_allowed("10.0.0.17"));
        assert!(!security.is_allowed("192.168.1.5"));
    }

    #[test]
    fn empty_allowlist_denies_everyone() {
        let security = SecuritySection { allowed_ips: vec![] };
        assert!(!security.is_allowed("127.0.0.1"));
    }
}
