//! Server configuration.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use serde::Deserialize;

use crate::server::error::Error;

/// HTTP server configuration.
///
/// Every field has a default, so a JSON document only needs to name the
/// settings it overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// The address to bind to.
    pub addr: SocketAddr,
    /// The maximum number of concurrent connections.
    pub max_connections: usize,
    /// The read buffer size.
    pub read_buffer_size: usize,
    /// How long a graceful shutdown waits for open connections.
    pub shutdown_timeout_secs: u64,
}

impl ServerConfig {
    /// Load a configuration from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_connections == 0 {
            return Err(Error::ConfigError("max_connections must be at least 1".to_string()));
        }
        if self.read_buffer_size == 0 {
            return Err(Error::ConfigError("read_buffer_size must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            max_connections: 1024,
            read_buffer_size: 8192,
            shutdown_timeout_secs: 30,
        }
    }
}
