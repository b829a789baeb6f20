//! Plugin configuration
//!
//! Settings are read from the environment through an [`EnvAccessor`]; the
//! CLI may override any of them.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::client::{RemoteManagerFactory, DEFAULT_TIMEOUT};
use crate::env::EnvAccessor;
use crate::error::PluginError;
use crate::manager::{ManagerFactory, UnconfiguredFactory};

/// Default listening port
pub const DEFAULT_PORT: u16 = 50051;

/// Default bind address
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Runtime settings of the plugin server
#[derive(Debug, Clone, PartialEq)]
pub struct PluginConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Base URL of the collection service
    pub collector_url: Option<String>,
    /// Timeout for collection requests
    pub collector_timeout: Duration,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            collector_url: None,
            collector_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl PluginConfig {
    /// Load from `HOST`, `PORT`, `COLLECTOR_MANAGER_URL` and
    /// `COLLECTOR_TIMEOUT_SECS`
    pub fn from_env(env: &dyn EnvAccessor) -> Result<Self, PluginError> {
        let mut config = Self::default();

        if let Some(host) = env.non_empty_var("HOST") {
            config.host = host;
        }

        if let Some(port) = env.non_empty_var("PORT") {
            config.port = port
                .parse()
                .map_err(|_| PluginError::invalid_input(format!("PORT is not a valid port: {}", port)))?;
        }

        config.collector_url = env.non_empty_var("COLLECTOR_MANAGER_URL");

        if let Some(secs) = env.non_empty_var("COLLECTOR_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                PluginError::invalid_input(format!(
                    "COLLECTOR_TIMEOUT_SECS is not a number of seconds: {}",
                    secs
                ))
            })?;
            config.collector_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Set collection service URL
    pub fn with_collector_url(mut self, url: impl Into<String>) -> Self {
        self.collector_url = Some(url.into());
        self
    }

    /// Socket address to bind
    pub fn bind_addr(&self) -> Result<SocketAddr, PluginError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| PluginError::invalid_input(format!("Invalid bind address: {}", e)))
    }

    /// Manager factory for the configured collection service
    pub fn manager_factory(&self) -> Arc<dyn ManagerFactory> {
        match &self.collector_url {
            Some(url) => Arc::new(
                RemoteManagerFactory::new(url.clone()).with_timeout(self.collector_timeout),
            ),
            None => Arc::new(UnconfiguredFactory),
        }
    }
}
