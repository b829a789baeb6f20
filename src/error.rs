//! Error types for the Account Collector plugin

use thiserror::Error;

/// Failures raised by a collector manager
///
/// The plugin never retries or rewrites these; they reach the transport
/// exactly as the manager produced them.
#[derive(Error, Debug)]
pub enum CollectorError {
    /// Manager is not configured or cannot be constructed
    #[error("Collector unavailable: {0}")]
    Unavailable(String),

    /// Connection to the collection service failed
    #[error("Network error: {0}")]
    Network(String),

    /// Collection service answered with an error status
    #[error("Upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Collection result could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Any other manager failure
    #[error("{0}")]
    Other(String),
}

impl CollectorError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        CollectorError::Unavailable(msg.into())
    }

    pub fn other(msg: impl Into<String>) -> Self {
        CollectorError::Other(msg.into())
    }

    /// Whether the failure came from a remote dependency
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            CollectorError::Unavailable(_)
                | CollectorError::Network(_)
                | CollectorError::Upstream { .. }
        )
    }
}

/// Errors surfaced by the plugin transport
#[derive(Error, Debug)]
pub enum PluginError {
    /// Request parameters could not be decoded
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No handler is routed for the operation name
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    /// Failure from the collector manager, unchanged
    #[error(transparent)]
    Collector(#[from] CollectorError),

    /// Response could not be encoded
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PluginError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        PluginError::InvalidInput(msg.into())
    }

    /// Stable error code for response bodies
    pub fn code(&self) -> &'static str {
        match self {
            PluginError::InvalidInput(_) => "InvalidInput",
            PluginError::UnknownMethod(_) => "UnknownMethod",
            PluginError::Collector(_) => "CollectorError",
            PluginError::Internal(_) => "InternalError",
        }
    }
}

impl From<serde_json::Error> for PluginError {
    fn from(err: serde_json::Error) -> Self {
        PluginError::InvalidInput(err.to_string())
    }
}

/// Result type alias for plugin operations
pub type Result<T> = std::result::Result<T, PluginError>;
