//! Account Collector Plugin
//!
//! Plugin entry points for cloud account discovery on the collector
//! platform:
//!
//! - `AccountCollector.init` returns the JSON-schema of the plugin options,
//!   with previously configured values shown as defaults.
//! - `AccountCollector.sync` hands the request to a collector manager and
//!   returns the account records it discovers.
//!
//! # Design Principles
//! - Stateless: every call builds its output from scratch
//! - Pass-through: collector manager results and failures are not rewritten
//! - Injectable: environment and collector manager are supplied by the caller

pub mod client;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod handler;
pub mod manager;
pub mod telemetry;

// Re-export contracts
#[path = "../contracts/mod.rs"]
pub mod contracts;

pub use contracts::*;
pub use error::{CollectorError, PluginError};
