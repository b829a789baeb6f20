//! Collector manager seam
//!
//! The account discovery walk is owned by a collector manager. A manager is
//! built from the full `AccountCollector.sync` params and exposes a single
//! argument-free `sync()` that yields account records.

use async_trait::async_trait;
use std::sync::Arc;

use crate::contracts::{AccountRecord, SyncParams};
use crate::error::CollectorError;

/// Produces account records for one sync request
#[async_trait]
pub trait AccountCollectorManager: Send + Sync {
    /// Collect accounts
    async fn sync(&self) -> Result<Vec<AccountRecord>, CollectorError>;
}

/// Builds a manager for each sync request
pub trait ManagerFactory: Send + Sync {
    /// Manager name for logs
    fn name(&self) -> &str;

    /// Construct a manager from the sync params
    fn create(
        &self,
        params: SyncParams,
    ) -> Result<Box<dyn AccountCollectorManager>, CollectorError>;
}

/// Factory backed by a closure
pub struct FnManagerFactory<F> {
    name: String,
    build: F,
}

impl<F> FnManagerFactory<F>
where
    F: Fn(SyncParams) -> Result<Box<dyn AccountCollectorManager>, CollectorError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, build: F) -> Self {
        Self {
            name: name.into(),
            build,
        }
    }
}

impl<F> ManagerFactory for FnManagerFactory<F>
where
    F: Fn(SyncParams) -> Result<Box<dyn AccountCollectorManager>, CollectorError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn create(
        &self,
        params: SyncParams,
    ) -> Result<Box<dyn AccountCollectorManager>, CollectorError> {
        (self.build)(params)
    }
}

/// Manager returning a fixed set of records
#[derive(Debug, Clone, Default)]
pub struct StaticCollectorManager {
    records: Arc<Vec<AccountRecord>>,
}

impl StaticCollectorManager {
    pub fn new(records: Vec<AccountRecord>) -> Self {
        Self {
            records: Arc::new(records),
        }
    }

    /// Factory handing every request the same records
    pub fn factory(records: Vec<AccountRecord>) -> StaticManagerFactory {
        StaticManagerFactory {
            manager: Self::new(records),
        }
    }
}

#[async_trait]
impl AccountCollectorManager for StaticCollectorManager {
    async fn sync(&self) -> Result<Vec<AccountRecord>, CollectorError> {
        Ok(self.records.as_ref().clone())
    }
}

/// Factory for [`StaticCollectorManager`]
#[derive(Debug, Clone)]
pub struct StaticManagerFactory {
    manager: StaticCollectorManager,
}

impl ManagerFactory for StaticManagerFactory {
    fn name(&self) -> &str {
        "static"
    }

    fn create(
        &self,
        _params: SyncParams,
    ) -> Result<Box<dyn AccountCollectorManager>, CollectorError> {
        Ok(Box::new(self.manager.clone()))
    }
}

/// Factory used when no collection service is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredFactory;

impl ManagerFactory for UnconfiguredFactory {
    fn name(&self) -> &str {
        "unconfigured"
    }

    fn create(
        &self,
        _params: SyncParams,
    ) -> Result<Box<dyn AccountCollectorManager>, CollectorError> {
        Err(CollectorError::unavailable(
            "no collector manager configured (set COLLECTOR_MANAGER_URL)",
        ))
    }
}
