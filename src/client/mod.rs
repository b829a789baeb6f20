//! HTTP collector manager
//!
//! Forwards sync params to a collection service that performs the actual
//! account discovery.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::contracts::*;
use crate::error::CollectorError;
use crate::manager::{AccountCollectorManager, ManagerFactory};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Manager that delegates one sync to a remote collection service
pub struct RemoteCollectorManager {
    base_url: String,
    params: SyncParams,
    client: reqwest::Client,
    timeout: Duration,
}

impl RemoteCollectorManager {
    /// Create new manager for one request
    pub fn new(base_url: impl Into<String>, params: SyncParams) -> Self {
        Self::with_client(base_url, params, reqwest::Client::new())
    }

    /// Create new manager reusing an HTTP client
    pub fn with_client(
        base_url: impl Into<String>,
        params: SyncParams,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            params,
            client,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl AccountCollectorManager for RemoteCollectorManager {
    async fn sync(&self) -> Result<Vec<AccountRecord>, CollectorError> {
        let url = format!("{}/sync", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&self.params)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| CollectorError::Network(e.to_string()))?;

        if response.status().is_success() {
            let body: SyncResultsBody = response
                .json()
                .await
                .map_err(|e| CollectorError::Parse(e.to_string()))?;

            Ok(body.results)
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            Err(CollectorError::Upstream {
                status: status.as_u16(),
                message: error_text,
            })
        }
    }
}

#[derive(Debug, Deserialize)]
struct SyncResultsBody {
    results: Vec<AccountRecord>,
}

/// Builds a [`RemoteCollectorManager`] per sync request
#[derive(Debug, Clone)]
pub struct RemoteManagerFactory {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl RemoteManagerFactory {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl ManagerFactory for RemoteManagerFactory {
    fn name(&self) -> &str {
        "remote"
    }

    fn create(
        &self,
        params: SyncParams,
    ) -> Result<Box<dyn AccountCollectorManager>, CollectorError> {
        Ok(Box::new(
            RemoteCollectorManager::with_client(&self.base_url, params, self.client.clone())
                .with_timeout(self.timeout),
        ))
    }
}
