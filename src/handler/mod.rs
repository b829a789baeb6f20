//! Plugin transport for the Account Collector
//!
//! Routes the named plugin operations to [`AccountCollectorService`] and turns
//! failures into error responses.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::contracts::*;
use crate::engine::SchemaBuilder;
use crate::env::{https_proxy, EnvAccessor, ProcessEnv};
use crate::error::{CollectorError, PluginError, Result};
use crate::manager::ManagerFactory;
use crate::telemetry::{Outcome, PluginMetrics, TelemetryError};

/// The two plugin operations
///
/// Holds no per-request state; every call builds its output from scratch.
pub struct AccountCollectorService {
    builder: SchemaBuilder,
    factory: Arc<dyn ManagerFactory>,
    env: Arc<dyn EnvAccessor>,
}

impl AccountCollectorService {
    /// Service reading the process environment
    pub fn new(factory: Arc<dyn ManagerFactory>) -> Self {
        Self::with_env(factory, Arc::new(ProcessEnv))
    }

    /// Service reading an explicit environment
    pub fn with_env(factory: Arc<dyn ManagerFactory>, env: Arc<dyn EnvAccessor>) -> Self {
        Self {
            builder: SchemaBuilder::new(),
            factory,
            env,
        }
    }

    /// Name of the configured manager factory
    pub fn manager_name(&self) -> &str {
        self.factory.name()
    }

    /// `AccountCollector.init`: options schema with configured defaults
    pub fn init(&self, params: &InitParams) -> InitResponse {
        InitResponse {
            metadata: self.builder.build_init_metadata(&params.options),
        }
    }

    /// `AccountCollector.sync`: accounts from the collector manager
    ///
    /// Manager failures are returned unchanged.
    pub async fn sync(&self, params: SyncParams) -> std::result::Result<SyncResponse, CollectorError> {
        if let Some(proxy) = https_proxy(self.env.as_ref()) {
            tracing::debug!(
                proxy = %proxy,
                "Using proxy in environment variable HTTPS_PROXY/https_proxy"
            );
        }

        let manager = self.factory.create(params)?;
        let results = manager.sync().await?;

        Ok(SyncResponse { results })
    }

    /// Route an operation by name
    pub async fn dispatch(&self, method: &str, params: Value) -> Result<Value> {
        match method {
            INIT_METHOD => {
                let params: InitParams = decode_params(params)?;
                serde_json::to_value(self.init(&params))
                    .map_err(|e| PluginError::Internal(e.to_string()))
            }
            SYNC_METHOD => {
                let params: SyncParams = decode_params(params)?;
                let response = self.sync(params).await?;
                serde_json::to_value(response).map_err(|e| PluginError::Internal(e.to_string()))
            }
            other => Err(PluginError::UnknownMethod(other.to_string())),
        }
    }
}

fn decode_params<T: serde::de::DeserializeOwned>(params: Value) -> Result<T> {
    // omitted dispatch params arrive as null
    let params = if params.is_null() {
        Value::Object(Default::default())
    } else {
        params
    };
    Ok(serde_json::from_value(params)?)
}

/// Application state
pub struct AppState {
    pub service: AccountCollectorService,
    pub metrics: PluginMetrics,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(service: AccountCollectorService) -> std::result::Result<Self, TelemetryError> {
        Ok(Self {
            service,
            metrics: PluginMetrics::new()?,
            started_at: Utc::now(),
        })
    }

    async fn run(&self, method: &str, params: Value) -> std::result::Result<Value, ApiFailure> {
        let request_id = Uuid::new_v4();
        let start = Instant::now();

        tracing::info!(request_id = %request_id, method = %method, "Handling plugin request");

        let result = self.service.dispatch(method, params).await;
        let seconds = start.elapsed().as_secs_f64();
        let operation = match method {
            INIT_METHOD | SYNC_METHOD => method,
            _ => "unknown",
        };

        match result {
            Ok(value) => {
                if method == SYNC_METHOD {
                    let count = value["results"].as_array().map(Vec::len).unwrap_or(0);
                    self.metrics.record_accounts(count);
                    tracing::info!(request_id = %request_id, accounts = count, "Sync completed");
                }
                self.metrics.record_request(operation, Outcome::Success, seconds);
                Ok(value)
            }
            Err(error) => {
                self.metrics.record_request(operation, Outcome::Failure, seconds);
                tracing::error!(
                    request_id = %request_id,
                    method = %method,
                    error = %error,
                    "Plugin request failed"
                );
                Err(ApiFailure { error, request_id })
            }
        }
    }
}

/// Create the router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/dispatch", post(dispatch))
        .route("/AccountCollector.init", post(init))
        .route("/AccountCollector.sync", post(sync))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        plugin_id: PLUGIN_ID.to_string(),
        plugin_version: PLUGIN_VERSION.to_string(),
        manager: state.service.manager_name().to_string(),
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
    })
}

/// Prometheus metrics endpoint
async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// `AccountCollector.init`
async fn init(
    State(state): State<Arc<AppState>>,
    Json(params): Json<Value>,
) -> std::result::Result<Json<Value>, ApiFailure> {
    state.run(INIT_METHOD, params).await.map(Json)
}

/// `AccountCollector.sync`
async fn sync(
    State(state): State<Arc<AppState>>,
    Json(params): Json<Value>,
) -> std::result::Result<Json<Value>, ApiFailure> {
    state.run(SYNC_METHOD, params).await.map(Json)
}

/// Operation routed by name
async fn dispatch(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DispatchRequest>,
) -> std::result::Result<Json<Value>, ApiFailure> {
    state.run(&request.method, request.params).await.map(Json)
}

/// Named operation request
#[derive(Debug, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// Health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub plugin_id: String,
    pub plugin_version: String,
    pub manager: String,
    pub uptime_seconds: i64,
}

/// API error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub message: String,
    pub request_id: Option<Uuid>,
}

/// Failed request
#[derive(Debug)]
pub struct ApiFailure {
    pub error: PluginError,
    pub request_id: Uuid,
}

impl ApiFailure {
    /// HTTP status for the error
    pub fn status(&self) -> StatusCode {
        match &self.error {
            PluginError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PluginError::UnknownMethod(_) => StatusCode::NOT_FOUND,
            PluginError::Collector(e) if e.is_upstream() => StatusCode::BAD_GATEWAY,
            PluginError::Collector(_) | PluginError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ApiError {
            error: self.error.code().to_string(),
            message: self.error.to_string(),
            request_id: Some(self.request_id),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{MapEnv, HTTPS_PROXY, HTTPS_PROXY_LOWER};
    use crate::manager::StaticCollectorManager;
    use serde_json::json;
    use std::sync::Mutex;

    /// Environment that records every lookup
    #[derive(Debug, Default)]
    struct RecordingEnv {
        vars: MapEnv,
        lookups: Mutex<Vec<String>>,
    }

    impl RecordingEnv {
        fn lookups(&self) -> Vec<String> {
            self.lookups.lock().unwrap().clone()
        }
    }

    impl EnvAccessor for RecordingEnv {
        fn var(&self, name: &str) -> Option<String> {
            self.lookups.lock().unwrap().push(name.to_string());
            self.vars.var(name)
        }
    }

    fn sync_params() -> SyncParams {
        serde_json::from_value(json!({
            "secret_data": {"project_id": "seed-project"},
            "domain_id": "domain-1"
        }))
        .unwrap()
    }

    fn service() -> AccountCollectorService {
        AccountCollectorService::with_env(
            Arc::new(StaticCollectorManager::factory(vec![])),
            Arc::new(MapEnv::new().with_var("HTTPS_PROXY", "http://proxy:3128")),
        )
    }

    #[tokio::test]
    async fn test_dispatch_init() {
        let value = service()
            .dispatch(INIT_METHOD, json!({"options": {"start_depth": 2}}))
            .await
            .unwrap();

        assert_eq!(
            value["metadata"]["additional_options_schema"]["properties"]["start_depth"]["default"],
            2
        );
    }

    #[tokio::test]
    async fn test_dispatch_init_without_params() {
        let value = service().dispatch(INIT_METHOD, Value::Null).await.unwrap();
        assert_eq!(
            value["metadata"]["additional_options_schema"]["properties"]["trusting_organization"]["default"],
            true
        );
    }

    #[tokio::test]
    async fn test_dispatch_unknown_method() {
        let err = service()
            .dispatch("AccountCollector.verify", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, PluginError::UnknownMethod(_)));
    }

    #[tokio::test]
    async fn test_dispatch_sync_missing_secret() {
        let err = service()
            .dispatch(SYNC_METHOD, json!({"domain_id": "domain-1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, PluginError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_sync_checks_upper_then_lower_proxy_variable() {
        let env = Arc::new(RecordingEnv::default());
        let service = AccountCollectorService::with_env(
            Arc::new(StaticCollectorManager::factory(vec![])),
            env.clone(),
        );

        service.sync(sync_params()).await.unwrap();
        assert_eq!(env.lookups(), vec![HTTPS_PROXY, HTTPS_PROXY_LOWER]);
    }

    #[tokio::test]
    async fn test_sync_stops_at_upper_case_proxy() {
        let env = Arc::new(RecordingEnv {
            vars: MapEnv::new().with_var(HTTPS_PROXY, "http://proxy:3128"),
            ..Default::default()
        });
        let service = AccountCollectorService::with_env(
            Arc::new(StaticCollectorManager::factory(vec![])),
            env.clone(),
        );

        service.sync(sync_params()).await.unwrap();
        assert_eq!(env.lookups(), vec![HTTPS_PROXY]);
    }

    #[tokio::test]
    async fn test_init_does_not_read_environment() {
        let env = Arc::new(RecordingEnv::default());
        let service = AccountCollectorService::with_env(
            Arc::new(StaticCollectorManager::factory(vec![])),
            env.clone(),
        );

        service.init(&InitParams::default());
        assert!(env.lookups().is_empty());
    }

    #[test]
    fn test_failure_status_mapping() {
        let failure = |error: PluginError| ApiFailure {
            error,
            request_id: Uuid::new_v4(),
        };

        assert_eq!(
            failure(PluginError::invalid_input("bad")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            failure(PluginError::UnknownMethod("x".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            failure(CollectorError::Network("refused".into()).into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            failure(CollectorError::other("boom").into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
