//! The uniform connector contract (spec.md §4.5): `Connect`, `Disconnect`,
//! `HealthCheck`, `Query`, `Execute`, plus the identity accessors `Name`,
//! `Type`, `Version`, `Capabilities`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
#[error("connector error: {connector}.{operation}: {message}")]
pub struct ConnectorError {
    pub connector: String,
    pub operation: String,
    pub message: String,
    pub transient: bool,
}

impl ConnectorError {
    pub fn new(connector: impl Into<String>, operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self { connector: connector.into(), operation: operation.into(), message: message.into(), transient: false }
    }

    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }
}

impl From<ConnectorError> for axonflow_types::AxonError {
    fn from(err: ConnectorError) -> Self {
        axonflow_types::AxonError::ConnectorError {
            connector: err.connector,
            operation: err.operation,
            message: err.message,
            transient: err.transient,
        }
    }
}

pub type ConnectorResult<T> = Result<T, ConnectorError>;

/// Connection pool settings, consumed from `ConnectorConfig.options` with
/// protocol-specific defaults (25/5/5m for SQL per spec.md §4.5).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PoolSettings {
    pub max_open: u32,
    pub max_idle: u32,
    pub conn_max_lifetime: Duration,
}

impl PoolSettings {
    pub const SQL_DEFAULT: Self = Self { max_open: 25, max_idle: 5, conn_max_lifetime: Duration::from_secs(300) };
    pub const WIDE_COLUMN_DEFAULT: Self = Self { max_open: 50, max_idle: 10, conn_max_lifetime: Duration::from_secs(600) };
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorConfig {
    pub id: String,
    pub name: String,
    pub endpoint: String,
    pub timeout_ms: u64,
    #[serde(default)]
    pub options: HashMap<String, serde_json::Value>,
}

impl ConnectorConfig {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            endpoint: endpoint.into(),
            timeout_ms: 30_000,
            options: HashMap::new(),
        }
    }
}

/// A single outbound read (spec.md §4.5: "`Query` returns
/// `{rows, row_count, duration, cached, connector}`").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub statement: String,
    pub params: Vec<serde_json::Value>,
    pub limit: Option<u64>,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub rows: Vec<HashMap<String, serde_json::Value>>,
    pub row_count: usize,
    pub duration: Duration,
    pub cached: bool,
    pub connector: String,
}

/// A write/command (spec.md §4.5: "`Execute` returns
/// `{success, rows_affected, duration, message, connector}`").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    pub statement: String,
    pub params: Vec<serde_json::Value>,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteResult {
    pub success: bool,
    pub rows_affected: u64,
    pub duration: Duration,
    pub message: String,
    pub connector: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub latency: Duration,
    pub details: HashMap<String, String>,
    pub timestamp: DateTime<Utc>,
    pub error: Option<String>,
}

impl HealthStatus {
    pub fn healthy(latency: Duration) -> Self {
        Self { healthy: true, latency, details: HashMap::new(), timestamp: Utc::now(), error: None }
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            healthy: false,
            latency: Duration::ZERO,
            details: HashMap::new(),
            timestamp: Utc::now(),
            error: Some(message.into()),
        }
    }
}

/// Uniform interface implemented by each backend (spec.md §4.5).
#[async_trait]
pub trait Connector: Send + Sync {
    fn name(&self) -> &str;
    fn connector_type(&self) -> &'static str;
    fn version(&self) -> &'static str;
    fn capabilities(&self) -> Vec<&'static str>;

    async fn connect(&self, config: &ConnectorConfig) -> ConnectorResult<()>;
    async fn disconnect(&self) -> ConnectorResult<()>;
    async fn health_check(&self) -> ConnectorResult<HealthStatus>;
    async fn query(&self, query: &Query) -> ConnectorResult<QueryResult>;
    async fn execute(&self, command: &Command) -> ConnectorResult<ExecuteResult>;
}
