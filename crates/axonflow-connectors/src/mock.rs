//! A scriptable connector double used by the gateway pipeline's own
//! tests and by other crates that need a `Connector` without a live
//! backend.

use crate::sdk::{
    Command, Connector, ConnectorConfig, ConnectorError, ConnectorResult, ExecuteResult,
    HealthStatus, Query, QueryResult,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;

pub struct MockConnector {
    name: String,
    connected: RwLock<bool>,
    fail_with: RwLock<Option<String>>,
    rows: Vec<HashMap<String, serde_json::Value>>,
}

impl MockConnector {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), connected: RwLock::new(false), fail_with: RwLock::new(None), rows: Vec::new() }
    }

    pub fn with_rows(mut self, rows: Vec<HashMap<String, serde_json::Value>>) -> Self {
        self.rows = rows;
        self
    }

    pub fn fail_next_with(&self, message: impl Into<String>) {
        *self.fail_with.write() = Some(message.into());
    }
}

#[async_trait]
impl Connector for MockConnector {
    fn name(&self) -> &str {
        &self.name
    }

    fn connector_type(&self) -> &'static str {
        "mock"
    }

    fn version(&self) -> &'static str {
        "0.0.0"
    }

    fn capabilities(&self) -> Vec<&'static str> {
        vec!["query", "execute"]
    }

    async fn connect(&self, _config: &ConnectorConfig) -> ConnectorResult<()> {
        *self.connected.write() = true;
        Ok(())
    }

    async fn disconnect(&self) -> ConnectorResult<()> {
        *self.connected.write() = false;
        Ok(())
    }

    async fn health_check(&self) -> ConnectorResult<HealthStatus> {
        Ok(if *self.connected.read() {
            HealthStatus::healthy(Duration::from_millis(1))
        } else {
            HealthStatus::unhealthy("mock not connected")
        })
    }

    async fn query(&self, _query: &Query) -> ConnectorResult<QueryResult> {
        if let Some(message) = self.fail_with.write().take() {
            return Err(ConnectorError::new(&self.name, "query", message));
        }
        Ok(QueryResult {
            rows: self.rows.clone(),
            row_count: self.rows.len(),
            duration: Duration::from_millis(1),
            cached: false,
            connector: self.name.clone(),
        })
    }

    async fn execute(&self, _command: &Command) -> ConnectorResult<ExecuteResult> {
        if let Some(message) = self.fail_with.write().take() {
            return Err(ConnectorError::new(&self.name, "execute", message));
        }
        Ok(ExecuteResult {
            success: true,
            rows_affected: self.rows.len() as u64,
            duration: Duration::from_millis(1),
            message: "ok".to_string(),
            connector: self.name.clone(),
        })
    }
}
