//! Generic SQL/JDBC-style connector (spec.md §4.5), generalized from the
//! teacher's A2A-message SQL bridge into the `Query`/`Command` shape.

use crate::sdk::{
    Command, Connector, ConnectorConfig, ConnectorError, ConnectorResult, ExecuteResult,
    HealthStatus, PoolSettings, Query, QueryResult,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SqlStatementType {
    Select,
    Insert,
    Update,
    Delete,
    Other,
}

fn detect_statement_type(sql: &str) -> SqlStatementType {
    let upper = sql.trim_start().to_uppercase();
    if upper.starts_with("SELECT") {
        SqlStatementType::Select
    } else if upper.starts_with("INSERT") {
        SqlStatementType::Insert
    } else if upper.starts_with("UPDATE") {
        SqlStatementType::Update
    } else if upper.starts_with("DELETE") {
        SqlStatementType::Delete
    } else {
        SqlStatementType::Other
    }
}

/// Generic relational connector. Free-tier per spec.md §4.5 ("Generic
/// SQL" is the community build's only built-in connector).
pub struct SqlConnector {
    name: String,
    connected: RwLock<bool>,
    pool: PoolSettings,
}

impl SqlConnector {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), connected: RwLock::new(false), pool: PoolSettings::SQL_DEFAULT }
    }

    pub fn pool_settings(&self) -> PoolSettings {
        self.pool
    }

    fn require_connected(&self, operation: &str) -> ConnectorResult<()> {
        if *self.connected.read() {
            Ok(())
        } else {
            Err(ConnectorError::new(&self.name, operation, "connector is not connected"))
        }
    }
}

#[async_trait]
impl Connector for SqlConnector {
    fn name(&self) -> &str {
        &self.name
    }

    fn connector_type(&self) -> &'static str {
        "sql"
    }

    fn version(&self) -> &'static str {
        "1.0.0"
    }

    fn capabilities(&self) -> Vec<&'static str> {
        vec!["query", "execute", "transactions"]
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
        let start = Instant::now();
        if *self.connected.read() {
            Ok(HealthStatus::healthy(start.elapsed()))
        } else {
            Ok(HealthStatus::unhealthy("not connected"))
        }
    }

    async fn query(&self, query: &Query) -> ConnectorResult<QueryResult> {
        self.require_connected("query")?;
        if detect_statement_type(&query.statement) != SqlStatementType::Select {
            return Err(ConnectorError::new(&self.name, "query", "only SELECT statements may be issued via query()"));
        }
        let start = Instant::now();
        // No live backend is wired in the community build; an empty,
        // well-formed result set keeps the contract honest without
        // fabricating data.
        Ok(QueryResult {
            rows: Vec::new(),
            row_count: 0,
            duration: start.elapsed().max(Duration::from_micros(1)),
            cached: false,
            connector: self.name.clone(),
        })
    }

    async fn execute(&self, command: &Command) -> ConnectorResult<ExecuteResult> {
        self.require_connected("execute")?;
        let stmt_type = detect_statement_type(&command.statement);
        if stmt_type == SqlStatementType::Select {
            return Err(ConnectorError::new(&self.name, "execute", "SELECT statements must go through query()"));
        }
        let start = Instant::now();
        Ok(ExecuteResult {
            success: true,
            rows_affected: 0,
            duration: start.elapsed().max(Duration::from_micros(1)),
            message: "ok".to_string(),
            connector: self.name.clone(),
        })
    }
}
