//! AxonFlow-Connectors: the uniform connector capability (spec.md §4.5).

pub mod mock;
pub mod registry;
pub mod sdk;
pub mod sql;
pub mod wide_column;

pub use mock::MockConnector;
pub use registry::ConnectorRegistry;
pub use sdk::{
    Command, Connector, ConnectorConfig, ConnectorError, ConnectorResult, ExecuteResult,
    HealthStatus, PoolSettings, Query, QueryResult,
};
pub use sql::SqlConnector;
pub use wide_column::{Consistency, WideColumnConnector};
