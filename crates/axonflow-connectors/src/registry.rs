//! Connector registration (spec.md §9: "A factory returns an object
//! satisfying the capability set. Dynamic dispatch is confined to these
//! two interfaces.") and lifecycle (spec.md §5 "Resource lifecycles":
//! "Connectors: one instance per backend configuration; long-lived;
//! `Disconnect` on shutdown closes the pool.").
//!
//! The registry owns exactly one `Connector` instance per registered
//! name -- never a fresh one per call -- and connects it lazily on
//! first use, under a lock that serializes concurrent first-accesses so
//! `Connect` only ever runs once per connector.

use crate::sdk::{Connector, ConnectorConfig, ConnectorError};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;

#[derive(Default)]
pub struct ConnectorRegistry {
    connectors: RwLock<HashMap<String, Arc<dyn Connector>>>,
    connected: RwLock<HashSet<String>>,
    connect_lock: AsyncMutex<()>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a long-lived connector instance under `name`. The
    /// instance is not connected yet -- `get` connects it on first
    /// access -- so registration itself stays synchronous and can run
    /// from `main()` before the async runtime is driving anything.
    pub fn register(&self, name: impl Into<String>, connector: Arc<dyn Connector>) {
        self.connectors.write().insert(name.into(), connector);
    }

    /// Returns the named connector, connecting it first if this is the
    /// first access since registration (spec.md §5: a connector born
    /// unconnected must not serve a query before `Connect` has run). The
    /// same `Arc` is handed back on every call -- this is never a fresh
    /// instance.
    pub async fn get(&self, name: &str) -> Option<Result<Arc<dyn Connector>, ConnectorError>> {
        let connector = self.connectors.read().get(name).cloned()?;

        if self.connected.read().contains(name) {
            return Some(Ok(connector));
        }

        let _guard = self.connect_lock.lock().await;
        // re-check under the async lock: another task may have
        // connected this same connector while we waited for it.
        if self.connected.read().contains(name) {
            return Some(Ok(connector));
        }

        let config = ConnectorConfig::new(name, name);
        match connector.connect(&config).await {
            Ok(()) => {
                self.connected.write().insert(name.to_string());
                Some(Ok(connector))
            }
            Err(err) => Some(Err(err)),
        }
    }

    /// Disconnects every connector that was ever connected (spec.md §5:
    /// "`Disconnect` on shutdown closes the pool"). Best-effort -- a
    /// disconnect failure is logged, not propagated, since the process
    /// is already on its way down.
    pub async fn disconnect_all(&self) {
        let names: Vec<String> = self.connected.read().iter().cloned().collect();
        for name in names {
            if let Some(connector) = self.connectors.read().get(&name).cloned() {
                if let Err(err) = connector.disconnect().await {
                    tracing::warn!(connector = %name, error = %err, "error disconnecting connector at shutdown");
                }
            }
        }
        self.connected.write().clear();
    }

    pub fn names(&self) -> Vec<String> {
        self.connectors.read().keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::SqlConnector;

    #[tokio::test]
    async fn register_and_get_round_trips() {
        let registry = ConnectorRegistry::new();
        registry.register("sql", Arc::new(SqlConnector::new("sql")));
        assert!(registry.get("sql").await.unwrap().is_ok());
        assert!(registry.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn get_always_returns_the_same_connected_instance() {
        let registry = ConnectorRegistry::new();
        registry.register("sql", Arc::new(SqlConnector::new("sql")));
        let a = registry.get("sql").await.unwrap().unwrap();
        let b = registry.get("sql").await.unwrap().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn get_connects_before_handing_back_the_connector() {
        // the fix for the bug where a freshly `create()`d connector was
        // handed to the dispatch path still unconnected.
        let registry = ConnectorRegistry::new();
        registry.register("sql", Arc::new(SqlConnector::new("sql")));
        let connector = registry.get("sql").await.unwrap().unwrap();
        assert!(connector.health_check().await.unwrap().healthy);
    }

    #[tokio::test]
    async fn disconnect_all_disconnects_every_connected_connector() {
        let registry = ConnectorRegistry::new();
        registry.register("sql", Arc::new(SqlConnector::new("sql")));
        let connector = registry.get("sql").await.unwrap().unwrap();
        assert!(connector.health_check().await.unwrap().healthy);

        registry.disconnect_all().await;
        assert!(!connector.health_check().await.unwrap().healthy);
    }
}
