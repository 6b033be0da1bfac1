//! Shared application state handed to every handler via `State`.

use axonflow_connectors::ConnectorRegistry;
use axonflow_gateway::{DeploymentConfig, Gateway};
use axonflow_llm::LLMRouter;
use axonflow_policy::PolicyEngine;
use std::sync::Arc;

/// `AppState` bundles the `Gateway` with the few sub-components the
/// `/health` handler reports on directly -- the gateway itself has no
/// need to expose them, but the transport layer's liveness check does.
/// `deployment` is duplicated here (the gateway holds its own copy) so
/// the auth middleware can read `self_hosted_shortcut_active()` without
/// reaching into the gateway's private fields.
pub struct AppState {
    pub gateway: Arc<Gateway>,
    pub policy_engine: Arc<PolicyEngine>,
    pub connectors: Arc<ConnectorRegistry>,
    pub llm_router: Arc<LLMRouter>,
    pub deployment: DeploymentConfig,
}
