//! AxonFlow server: the HTTP transport binary driving the governance
//! gateway. Thin by design (spec.md §2 workspace layout) -- every
//! decision of substance lives in `axonflow-gateway` and the capability
//! crates it orchestrates; this binary only resolves configuration,
//! wires the concrete implementations together, and exposes them over
//! axum, mirroring the gate server's own `main`.

mod middleware;
mod routes;
mod state;

use axonflow_connectors::{ConnectorRegistry, SqlConnector, WideColumnConnector};
use axonflow_gateway::{DeploymentConfig, Gateway, PipelineConfig};
use axonflow_llm::{parse_provider_weights, LLMRouter, MockLLMProvider, RoutingStrategy};
use axonflow_policy::catalog::{SYSTEM_DYNAMIC_POLICIES, SYSTEM_STATIC_POLICIES};
use axonflow_policy::repository::{InMemoryPolicyStore, PolicyRow};
use axonflow_policy::PolicyEngine;
use axonflow_usage::{CommunityUsageRecorder, StoreUsageRecorder, UsageRecorder};
use axum::error_handling::HandleErrorLayer;
use axum::routing::{get, post};
use axum::Router;
use state::AppState;
use std::sync::Arc;
use tower::{BoxError, ServiceBuilder};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry().with(tracing_subscriber::fmt::layer().with_target(true)).init();

    let deployment = DeploymentConfig::from_env();
    let pipeline = PipelineConfig::default();

    let pool = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = axonflow_storage::StoragePool::connect(&url)
                .await
                .expect("DATABASE_URL set but connection failed -- config error, fail loudly at startup");
            pool.ensure_schema().await.expect("failed to ensure policy/usage schema");
            axonflow_storage::seed_system_catalog(&pool).await.expect("failed to seed system policy catalog");
            Some(pool)
        }
        Err(_) => None,
    };

    let policy_engine = Arc::new(build_policy_engine(pool.clone()));
    let connectors = Arc::new(build_connector_registry());
    let llm_router = Arc::new(build_llm_router());
    let usage_recorder = build_usage_recorder(pool, deployment.mode.is_enterprise());

    let gateway = Arc::new(Gateway::new(
        policy_engine.clone(),
        connectors.clone(),
        llm_router.clone(),
        usage_recorder,
        deployment.clone(),
        pipeline,
    ));

    let state = Arc::new(AppState { gateway, policy_engine, connectors: connectors.clone(), llm_router, deployment });

    let app = Router::new()
        .route("/health", get(routes::health))
        .route("/api/policy/pre-check", post(routes::policy_pre_check))
        .route("/api/audit/llm-call", post(routes::audit_llm_call))
        .route("/api/request", post(routes::execute_request))
        .route("/api/v1/process", post(routes::execute_request))
        .route("/api/connectors/{name}/query", post(routes::connector_query))
        .layer(TraceLayer::new_for_http())
        // rate limiting: 100 requests per minute, matching the gate
        // server's own default. BufferLayer makes the rate limiter
        // cloneable across axum's per-request service clones.
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(|err: BoxError| async move {
                    (axum::http::StatusCode::INTERNAL_SERVER_ERROR, format!("unhandled internal error: {err}"))
                }))
                .layer(tower::buffer::BufferLayer::new(1024))
                .layer(tower::limit::RateLimitLayer::new(100, std::time::Duration::from_secs(60))),
        )
        .layer(axum::middleware::from_fn_with_state(state.clone(), middleware::auth_middleware))
        .with_state(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("0.0.0.0:{port}");

    tracing::info!(%addr, "axonflow server starting");

    let listener = tokio::net::TcpListener::bind(&addr).await.expect("failed to bind HTTP listener");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal(connectors)).await.expect("server exited unexpectedly");
}

/// Waits for Ctrl+C (or, on Unix, SIGTERM) and disconnects every
/// connector that was ever connected before letting the process exit
/// (spec.md §5: "`Disconnect` on shutdown closes the pool").
async fn shutdown_signal(connectors: Arc<ConnectorRegistry>) {
    let ctrl_c = async { tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received, disconnecting connectors");
    connectors.disconnect_all().await;
}

/// Builds the policy engine's backing store. With a connected pool, a
/// Postgres-backed `PgPolicyStore` is used (the system catalog has
/// already been seeded into it by the caller); otherwise an in-memory
/// store seeded the same way backs the community default.
fn build_policy_engine(pool: Option<axonflow_storage::StoragePool>) -> PolicyEngine {
    match pool {
        Some(pool) => {
            let store = Arc::new(axonflow_storage::PgPolicyStore::new(pool));
            PolicyEngine::new(store.clone(), store)
        }
        None => {
            let mut store = InMemoryPolicyStore::default();
            store.system.extend(SYSTEM_STATIC_POLICIES.iter().cloned().map(PolicyRow::Static));
            store.system.extend(SYSTEM_DYNAMIC_POLICIES.iter().cloned().map(PolicyRow::Dynamic));
            let store = Arc::new(store);
            PolicyEngine::new(store.clone(), store)
        }
    }
}

/// Registers the two representative connectors named in spec.md §4.5.
/// Both are community-build stubs (no live backend wired in) -- a real
/// deployment swaps in connectors that dial an actual pool, without
/// touching the registry's shape. Each is registered once as a
/// long-lived singleton; the registry connects it on first dispatch.
fn build_connector_registry() -> ConnectorRegistry {
    let registry = ConnectorRegistry::new();
    registry.register("sql", Arc::new(SqlConnector::new("sql")));
    registry.register(
        "wide_column",
        Arc::new(WideColumnConnector::new("wide_column", axonflow_connectors::Consistency::default())),
    );
    registry
}

/// Resolves `LLM_ROUTING_STRATEGY`/`PROVIDER_WEIGHTS`/`DEFAULT_LLM_PROVIDER`
/// (spec.md §6) and registers a stub `LLMProvider` per named provider --
/// the community build ships no live model client, matching the
/// connector layer's own stub policy. `ConfigError`'s "no providers
/// registered" precondition (spec.md §7) is enforced here: the router
/// always gets at least one provider.
fn build_llm_router() -> LLMRouter {
    let provider_names: Vec<String> = match std::env::var("PROVIDER_WEIGHTS") {
        Ok(spec) => parse_provider_weights(&spec).into_iter().map(|(name, _)| name).collect(),
        Err(_) => vec![std::env::var("DEFAULT_LLM_PROVIDER").unwrap_or_else(|_| "community".to_string())],
    };

    let strategy = match std::env::var("LLM_ROUTING_STRATEGY").as_deref() {
        Ok("weighted") => RoutingStrategy::Weighted(
            std::env::var("PROVIDER_WEIGHTS").ok().map(|spec| parse_provider_weights(&spec)).unwrap_or_default(),
        ),
        Ok("failover") => {
            RoutingStrategy::Failover { default: std::env::var("DEFAULT_LLM_PROVIDER").unwrap_or_else(|_| provider_names[0].clone()) }
        }
        _ => RoutingStrategy::RoundRobin,
    };

    let mut router = LLMRouter::new(strategy);
    for name in provider_names {
        router.register(Arc::new(MockLLMProvider::new(name, "community-stub")));
    }
    router
}

/// `DEPLOYMENT_MODE=enterprise` with a connected pool writes real usage
/// rows; everything else discards them (spec.md §2 Non-goals: "the
/// community build ships their stubs").
fn build_usage_recorder(pool: Option<axonflow_storage::StoragePool>, enterprise: bool) -> Arc<dyn UsageRecorder> {
    match (enterprise, pool) {
        (true, Some(pool)) => Arc::new(StoreUsageRecorder::new(axonflow_storage::PgUsageStore::new(pool))),
        _ => Arc::new(CommunityUsageRecorder),
    }
}
