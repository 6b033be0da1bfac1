//! HTTP surface (spec.md §6). Each handler adapts a JSON request body
//! into the `Gateway`'s pipeline-mode calls and maps the result onto the
//! status codes spec.md §7 describes.

use crate::state::AppState;
use axonflow_gateway::ExecuteResponse;
use axonflow_types::{ClientId, OrgId, Request, RequestId, RequestType, TenantId};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub deployment_mode: &'static str,
    pub connectors_registered: usize,
    pub llm_providers_registered: bool,
    pub policy_cache_hits: u64,
    pub policy_cache_misses: u64,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let stats = state.policy_engine.stats();
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        deployment_mode: if state.deployment.mode.is_enterprise() { "enterprise" } else { "community" },
        connectors_registered: state.connectors.names().len(),
        llm_providers_registered: !state.llm_router.is_empty(),
        policy_cache_hits: stats.cache_hits,
        policy_cache_misses: stats.cache_misses,
    })
}

/// The JSON shape shared by every pipeline-driving endpoint. `request_id`
/// is always assigned by the server, never trusted from the caller.
#[derive(Debug, Deserialize)]
pub struct RequestPayload {
    pub tenant_id: String,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub user_token: String,
    pub client_id: String,
    pub request_type: RequestType,
    pub query: String,
    #[serde(default)]
    pub context: HashMap<String, serde_json::Value>,
}

impl RequestPayload {
    fn into_request(self) -> Request {
        Request {
            request_id: RequestId::new(),
            tenant_id: TenantId::from(self.tenant_id),
            org_id: self.org_id.map(OrgId::from),
            user_token: self.user_token,
            client_id: ClientId::from(self.client_id),
            request_type: self.request_type,
            query: self.query,
            context: self.context,
        }
    }
}

/// Proxy mode (`POST /api/request`) and orchestrator-level processing
/// (`POST /api/v1/process`) run the identical pipeline; the latter is an
/// internal-facing alias spec.md lists separately but doesn't distinguish
/// in behavior.
pub async fn execute_request(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RequestPayload>,
) -> (StatusCode, Json<ExecuteResponse>) {
    let response = state.gateway.execute_query(payload.into_request()).await;
    let status = status_for(&response);
    (status, Json(response))
}

#[derive(Debug, Deserialize)]
pub struct ConnectorQueryPayload {
    pub tenant_id: String,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub user_token: String,
    pub client_id: String,
    pub query: String,
    #[serde(default = "default_operation")]
    pub operation: String,
    #[serde(default)]
    pub context: HashMap<String, serde_json::Value>,
}

fn default_operation() -> String {
    "query".to_string()
}

pub async fn connector_query(
    State(state): State<Arc<AppState>>,
    Path(connector_name): Path<String>,
    Json(payload): Json<ConnectorQueryPayload>,
) -> (StatusCode, Json<ExecuteResponse>) {
    let request = Request {
        request_id: RequestId::new(),
        tenant_id: TenantId::from(payload.tenant_id),
        org_id: payload.org_id.map(OrgId::from),
        user_token: payload.user_token,
        client_id: ClientId::from(payload.client_id),
        request_type: RequestType::McpQuery,
        query: payload.query,
        context: payload.context,
    };
    let response = state.gateway.query_connector(request, &connector_name, &payload.operation).await;
    let status = status_for(&response);
    (status, Json(response))
}

#[derive(Debug, Serialize)]
pub struct PreCheckResponse {
    pub request_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
}

pub async fn policy_pre_check(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RequestPayload>,
) -> (StatusCode, Json<serde_json::Value>) {
    let request = payload.into_request();
    let request_id = request.request_id.to_string();
    match state.gateway.get_policy_approved_context(&request).await {
        Ok(context_id) => {
            let body = PreCheckResponse { request_id, success: true, context_id: Some(context_id) };
            (StatusCode::OK, Json(serde_json::to_value(body).expect("PreCheckResponse always serializes")))
        }
        Err(response) => (status_for(&response), Json(serde_json::to_value(response).expect("ExecuteResponse always serializes"))),
    }
}

#[derive(Debug, Deserialize)]
pub struct AuditRequest {
    pub context_id: String,
    pub provider: String,
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub latency_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct AuditResponse {
    pub success: bool,
    pub expired: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub async fn audit_llm_call(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AuditRequest>,
) -> (StatusCode, Json<AuditResponse>) {
    match state
        .gateway
        .audit_llm_call(&payload.context_id, &payload.provider, &payload.model, payload.prompt_tokens, payload.completion_tokens, payload.latency_ms)
        .await
    {
        Ok(expired) => (StatusCode::OK, Json(AuditResponse { success: true, expired, error: None, message: None })),
        Err(err) => (
            status_for_error_kind(err.kind()),
            Json(AuditResponse { success: false, expired: false, error: Some(err.kind().to_string()), message: Some(err.to_string()) }),
        ),
    }
}

/// Maps `ExecuteResponse` onto a status code per spec.md §7's taxonomy.
/// A policy block is reported as `403` even though `blocked:true` in the
/// body already carries the same signal -- both forms are legal per
/// spec.md §6 and this transport picks the stricter one consistently.
fn status_for(response: &ExecuteResponse) -> StatusCode {
    if response.blocked {
        return StatusCode::FORBIDDEN;
    }
    if response.success {
        return StatusCode::OK;
    }
    match response.error.as_deref() {
        Some("permission_denied") => StatusCode::FORBIDDEN,
        Some("license_invalid") => StatusCode::UNAUTHORIZED,
        Some("validation_error") => StatusCode::BAD_REQUEST,
        Some("connector_error") | Some("provider_unavailable") => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn status_for_error_kind(kind: &str) -> StatusCode {
    match kind {
        "permission_denied" => StatusCode::FORBIDDEN,
        "license_invalid" => StatusCode::UNAUTHORIZED,
        "validation_error" => StatusCode::BAD_REQUEST,
        "connector_error" | "provider_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
