//! The request pipeline (spec.md §4.3): authenticate, pre-check,
//! dispatch, post-check, audit, respond. This module is the only place
//! in the workspace permitted to reach across the policy, license,
//! connector, LLM and usage crates in one call (spec.md §2: "the
//! pipeline is the only component permitted to orchestrate across the
//! other layers").

use crate::config::{DeploymentConfig, PipelineConfig};
use crate::context::{query_fingerprint, ContextStore};
use crate::sql_extract::extract_sql_block;
use axonflow_connectors::{Command, ConnectorRegistry, Query};
use axonflow_license::{evaluate_mcp_permission, validate_license, ValidationResult};
use axonflow_llm::LLMRouter;
use axonflow_policy::{model::Category, PolicyEngine, PolicyMatch};
use axonflow_types::{AxonError, ClientId, OrgId, Request, RequestType, TenantId};
use axonflow_usage::{calculate_cost, ApiCall, InstanceType, LlmRequest, UsageRecorder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// `policy_info.code_artifact` (spec.md §4.3 step 4, §9 Open Question:
/// exact MIME/format headings aren't specified -- this carries the
/// pattern-match counts the spec says are the current behavior).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeArtifactInfo {
    pub secrets_matches: u32,
    pub unsafe_matches: u32,
}

/// `policy_info` (spec.md §4.3 step 6). `processing_time_ms` resolves
/// the §9 Open Question as numeric milliseconds rather than a duration
/// string -- simpler for a JSON consumer and avoids locale-dependent
/// formatting (recorded in DESIGN.md).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyInfo {
    pub policies_evaluated: usize,
    pub processing_time_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_artifact: Option<CodeArtifactInfo>,
}

/// The unified pipeline response (spec.md §4.3 step 6 / §7 "user-visible
/// failure behavior").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteResponse {
    pub request_id: String,
    pub success: bool,
    pub blocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocking_policy_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_info: Option<PolicyInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ExecuteResponse {
    fn failure(request_id: &str, err: &AxonError) -> Self {
        Self {
            request_id: request_id.to_string(),
            success: false,
            blocked: matches!(err, AxonError::PolicyBlock { .. }),
            block_reason: None,
            blocking_policy_name: None,
            data: None,
            policy_info: None,
            error: Some(err.kind().to_string()),
            message: Some(err.to_string()),
        }
    }
}

/// The process-wide orchestrator (spec.md §5 "Resource lifecycles":
/// created at startup, torn down at shutdown).
pub struct Gateway {
    policy_engine: Arc<PolicyEngine>,
    connectors: Arc<ConnectorRegistry>,
    llm_router: Arc<LLMRouter>,
    usage_recorder: Arc<dyn UsageRecorder>,
    deployment: DeploymentConfig,
    pipeline: PipelineConfig,
    contexts: ContextStore,
}

impl Gateway {
    pub fn new(
        policy_engine: Arc<PolicyEngine>,
        connectors: Arc<ConnectorRegistry>,
        llm_router: Arc<LLMRouter>,
        usage_recorder: Arc<dyn UsageRecorder>,
        deployment: DeploymentConfig,
        pipeline: PipelineConfig,
    ) -> Self {
        Self { policy_engine, connectors, llm_router, usage_recorder, deployment, pipeline, contexts: ContextStore::new() }
    }

    pub fn contexts(&self) -> &ContextStore {
        &self.contexts
    }

    /// Pipeline step 1. In self-hosted dev mode (non-production, with
    /// the exact acknowledgment string) an admin identity is
    /// synthesized instead of validating `user_token` (spec.md §4.3
    /// step 1, §9 "self-hosted dev shortcut").
    pub fn authenticate(&self, request: &Request) -> Result<ValidationResult, AxonError> {
        if self.deployment.self_hosted_shortcut_active() {
            tracing::warn!(tenant = %request.tenant_id, "self-hosted dev shortcut active, synthesizing admin identity");
            return Ok(synthesized_admin_identity(&request.tenant_id));
        }
        validate_license(&request.user_token, self.deployment.mode)
    }

    /// Proxy mode (spec.md §4.3): `ExecuteQuery(user_token, query,
    /// request_type, context) -> Response`. Runs pre-check, dispatch,
    /// post-check and audit internally.
    pub async fn execute_query(&self, request: Request) -> ExecuteResponse {
        let request_id = request.request_id.to_string();

        let validation = match self.authenticate(&request) {
            Ok(v) => v,
            Err(err) => return ExecuteResponse::failure(&request_id, &err),
        };

        self.run_pipeline(request, validation).await
    }

    /// Connector mode (spec.md §4.3): `QueryConnector(user_token,
    /// connector_name, query, params) -> Response`.
    pub async fn query_connector(
        &self,
        mut request: Request,
        connector_name: &str,
        operation: &str,
    ) -> ExecuteResponse {
        request.context.insert("connector".to_string(), serde_json::json!(connector_name));
        request.context.insert("operation".to_string(), serde_json::json!(operation));
        request.request_type = RequestType::McpQuery;
        self.execute_query(request).await
    }

    /// Gateway mode step 1: `GetPolicyApprovedContext`. Pre-checks the
    /// query and, if not blocked, issues a `context_id` binding the
    /// pre-check to a later `AuditLLMCall` (spec.md §4.3).
    pub async fn get_policy_approved_context(&self, request: &Request) -> Result<String, ExecuteResponse> {
        let validation = self
            .authenticate(request)
            .map_err(|err| ExecuteResponse::failure(&request.request_id.to_string(), &err))?;
        let _ = validation;

        let evaluation = self
            .policy_engine
            .evaluate_all(&request.tenant_id, request.org_id.as_ref(), &request.query, request.request_type.as_str(), &request.context)
            .await
            .map_err(|err| {
                ExecuteResponse::failure(
                    &request.request_id.to_string(),
                    &AxonError::ConfigError { message: err.to_string() },
                )
            })?;

        if evaluation.should_block {
            let (reason, policy_name) = block_reason(&evaluation.matches);
            self.audit_api_call(&request.tenant_id, None, &request.client_id, "POST", "/api/policy/pre-check", 403, false).await;
            return Err(ExecuteResponse {
                request_id: request.request_id.to_string(),
                success: false,
                blocked: true,
                block_reason: Some(reason),
                blocking_policy_name: Some(policy_name),
                data: None,
                policy_info: Some(PolicyInfo {
                    policies_evaluated: evaluation.matches.len(),
                    processing_time_ms: evaluation.evaluation_time_ms,
                    code_artifact: None,
                }),
                error: None,
                message: None,
            });
        }

        Ok(self.contexts.issue(request.tenant_id.clone(), request.client_id.clone(), &request.query, self.pipeline.context_ttl))
    }

    /// Gateway mode step 3: `AuditLLMCall`. Accepts an expired context
    /// (flagged, not dropped) per spec.md §4.3.
    pub async fn audit_llm_call(
        &self,
        context_id: &str,
        provider: &str,
        model: &str,
        prompt_tokens: u32,
        completion_tokens: u32,
        latency_ms: u64,
    ) -> Result<bool, AxonError> {
        let verified = self.contexts.verify(context_id).ok_or_else(|| AxonError::ValidationError {
            message: "unknown or already-consumed context_id".to_string(),
        })?;
        self.contexts.consume(context_id);

        if verified.expired {
            tracing::warn!(context_id, "audit accepted for an expired context");
        }

        let cost_cents = calculate_cost(provider, model, prompt_tokens, completion_tokens);
        self.usage_recorder
            .record_llm_request(LlmRequest {
                id: uuid::Uuid::new_v4(),
                org_id: verified.context.tenant_id.to_string(),
                client_id: Some(verified.context.client_id.to_string()),
                instance_id: verified.context.client_id.to_string(),
                instance_type: InstanceType::Agent,
                provider: provider.to_string(),
                model: model.to_string(),
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
                cost_cents,
                latency_ms,
                http_status: 200,
                access_granted: true,
                created_at: chrono::Utc::now(),
            })
            .await;

        Ok(verified.expired)
    }

    async fn run_pipeline(&self, request: Request, validation: ValidationResult) -> ExecuteResponse {
        let request_id = request.request_id.to_string();
        let start = std::time::Instant::now();

        let evaluation = match self
            .policy_engine
            .evaluate_all(&request.tenant_id, request.org_id.as_ref(), &request.query, request.request_type.as_str(), &request.context)
            .await
        {
            Ok(eval) => eval,
            Err(err) => return ExecuteResponse::failure(&request_id, &AxonError::ConfigError { message: err.to_string() }),
        };

        if evaluation.should_block {
            let (reason, policy_name) = block_reason(&evaluation.matches);
            self.audit_api_call(&request.tenant_id, request.org_id.as_ref(), &request.client_id, "POST", "/api/request", 403, false).await;
            return ExecuteResponse {
                request_id,
                success: false,
                blocked: true,
                block_reason: Some(reason),
                blocking_policy_name: Some(policy_name),
                data: None,
                policy_info: Some(PolicyInfo {
                    policies_evaluated: evaluation.matches.len(),
                    processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
                    code_artifact: None,
                }),
                error: None,
                message: None,
            };
        }

        let dispatch_result = self.dispatch(&request, &validation).await;

        let mut policies_evaluated = evaluation.matches.len();
        let mut code_artifact = None;

        let (data, audit_record_sent, http_status) = match dispatch_result {
            Ok(DispatchOutcome::Chat(response)) => {
                let post = self
                    .policy_engine
                    .evaluate_all(&request.tenant_id, request.org_id.as_ref(), &response.text, "chat", &request.context)
                    .await
                    .ok();
                if let Some(post) = &post {
                    policies_evaluated += post.matches.len();
                    code_artifact = Some(count_code_artifact(&post.matches));
                }

                let cost_cents = calculate_cost(&response.provider, &response.model, response.tokens_prompt, response.tokens_completion);
                self.usage_recorder
                    .record_llm_request(LlmRequest {
                        id: uuid::Uuid::new_v4(),
                        org_id: request.org_id.as_ref().map(|o| o.to_string()).unwrap_or_else(|| request.tenant_id.to_string()),
                        client_id: Some(request.client_id.to_string()),
                        instance_id: request.client_id.to_string(),
                        instance_type: InstanceType::Agent,
                        provider: response.provider.clone(),
                        model: response.model.clone(),
                        prompt_tokens: response.tokens_prompt,
                        completion_tokens: response.tokens_completion,
                        total_tokens: response.tokens_prompt + response.tokens_completion,
                        cost_cents,
                        latency_ms: response.latency_ms,
                        http_status: 200,
                        access_granted: true,
                        created_at: chrono::Utc::now(),
                    })
                    .await;

                (Some(serde_json::json!({ "text": response.text })), true, 200u16)
            }
            Ok(DispatchOutcome::Connector(result)) => (Some(result), false, 200),
            Err(err) => {
                self.audit_api_call(&request.tenant_id, request.org_id.as_ref(), &request.client_id, "POST", "/api/request", 503, false).await;
                return ExecuteResponse::failure(&request_id, &err);
            }
        };

        if !audit_record_sent {
            self.audit_api_call(&request.tenant_id, request.org_id.as_ref(), &request.client_id, "POST", "/api/request", http_status, true).await;
        }

        ExecuteResponse {
            request_id,
            success: true,
            blocked: false,
            block_reason: None,
            blocking_policy_name: None,
            data,
            policy_info: Some(PolicyInfo {
                policies_evaluated,
                processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
                code_artifact,
            }),
            error: None,
            message: None,
        }
    }

    async fn dispatch(&self, request: &Request, validation: &ValidationResult) -> Result<DispatchOutcome, AxonError> {
        match request.request_type {
            RequestType::Chat => {
                let response = self
                    .llm_router
                    .execute(&request.request_id.to_string(), &request.query, &request.context)
                    .await?;
                Ok(DispatchOutcome::Chat(response))
            }
            RequestType::NaturalLanguage => {
                let sql_prompt = format!(
                    "Translate the following request into a single read-only SQL SELECT statement. \
                     Respond with only the SQL statement.\n\nRequest: {}",
                    request.query
                );
                let response = self.llm_router.execute(&request.request_id.to_string(), &sql_prompt, &request.context).await?;
                let sql = extract_sql_block(&response.text).ok_or_else(|| AxonError::ValidationError {
                    message: "LLM response did not contain a recognizable SQL statement".to_string(),
                })?;
                let mut reentered = request.clone();
                reentered.request_type = RequestType::Sql;
                reentered.query = sql;
                Box::pin(self.dispatch(&reentered, validation)).await
            }
            RequestType::Sql | RequestType::McpQuery => self.dispatch_connector(request, validation).await,
        }
    }

    async fn dispatch_connector(&self, request: &Request, validation: &ValidationResult) -> Result<DispatchOutcome, AxonError> {
        let connector_name = request.context.get("connector").and_then(|v| v.as_str()).unwrap_or("sql");
        let operation = request.context.get("operation").and_then(|v| v.as_str()).unwrap_or("query");

        if let Err(message) = evaluate_mcp_permission(Some(validation), connector_name, operation) {
            tracing::info!(connector = connector_name, operation, reason = %message, "connector permission denied");
            return Err(AxonError::PermissionDenied {
                required_permission: format!("mcp:{connector_name}:{operation}"),
                current_grants: validation.permissions.clone(),
            });
        }

        let connector = match self.connectors.get(connector_name).await {
            None => {
                return Err(AxonError::ConnectorError {
                    connector: connector_name.to_string(),
                    operation: operation.to_string(),
                    message: "no connector registered under this name".to_string(),
                    transient: false,
                });
            }
            Some(Err(err)) => return Err(err.into()),
            Some(Ok(connector)) => connector,
        };

        let params: Vec<serde_json::Value> = request
            .context
            .get("params")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        if operation == "execute" {
            let command = Command { statement: request.query.clone(), params, timeout: Some(self.pipeline.connector_timeout) };
            let result = self.retrying_execute(connector.as_ref(), &command).await?;
            Ok(DispatchOutcome::Connector(serde_json::to_value(result).expect("ExecuteResult always serializes")))
        } else {
            let query = Query { statement: request.query.clone(), params, limit: None, timeout: Some(self.pipeline.connector_timeout) };
            let result = self.retrying_query(connector.as_ref(), &query).await?;
            Ok(DispatchOutcome::Connector(serde_json::to_value(result).expect("QueryResult always serializes")))
        }
    }

    /// Retries a transient connector failure up to `MaxRetries` times
    /// with exponential backoff (spec.md §7).
    async fn retrying_query(
        &self,
        connector: &dyn axonflow_connectors::Connector,
        query: &Query,
    ) -> Result<axonflow_connectors::QueryResult, AxonError> {
        let mut attempt = 0;
        loop {
            match connector.query(query).await {
                Ok(result) => return Ok(result),
                Err(err) if err.transient && attempt < self.pipeline.max_retries => {
                    attempt += 1;
                    let backoff = std::time::Duration::from_millis(50 * 2u64.pow(attempt));
                    tracing::warn!(attempt, connector = connector.name(), "transient connector error, retrying");
                    tokio::time::sleep(backoff).await;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    async fn retrying_execute(
        &self,
        connector: &dyn axonflow_connectors::Connector,
        command: &Command,
    ) -> Result<axonflow_connectors::ExecuteResult, AxonError> {
        let mut attempt = 0;
        loop {
            match connector.execute(command).await {
                Ok(result) => return Ok(result),
                Err(err) if err.transient && attempt < self.pipeline.max_retries => {
                    attempt += 1;
                    let backoff = std::time::Duration::from_millis(50 * 2u64.pow(attempt));
                    tracing::warn!(attempt, connector = connector.name(), "transient connector error, retrying");
                    tokio::time::sleep(backoff).await;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    async fn audit_api_call(
        &self,
        tenant_id: &TenantId,
        org_id: Option<&OrgId>,
        client_id: &ClientId,
        method: &str,
        path: &str,
        status: u16,
        granted: bool,
    ) {
        self.usage_recorder
            .record_api_call(ApiCall {
                id: uuid::Uuid::new_v4(),
                org_id: org_id.map(|o| o.to_string()).unwrap_or_else(|| tenant_id.to_string()),
                client_id: Some(client_id.to_string()),
                instance_id: client_id.to_string(),
                instance_type: InstanceType::Agent,
                http_method: method.to_string(),
                http_path: path.to_string(),
                http_status: status,
                latency_ms: 0,
                access_granted: granted,
                created_at: chrono::Utc::now(),
            })
            .await;
    }
}

enum DispatchOutcome {
    Chat(axonflow_llm::CompletionResponse),
    Connector(serde_json::Value),
}

/// An admin identity with unrestricted connector access, synthesized
/// only when the self-hosted dev shortcut is active.
fn synthesized_admin_identity(tenant_id: &TenantId) -> ValidationResult {
    let mut features = HashMap::new();
    features.insert("unlimited_nodes".to_string(), true);
    features.insert("node_enforcement".to_string(), false);
    ValidationResult {
        valid: true,
        tier: axonflow_license::Tier::Community,
        tenant_id: tenant_id.to_string(),
        expires_at: chrono::NaiveDate::from_ymd_opt(2999, 12, 31).expect("valid constant date"),
        features,
        service_name: Some("self-hosted-dev".to_string()),
        service_type: Some("dev".to_string()),
        permissions: vec!["*".to_string()],
    }
}

/// The highest-severity match's name/reason, for `Blocked{reason,
/// blocking_policy_name}` (spec.md §4.3 step 2). Ties on severity keep
/// the first match in evaluation order (highest priority within tier).
fn block_reason(matches: &[PolicyMatch]) -> (String, String) {
    let highest = matches.iter().max_by_key(|m| m.severity).expect("should_block implies at least one match");
    let picked = matches.iter().find(|m| m.severity == highest.severity).unwrap_or(highest);
    (format!("blocked by policy: {}", picked.name), picked.name.clone())
}

fn count_code_artifact(matches: &[PolicyMatch]) -> CodeArtifactInfo {
    let mut info = CodeArtifactInfo::default();
    for m in matches {
        match m.category {
            Category::CodeSecrets => info.secrets_matches += 1,
            Category::CodeUnsafe => info.unsafe_matches += 1,
            _ => {}
        }
    }
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use axonflow_connectors::MockConnector;
    use axonflow_llm::{MockLLMProvider, RoutingStrategy};
    use axonflow_policy::catalog::{SYSTEM_DYNAMIC_POLICIES, SYSTEM_STATIC_POLICIES};
    use axonflow_policy::repository::{InMemoryPolicyStore, PolicyRow};
    use axonflow_usage::InMemoryUsageRecorder;
    use std::collections::HashMap as StdHashMap;

    fn seeded_store() -> InMemoryPolicyStore {
        let mut store = InMemoryPolicyStore::default();
        store.system.extend(SYSTEM_STATIC_POLICIES.iter().cloned().map(PolicyRow::Static));
        store.system.extend(SYSTEM_DYNAMIC_POLICIES.iter().cloned().map(PolicyRow::Dynamic));
        store
    }

    fn gateway_with_seeded_catalog() -> (Gateway, Arc<InMemoryUsageRecorder>) {
        let store = Arc::new(seeded_store());
        let policy_engine = Arc::new(PolicyEngine::new(store.clone(), store));
        let connectors = Arc::new(ConnectorRegistry::new());
        connectors.register("sql", Arc::new(MockConnector::new("sql")));
        let mut router = LLMRouter::new(RoutingStrategy::RoundRobin);
        router.register(Arc::new(MockLLMProvider::new("stub", "stub-model").with_response("Paris.")));
        let usage = Arc::new(InMemoryUsageRecorder::new());
        let deployment = DeploymentConfig {
            mode: axonflow_types::DeploymentMode::Community,
            environment: axonflow_types::Environment::Other,
            self_hosted_requested: true,
            self_hosted_acknowledged: true,
        };
        let gateway = Gateway::new(policy_engine, connectors, Arc::new(router), usage.clone(), deployment, PipelineConfig::default());
        (gateway, usage)
    }

    fn sample_request(query: &str, request_type: RequestType) -> Request {
        Request {
            request_id: axonflow_types::RequestId::new(),
            tenant_id: TenantId::from("acme"),
            org_id: None,
            user_token: "irrelevant-under-self-hosted-shortcut".to_string(),
            client_id: ClientId::from("client-1"),
            request_type,
            query: query.to_string(),
            context: StdHashMap::new(),
        }
    }

    #[tokio::test]
    async fn s1_block_sqli() {
        let (gateway, _) = gateway_with_seeded_catalog();
        let request = sample_request("SELECT * FROM users; DROP TABLE users;--", RequestType::Sql);
        let response = gateway.execute_query(request).await;
        assert!(response.blocked);
        assert!(response.block_reason.unwrap().to_uppercase().contains("DROP"));
    }

    #[tokio::test]
    async fn s2_allow_chat() {
        let (gateway, _) = gateway_with_seeded_catalog();
        let request = sample_request("What is the capital of France?", RequestType::Chat);
        let response = gateway.execute_query(request).await;
        assert!(response.success);
        assert!(!response.blocked);
        let data = response.data.unwrap();
        assert!(data["text"].as_str().unwrap().contains("Paris"));
        assert!(response.policy_info.unwrap().processing_time_ms >= 0.0);
    }

    #[tokio::test]
    async fn s3_pii_ssn_blocks() {
        let (gateway, _) = gateway_with_seeded_catalog();
        let request = sample_request("Process refund for customer with SSN 123-45-6789", RequestType::Sql);
        let response = gateway.execute_query(request).await;
        assert!(response.blocked);
        assert!(response.blocking_policy_name.unwrap().to_uppercase().contains("SECURITY NUMBER"));
    }

    #[tokio::test]
    async fn s4_aadhaar_false_positive_guard_does_not_block_credit_card() {
        let (gateway, _) = gateway_with_seeded_catalog();
        let request = sample_request("Card: 4111-1111-1111-1111", RequestType::Sql);
        let response = gateway.execute_query(request).await;
        if let Some(name) = &response.blocking_policy_name {
            assert!(!name.to_lowercase().contains("aadhaar"));
        }
    }

    #[tokio::test]
    async fn audit_records_exactly_one_entry_for_a_blocked_request() {
        let (gateway, usage) = gateway_with_seeded_catalog();
        let request = sample_request("SELECT * FROM users; DROP TABLE users;--", RequestType::Sql);
        let _ = gateway.execute_query(request).await;
        let calls = usage.api_calls();
        assert_eq!(calls.len(), 1);
        assert!(!calls[0].access_granted);
    }

    #[tokio::test]
    async fn gateway_mode_context_round_trips_through_audit() {
        let (gateway, usage) = gateway_with_seeded_catalog();
        let request = sample_request("What's our Q3 revenue?", RequestType::Chat);
        let context_id = gateway.get_policy_approved_context(&request).await.expect("pre-check should pass");
        let expired = gateway.audit_llm_call(&context_id, "stub", "stub-model", 10, 20, 5).await.unwrap();
        assert!(!expired);
        assert_eq!(usage.llm_requests().len(), 1);
    }

    #[tokio::test]
    async fn sql_extraction_failure_surfaces_validation_error() {
        // the seeded stub provider always replies "Paris." -- no SELECT
        // in sight, so natural-language translation must fail cleanly.
        let (gateway, _) = gateway_with_seeded_catalog();
        let request = sample_request("how many users do we have", RequestType::NaturalLanguage);
        let response = gateway.execute_query(request).await;
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("validation_error"));
    }
}
