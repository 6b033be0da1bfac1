//! The two append-only record kinds (spec.md §3 "Audit / usage
//! records"). Once handed to a recorder, a record is owned exclusively
//! by the store -- these structs are never mutated after construction.

use serde::{Deserialize, Serialize};

/// `instance_type ∈ {agent, orchestrator}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceType {
    Agent,
    Orchestrator,
}

/// `APICall` per spec.md §3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCall {
    pub id: uuid::Uuid,
    pub org_id: String,
    pub client_id: Option<String>,
    pub instance_id: String,
    pub instance_type: InstanceType,
    pub http_method: String,
    pub http_path: String,
    pub http_status: u16,
    pub latency_ms: u64,
    pub access_granted: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// `LLMRequest` per spec.md §3. `cost_cents` is computed at write time
/// via `pricing::calculate_cost`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    pub id: uuid::Uuid,
    pub org_id: String,
    pub client_id: Option<String>,
    pub instance_id: String,
    pub instance_type: InstanceType,
    pub provider: String,
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    pub cost_cents: u64,
    pub latency_ms: u64,
    pub http_status: u16,
    pub access_granted: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Either record kind, for a uniform write path / in-memory inspection
/// in tests (spec.md §8 invariant 10: "exactly one record ... appended").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum UsageEvent {
    ApiCall(ApiCall),
    LlmRequest(LlmRequest),
}

impl UsageEvent {
    pub fn access_granted(&self) -> bool {
        match self {
            Self::ApiCall(e) => e.access_granted,
            Self::LlmRequest(e) => e.access_granted,
        }
    }
}
