//! `UsageRecorder`: the two append-only write paths (spec.md §4.7). In
//! the community build these are no-ops; `StoreUsageRecorder` writes
//! through a `UsageRepository` and never propagates a write failure to
//! the caller (spec.md §5: "audit loss is tolerable, latency is not").

use crate::records::{ApiCall, LlmRequest};
use async_trait::async_trait;
use parking_lot::Mutex;

/// The store-facing contract for usage writes (spec.md §6 "Persisted
/// state layout": `usage_events`). The core never issues ad-hoc SQL
/// outside this abstraction.
#[async_trait]
pub trait UsageRepository: Send + Sync {
    async fn write_api_call(&self, event: &ApiCall) -> Result<(), sqlx::Error>;
    async fn write_llm_request(&self, event: &LlmRequest) -> Result<(), sqlx::Error>;
}

#[async_trait]
pub trait UsageRecorder: Send + Sync {
    async fn record_api_call(&self, event: ApiCall);
    async fn record_llm_request(&self, event: LlmRequest);
}

/// The community build's no-op recorder (spec.md §2 Non-goals).
#[derive(Debug, Default, Clone, Copy)]
pub struct CommunityUsageRecorder;

#[async_trait]
impl UsageRecorder for CommunityUsageRecorder {
    async fn record_api_call(&self, event: ApiCall) {
        tracing::debug!(request_id = %event.id, "community build: api_call audit discarded");
    }

    async fn record_llm_request(&self, event: LlmRequest) {
        tracing::debug!(request_id = %event.id, "community build: llm_request audit discarded");
    }
}

/// A real recorder backed by a `UsageRepository`. A write failure is
/// logged at `warn` and swallowed -- never surfaced to the request path.
pub struct StoreUsageRecorder<R: UsageRepository> {
    repository: R,
}

impl<R: UsageRepository> StoreUsageRecorder<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: UsageRepository> UsageRecorder for StoreUsageRecorder<R> {
    async fn record_api_call(&self, event: ApiCall) {
        if let Err(err) = self.repository.write_api_call(&event).await {
            tracing::warn!(request_id = %event.id, error = %err, "failed to persist api_call audit record");
        }
    }

    async fn record_llm_request(&self, event: LlmRequest) {
        if let Err(err) = self.repository.write_llm_request(&event).await {
            tracing::warn!(request_id = %event.id, error = %err, "failed to persist llm_request audit record");
        }
    }
}

/// An in-memory double for tests: records every event it's given rather
/// than discarding or persisting it, so tests can assert on exactly-once
/// delivery (spec.md §8 invariant 10).
#[derive(Default)]
pub struct InMemoryUsageRecorder {
    api_calls: Mutex<Vec<ApiCall>>,
    llm_requests: Mutex<Vec<LlmRequest>>,
}

impl InMemoryUsageRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_calls(&self) -> Vec<ApiCall> {
        self.api_calls.lock().clone()
    }

    pub fn llm_requests(&self) -> Vec<LlmRequest> {
        self.llm_requests.lock().clone()
    }
}

#[async_trait]
impl UsageRecorder for InMemoryUsageRecorder {
    async fn record_api_call(&self, event: ApiCall) {
        self.api_calls.lock().push(event);
    }

    async fn record_llm_request(&self, event: LlmRequest) {
        self.llm_requests.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::InstanceType;

    fn sample_api_call(granted: bool) -> ApiCall {
        ApiCall {
            id: uuid::Uuid::new_v4(),
            org_id: "acme".into(),
            client_id: Some("client-1".into()),
            instance_id: "agent-1".into(),
            instance_type: InstanceType::Agent,
            http_method: "POST".into(),
            http_path: "/api/request".into(),
            http_status: if granted { 200 } else { 403 },
            latency_ms: 12,
            access_granted: granted,
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn community_recorder_never_panics_and_records_nothing_observable() {
        let recorder = CommunityUsageRecorder;
        recorder.record_api_call(sample_api_call(true)).await;
    }

    #[tokio::test]
    async fn in_memory_recorder_retains_exactly_one_record_per_call() {
        // invariant 10.
        let recorder = InMemoryUsageRecorder::new();
        recorder.record_api_call(sample_api_call(false)).await;
        let calls = recorder.api_calls();
        assert_eq!(calls.len(), 1);
        assert!(!calls[0].access_granted);
    }
}
