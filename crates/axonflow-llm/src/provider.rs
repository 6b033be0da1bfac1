//! The `LLMProvider` capability (spec.md §4.6).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
#[error("provider {provider} unavailable: {reason}")]
pub struct ProviderError {
    pub provider: String,
    pub reason: String,
}

impl From<ProviderError> for axonflow_types::AxonError {
    fn from(err: ProviderError) -> Self {
        axonflow_types::AxonError::ProviderUnavailable { provider: err.provider, reason: err.reason }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub text: String,
    pub provider: String,
    pub model: String,
    pub tokens_prompt: u32,
    pub tokens_completion: u32,
    pub latency_ms: u64,
}

#[async_trait]
pub trait LLMProvider: Send + Sync {
    fn name(&self) -> &str;
    fn model(&self) -> &str;

    async fn execute(
        &self,
        prompt: &str,
        context: &HashMap<String, serde_json::Value>,
    ) -> Result<CompletionResponse, ProviderError>;

    async fn health_check(&self) -> bool;
}
