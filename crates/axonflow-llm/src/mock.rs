//! A scriptable `LLMProvider` double for pipeline tests, analogous to
//! `axonflow_connectors::MockConnector`.

use crate::provider::{CompletionResponse, LLMProvider, ProviderError};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

pub struct MockLLMProvider {
    name: String,
    model: String,
    response: RwLock<Option<String>>,
    fail: RwLock<Option<String>>,
    healthy: RwLock<bool>,
}

impl MockLLMProvider {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            response: RwLock::new(Some("ok".to_string())),
            fail: RwLock::new(None),
            healthy: RwLock::new(true),
        }
    }

    pub fn with_response(self, text: impl Into<String>) -> Self {
        *self.response.write() = Some(text.into());
        self
    }

    pub fn fail_next_with(&self, reason: impl Into<String>) {
        *self.fail.write() = Some(reason.into());
    }

    pub fn set_healthy(&self, healthy: bool) {
        *self.healthy.write() = healthy;
    }
}

#[async_trait]
impl LLMProvider for MockLLMProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn execute(
        &self,
        prompt: &str,
        _context: &HashMap<String, serde_json::Value>,
    ) -> Result<CompletionResponse, ProviderError> {
        if let Some(reason) = self.fail.write().take() {
            return Err(ProviderError { provider: self.name.clone(), reason });
        }
        let text = self.response.read().clone().unwrap_or_default();
        Ok(CompletionResponse {
            text,
            provider: self.name.clone(),
            model: self.model.clone(),
            tokens_prompt: prompt.split_whitespace().count() as u32,
            tokens_completion: 1,
            latency_ms: 1,
        })
    }

    async fn health_check(&self) -> bool {
        *self.healthy.read()
    }
}
