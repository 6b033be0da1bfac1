//! Server-side routing across registered `LLMProvider`s (spec.md §4.6).
//!
//! Selection is deterministic given `LLM_ROUTING_STRATEGY`: weighted
//! (modular counter keyed on a hash of `request_id`), round-robin
//! (monotonic counter), or failover (a named default, falling through
//! the remaining providers in declaration order on failure). A
//! per-request `context.provider`/`context.model` always bypasses the
//! strategy.

use crate::provider::{CompletionResponse, LLMProvider, ProviderError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// `LLM_ROUTING_STRATEGY` values (spec.md §4.6/§6).
#[derive(Debug, Clone)]
pub enum RoutingStrategy {
    /// `provider -> integer weight`, e.g. `openai:50,anthropic:30,bedrock:20`.
    Weighted(Vec<(String, u32)>),
    RoundRobin,
    /// `DEFAULT_LLM_PROVIDER`; remaining providers are tried in
    /// declaration order on failure.
    Failover { default: String },
}

/// Parses the `PROVIDER_WEIGHTS` env-var format: `name:weight,name:weight,...`.
pub fn parse_provider_weights(spec: &str) -> Vec<(String, u32)> {
    spec.split(',')
        .filter_map(|entry| {
            let (name, weight) = entry.split_once(':')?;
            let weight: u32 = weight.trim().parse().ok()?;
            Some((name.trim().to_string(), weight))
        })
        .collect()
}

/// Registered providers plus the strategy used to pick among them.
pub struct LLMRouter {
    providers: HashMap<String, Arc<dyn LLMProvider>>,
    order: Vec<String>,
    strategy: RoutingStrategy,
    round_robin_counter: AtomicU64,
}

impl LLMRouter {
    pub fn new(strategy: RoutingStrategy) -> Self {
        Self {
            providers: HashMap::new(),
            order: Vec::new(),
            strategy,
            round_robin_counter: AtomicU64::new(0),
        }
    }

    /// Providers are kept in declaration order -- the order `failover`
    /// falls through and the order `weighted`'s ranges are built in.
    pub fn register(&mut self, provider: Arc<dyn LLMProvider>) {
        let name = provider.name().to_string();
        if !self.providers.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.providers.insert(name, provider);
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// `Execute(prompt, context)`. A `context.provider` override bypasses
    /// the configured strategy entirely; `context.model` is forwarded to
    /// the chosen provider's own model selection out of band (the
    /// capability trait is single-model per instance in this spec, so a
    /// model override that doesn't match is surfaced as
    /// `ProviderUnavailable`).
    pub async fn execute(
        &self,
        request_id: &str,
        prompt: &str,
        context: &HashMap<String, serde_json::Value>,
    ) -> Result<CompletionResponse, ProviderError> {
        if self.providers.is_empty() {
            return Err(ProviderError {
                provider: "none".to_string(),
                reason: "no LLM providers are registered".to_string(),
            });
        }

        if let Some(name) = context.get("provider").and_then(|v| v.as_str()) {
            let provider = self.providers.get(name).ok_or_else(|| ProviderError {
                provider: name.to_string(),
                reason: "requested provider is not registered".to_string(),
            })?;
            if let Some(model) = context.get("model").and_then(|v| v.as_str()) {
                if model != provider.model() {
                    return Err(ProviderError {
                        provider: name.to_string(),
                        reason: format!("provider {name} does not serve model {model}"),
                    });
                }
            }
            return provider.execute(prompt, context).await;
        }

        match &self.strategy {
            RoutingStrategy::Weighted(weights) => self.execute_weighted(request_id, weights, prompt, context).await,
            RoutingStrategy::RoundRobin => self.execute_round_robin(prompt, context).await,
            RoutingStrategy::Failover { default } => self.execute_failover(default, prompt, context).await,
        }
    }

    async fn execute_weighted(
        &self,
        request_id: &str,
        weights: &[(String, u32)],
        prompt: &str,
        context: &HashMap<String, serde_json::Value>,
    ) -> Result<CompletionResponse, ProviderError> {
        let live_weights: Vec<(&str, u32)> = weights
            .iter()
            .filter(|(name, _)| self.providers.contains_key(name))
            .map(|(name, w)| (name.as_str(), *w))
            .collect();
        let total: u32 = live_weights.iter().map(|(_, w)| w).sum();
        if total == 0 {
            return self.execute_round_robin(prompt, context).await;
        }
        let bucket = (hash_request_id(request_id) % total as u64) as u32;
        let mut acc = 0u32;
        let mut chosen = live_weights[0].0;
        for (name, weight) in &live_weights {
            acc += weight;
            if bucket < acc {
                chosen = name;
                break;
            }
        }
        let provider = self.providers.get(chosen).expect("chosen from live_weights");
        provider.execute(prompt, context).await
    }

    async fn execute_round_robin(
        &self,
        prompt: &str,
        context: &HashMap<String, serde_json::Value>,
    ) -> Result<CompletionResponse, ProviderError> {
        let idx = self.round_robin_counter.fetch_add(1, Ordering::Relaxed) as usize % self.order.len();
        let name = &self.order[idx];
        let provider = self.providers.get(name).expect("order and providers stay in sync");
        provider.execute(prompt, context).await
    }

    async fn execute_failover(
        &self,
        default: &str,
        prompt: &str,
        context: &HashMap<String, serde_json::Value>,
    ) -> Result<CompletionResponse, ProviderError> {
        let mut order: Vec<&str> = Vec::with_capacity(self.order.len());
        if self.providers.contains_key(default) {
            order.push(default);
        }
        order.extend(self.order.iter().map(|s| s.as_str()).filter(|n| *n != default));

        let mut last_err: Option<ProviderError> = None;
        for name in order {
            let provider = self.providers.get(name).expect("name drawn from providers/order");
            match provider.execute(prompt, context).await {
                Ok(response) => return Ok(response),
                Err(err) => {
                    tracing::warn!(provider = name, error = %err, "provider failed, trying next in failover order");
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.unwrap_or(ProviderError {
            provider: default.to_string(),
            reason: "no providers available".to_string(),
        }))
    }
}

/// A simple, deterministic string hash (FNV-1a) used only to key the
/// weighted-routing bucket selection -- not a cryptographic hash.
fn hash_request_id(request_id: &str) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;
    let mut hash = FNV_OFFSET;
    for byte in request_id.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockLLMProvider;

    fn router_with(strategy: RoutingStrategy) -> LLMRouter {
        let mut router = LLMRouter::new(strategy);
        router.register(Arc::new(MockLLMProvider::new("openai", "gpt-4").with_response("openai-reply")));
        router.register(Arc::new(MockLLMProvider::new("anthropic", "claude").with_response("anthropic-reply")));
        router
    }

    #[tokio::test]
    async fn round_robin_cycles_through_providers_in_order() {
        let router = router_with(RoutingStrategy::RoundRobin);
        let ctx = HashMap::new();
        let first = router.execute("r1", "hi", &ctx).await.unwrap();
        let second = router.execute("r2", "hi", &ctx).await.unwrap();
        let third = router.execute("r3", "hi", &ctx).await.unwrap();
        assert_eq!(first.provider, "openai");
        assert_eq!(second.provider, "anthropic");
        assert_eq!(third.provider, "openai");
    }

    #[tokio::test]
    async fn weighted_is_deterministic_for_the_same_request_id() {
        let router = router_with(RoutingStrategy::Weighted(vec![
            ("openai".to_string(), 50),
            ("anthropic".to_string(), 50),
        ]));
        let ctx = HashMap::new();
        let a = router.execute("stable-id", "hi", &ctx).await.unwrap();
        let b = router.execute("stable-id", "hi", &ctx).await.unwrap();
        assert_eq!(a.provider, b.provider);
    }

    #[tokio::test]
    async fn failover_tries_next_provider_on_failure() {
        let openai = Arc::new(MockLLMProvider::new("openai", "gpt-4"));
        openai.fail_next_with("rate limited");
        let mut router = LLMRouter::new(RoutingStrategy::Failover { default: "openai".to_string() });
        router.register(openai);
        router.register(Arc::new(MockLLMProvider::new("anthropic", "claude").with_response("anthropic-reply")));
        let ctx = HashMap::new();
        let result = router.execute("r1", "hi", &ctx).await.unwrap();
        assert_eq!(result.provider, "anthropic");
    }

    #[tokio::test]
    async fn all_providers_failing_surfaces_provider_unavailable() {
        let openai = Arc::new(MockLLMProvider::new("openai", "gpt-4"));
        openai.fail_next_with("down");
        let mut router = LLMRouter::new(RoutingStrategy::Failover { default: "openai".to_string() });
        router.register(openai);
        let ctx = HashMap::new();
        assert!(router.execute("r1", "hi", &ctx).await.is_err());
    }

    #[tokio::test]
    async fn no_providers_registered_is_provider_unavailable() {
        let router = LLMRouter::new(RoutingStrategy::RoundRobin);
        let ctx = HashMap::new();
        assert!(router.execute("r1", "hi", &ctx).await.is_err());
    }

    #[tokio::test]
    async fn context_provider_override_bypasses_strategy() {
        let router = router_with(RoutingStrategy::RoundRobin);
        let mut ctx = HashMap::new();
        ctx.insert("provider".to_string(), serde_json::json!("anthropic"));
        let result = router.execute("r1", "hi", &ctx).await.unwrap();
        assert_eq!(result.provider, "anthropic");
    }

    #[test]
    fn parses_weight_spec() {
        let weights = parse_provider_weights("openai:50,anthropic:30,bedrock:20");
        assert_eq!(weights, vec![
            ("openai".to_string(), 50),
            ("anthropic".to_string(), 30),
            ("bedrock".to_string(), 20),
        ]);
    }
}
