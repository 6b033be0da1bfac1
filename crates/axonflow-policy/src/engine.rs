//! The policy engine (spec.md §4.1): effective-policy resolution with a
//! two-level cache, and the pattern-matching algorithms built on top of
//! it.

use crate::cache::{PatternCache, TenantCacheStore, TenantPolicyCache, DEFAULT_TTL, MAX_PATTERN_CACHE_SIZE};
use crate::dsl::{evaluate_conditions, EvalContext as DslContext};
use crate::model::{applicable_override, Action, Category, EffectivePolicy, PolicyKind, Tier};
use crate::repository::{OverrideRepository, PolicyRepository, PolicyRow};
use axonflow_types::{OrgId, Severity, TenantId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// `{matched, policy_id, name, category, tier, effective_action,
/// severity, has_override, override_reason, evaluation_time_ms}`
/// (spec.md §4.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirstMatchResult {
    pub matched: bool,
    pub policy_id: Option<String>,
    pub name: Option<String>,
    pub category: Option<Category>,
    pub tier: Option<Tier>,
    pub effective_action: Option<Action>,
    pub severity: Option<Severity>,
    pub has_override: bool,
    pub override_reason: Option<String>,
    pub evaluation_time_ms: f64,
}

impl FirstMatchResult {
    fn no_match(evaluation_time_ms: f64) -> Self {
        Self {
            matched: false,
            policy_id: None,
            name: None,
            category: None,
            tier: None,
            effective_action: None,
            severity: None,
            has_override: false,
            override_reason: None,
            evaluation_time_ms,
        }
    }
}

/// A single matched policy in an `EvaluateAll` sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyMatch {
    pub policy_id: String,
    pub name: String,
    pub category: Category,
    pub tier: Tier,
    pub effective_action: Action,
    pub severity: Severity,
    pub has_override: bool,
}

/// `{matches, highest_severity, should_block}` (spec.md §4.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllMatchesResult {
    pub matches: Vec<PolicyMatch>,
    pub highest_severity: Option<Severity>,
    pub should_block: bool,
    pub evaluation_time_ms: f64,
}

/// Engine-wide counters, surfaced via `Stats()`.
#[derive(Debug, Default)]
pub struct PolicyEngineStats {
    pub cache_hits: AtomicU64,
    pub cache_misses: AtomicU64,
    pub pattern_compile_failures: AtomicU64,
}

impl PolicyEngineStats {
    pub fn snapshot(&self) -> PolicyEngineStatsSnapshot {
        PolicyEngineStatsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            pattern_compile_failures: self.pattern_compile_failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PolicyEngineStatsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub pattern_compile_failures: u64,
}

/// Errors the engine itself can surface. A store error on cache refresh
/// is returned to the caller (spec.md §4.1 "Failure semantics"); a
/// pattern compile failure never reaches here -- it's logged and the
/// policy is skipped.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("policy store error: {0}")]
    Store(#[from] sqlx::Error),
}

/// The process-wide singleton (spec.md §5 "Resource lifecycles").
pub struct PolicyEngine {
    policies: Arc<dyn PolicyRepository>,
    overrides: Arc<dyn OverrideRepository>,
    tenant_cache: TenantCacheStore,
    pattern_cache: PatternCache,
    stats: PolicyEngineStats,
}

impl PolicyEngine {
    pub fn new(policies: Arc<dyn PolicyRepository>, overrides: Arc<dyn OverrideRepository>) -> Self {
        Self {
            policies,
            overrides,
            tenant_cache: TenantCacheStore::new(DEFAULT_TTL),
            pattern_cache: PatternCache::new(MAX_PATTERN_CACHE_SIZE),
            stats: PolicyEngineStats::default(),
        }
    }

    pub fn with_ttl(mut self, ttl: chrono::Duration) -> Self {
        self.tenant_cache = TenantCacheStore::new(ttl);
        self
    }

    /// `GetEffective(tenant, org?) -> ordered EffectivePolicy list`.
    pub async fn get_effective(
        &self,
        tenant: &TenantId,
        org: Option<&OrgId>,
    ) -> Result<Arc<TenantPolicyCache>, EngineError> {
        let key = axonflow_types::ids::cache_key(tenant, org);
        if let Some(cached) = self.tenant_cache.get(&key) {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(cached);
        }
        self.stats.cache_misses.fetch_add(1, Ordering::Relaxed);
        self.refresh(tenant, org, &key).await
    }

    async fn refresh(
        &self,
        tenant: &TenantId,
        org: Option<&OrgId>,
        key: &str,
    ) -> Result<Arc<TenantPolicyCache>, EngineError> {
        let system = self.policies.system_policies().await?;
        let org_rows = match org {
            Some(o) => self.policies.org_policies(o).await?,
            None => Vec::new(),
        };
        let tenant_rows = self.policies.tenant_policies(tenant).await?;
        let overrides = self.overrides.overrides_for(tenant, org).await?;

        let mut kinds: Vec<PolicyKind> = Vec::with_capacity(system.len() + org_rows.len() + tenant_rows.len());
        for row in system.into_iter().chain(org_rows).chain(tenant_rows) {
            kinds.push(match row {
                PolicyRow::Static(p) => PolicyKind::Static(p),
                PolicyRow::Dynamic(p) => PolicyKind::Dynamic(p),
            });
        }

        let mut effective: Vec<EffectivePolicy> = kinds
            .into_iter()
            .map(|kind| {
                let applied = applicable_override(&kind, &overrides).cloned();
                EffectivePolicy::new(kind, applied.as_ref())
            })
            .collect();

        // sort by (tier_rank, -priority); stable for equal keys.
        effective.sort_by(|a, b| {
            a.tier()
                .rank()
                .cmp(&b.tier().rank())
                .then(b.priority().cmp(&a.priority()))
        });

        let cache = TenantPolicyCache::build(effective, overrides.len(), self.tenant_cache.ttl());
        Ok(self.tenant_cache.insert(key.to_string(), cache))
    }

    pub fn get_by_category(
        &self,
        snapshot: &TenantPolicyCache,
        category: Category,
    ) -> Vec<EffectivePolicy> {
        snapshot.category(category).into_iter().cloned().collect()
    }

    pub fn get_by_tier(&self, snapshot: &TenantPolicyCache, tier: Tier) -> Vec<EffectivePolicy> {
        snapshot.tier(tier).into_iter().cloned().collect()
    }

    pub fn invalidate_cache(&self, tenant: &TenantId, org: Option<&OrgId>) {
        let key = axonflow_types::ids::cache_key(tenant, org);
        tracing::info!(tenant = %tenant, org = ?org, "policy cache invalidated");
        self.tenant_cache.invalidate(&key);
    }

    pub fn invalidate_all(&self) {
        tracing::info!("policy cache invalidated for all tenants");
        self.tenant_cache.invalidate_all();
    }

    pub fn stats(&self) -> PolicyEngineStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn pattern_cache_len(&self) -> usize {
        self.pattern_cache.len()
    }

    /// `Evaluate(tenant, org?, input) -> FirstMatchResult`. Stops at the
    /// first policy whose pattern matches.
    pub async fn evaluate(
        &self,
        tenant: &TenantId,
        org: Option<&OrgId>,
        input: &str,
    ) -> Result<FirstMatchResult, EngineError> {
        let start = std::time::Instant::now();
        let snapshot = self.get_effective(tenant, org).await?;
        for policy in &snapshot.policies {
            if !policy.effective_enabled() {
                continue;
            }
            if self.matches(policy, input) {
                return Ok(FirstMatchResult {
                    matched: true,
                    policy_id: Some(policy.id().to_string()),
                    name: Some(policy.name().to_string()),
                    category: Some(policy.category()),
                    tier: Some(policy.tier()),
                    effective_action: Some(policy.effective_action()),
                    severity: Some(policy.severity()),
                    has_override: policy.has_override,
                    override_reason: policy.override_reason.clone(),
                    evaluation_time_ms: start.elapsed().as_secs_f64() * 1000.0,
                });
            }
        }
        Ok(FirstMatchResult::no_match(start.elapsed().as_secs_f64() * 1000.0))
    }

    /// `EvaluateAll(tenant, org?, input) -> AllMatchesResult`. Evaluates
    /// every enabled policy.
    pub async fn evaluate_all(
        &self,
        tenant: &TenantId,
        org: Option<&OrgId>,
        input: &str,
        request_type: &str,
        context: &HashMap<String, serde_json::Value>,
    ) -> Result<AllMatchesResult, EngineError> {
        let start = std::time::Instant::now();
        let snapshot = self.get_effective(tenant, org).await?;
        let mut matches = Vec::new();
        let mut highest_severity = None;
        let mut should_block = false;

        for policy in &snapshot.policies {
            if !policy.effective_enabled() {
                continue;
            }
            let is_match = match &policy.policy {
                PolicyKind::Static(_) => self.matches(policy, input),
                PolicyKind::Dynamic(p) => {
                    let dsl_ctx = DslContext { query: input, request_type, context };
                    evaluate_conditions(&p.conditions, &dsl_ctx)
                }
            };
            if !is_match {
                continue;
            }
            let severity = policy.severity();
            highest_severity = Some(match highest_severity {
                Some(existing) if existing >= severity => existing,
                _ => severity,
            });
            if policy.effective_action().is_blocking() {
                should_block = true;
            }
            matches.push(PolicyMatch {
                policy_id: policy.id().to_string(),
                name: policy.name().to_string(),
                category: policy.category(),
                tier: policy.tier(),
                effective_action: policy.effective_action(),
                severity,
                has_override: policy.has_override,
            });
        }

        Ok(AllMatchesResult {
            matches,
            highest_severity,
            should_block,
            evaluation_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        })
    }

    /// Matches a static policy's pattern against `input`, compiling and
    /// caching it on first use. A compile failure is logged and the
    /// policy is treated as non-matching -- never fatal to the overall
    /// evaluation.
    fn matches(&self, policy: &EffectivePolicy, input: &str) -> bool {
        let Some(pattern) = policy.pattern() else { return false };
        let re = match self.pattern_cache.get_or_compile(pattern) {
            Ok(re) => re,
            Err(err) => {
                self.stats.pattern_compile_failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(policy = policy.id(), error = %err, "policy pattern failed to compile, skipping");
                return false;
            }
        };

        // spec.md §4.2: a 12-digit Aadhaar match that's actually the
        // front of a 16-digit credit card must not fire. Every other
        // category matches plainly.
        if policy.id() == crate::catalog::AADHAAR_POLICY_ID {
            return re
                .find(input)
                .map(|m| !crate::catalog::is_likely_credit_card(input, m.end()))
                .unwrap_or(false);
        }
        re.is_match(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Override, OverrideScope, StaticPolicy, Tier};
    use crate::repository::InMemoryPolicyStore;
    use axonflow_types::TenantId;
    use chrono::Utc;

    fn sys_policy(id: &str, pattern: &str, priority: i32, action: Action) -> PolicyRow {
        PolicyRow::Static(StaticPolicy {
            id: id.into(),
            name: id.into(),
            description: String::new(),
            category: Category::SecuritySqli,
            tier: Tier::System,
            pattern: pattern.into(),
            severity: Severity::Critical,
            action,
            priority,
            enabled: true,
        })
    }

    fn tenant_policy(id: &str, pattern: &str, priority: i32) -> PolicyRow {
        PolicyRow::Static(StaticPolicy {
            id: id.into(),
            name: id.into(),
            description: String::new(),
            category: Category::SecuritySqli,
            tier: Tier::Tenant,
            pattern: pattern.into(),
            severity: Severity::Low,
            action: Action::Log,
            priority,
            enabled: true,
        })
    }

    fn engine_with(store: InMemoryPolicyStore) -> PolicyEngine {
        let store = Arc::new(store);
        PolicyEngine::new(store.clone(), store)
    }

    #[tokio::test]
    async fn tier_priority_invariant() {
        // invariant 1: system beats tenant for the same pattern.
        let mut store = InMemoryPolicyStore::default();
        store.system.push(sys_policy("sys_drop", "DROP", 100, Action::Block));
        store
            .tenant
            .insert("acme".into(), vec![tenant_policy("tenant_drop", "DROP", 999)]);
        let engine = engine_with(store);
        let tenant = TenantId::from("acme");
        let result = engine.evaluate(&tenant, None, "DROP TABLE users").await.unwrap();
        assert!(result.matched);
        assert_eq!(result.policy_id.as_deref(), Some("sys_drop"));
    }

    #[tokio::test]
    async fn priority_within_tier_invariant() {
        // invariant 2: higher priority within the same tier wins.
        let mut store = InMemoryPolicyStore::default();
        store.system.push(sys_policy("low_prio", "DROP", 10, Action::Block));
        store.system.push(sys_policy("high_prio", "DROP", 500, Action::Block));
        let engine = engine_with(store);
        let tenant = TenantId::from("acme");
        let result = engine.evaluate(&tenant, None, "DROP TABLE users").await.unwrap();
        assert_eq!(result.policy_id.as_deref(), Some("high_prio"));
    }

    #[tokio::test]
    async fn override_changes_effective_action() {
        let mut store = InMemoryPolicyStore::default();
        store.system.push(sys_policy("sys_pii_email", "@", 10, Action::Log));
        store.overrides.push(Override {
            policy_id: "sys_pii_email".into(),
            scope: OverrideScope::Tenant,
            scope_id: "acme".into(),
            action_override: Some(Action::Block),
            enabled_override: None,
            reason: "tenant policy".into(),
            created_by: "admin".into(),
            created_at: Utc::now(),
        });
        let engine = engine_with(store);
        let tenant = TenantId::from("acme");
        let result = engine.evaluate(&tenant, None, "contact me @ example").await.unwrap();
        assert!(result.matched);
        assert_eq!(result.effective_action, Some(Action::Block));
        assert!(result.has_override);
    }

    #[tokio::test]
    async fn evaluate_all_tracks_highest_severity_and_block() {
        let mut store = InMemoryPolicyStore::default();
        store.system.push(sys_policy("sys_a", "DROP", 10, Action::Log));
        store.system.push(PolicyRow::Static(StaticPolicy {
            id: "sys_b".into(),
            name: "sys_b".into(),
            description: String::new(),
            category: Category::SecuritySqli,
            tier: Tier::System,
            pattern: "TABLE".into(),
            severity: Severity::Critical,
            action: Action::Block,
            priority: 5,
            enabled: true,
        }));
        let engine = engine_with(store);
        let tenant = TenantId::from("acme");
        let ctx = HashMap::new();
        let result = engine
            .evaluate_all(&tenant, None, "DROP TABLE users", "sql", &ctx)
            .await
            .unwrap();
        assert_eq!(result.matches.len(), 2);
        assert_eq!(result.highest_severity, Some(Severity::Critical));
        assert!(result.should_block);
    }

    #[tokio::test]
    async fn cache_hit_returns_pointer_stable_snapshot() {
        let store = InMemoryPolicyStore::default();
        let engine = engine_with(store);
        let tenant = TenantId::from("acme");
        let first = engine.get_effective(&tenant, None).await.unwrap();
        let second = engine.get_effective(&tenant, None).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(engine.stats().cache_misses, 1);
        assert_eq!(engine.stats().cache_hits, 1);
    }

    #[tokio::test]
    async fn invalidate_all_forces_refresh() {
        let store = InMemoryPolicyStore::default();
        let engine = engine_with(store);
        let tenant = TenantId::from("acme");
        let first = engine.get_effective(&tenant, None).await.unwrap();
        engine.invalidate_all();
        let second = engine.get_effective(&tenant, None).await.unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn malformed_pattern_is_skipped_not_fatal() {
        let mut store = InMemoryPolicyStore::default();
        store.system.push(sys_policy("bad_pattern", "(unterminated", 900, Action::Block));
        store.system.push(sys_policy("good_pattern", "DROP", 10, Action::Block));
        let engine = engine_with(store);
        let tenant = TenantId::from("acme");
        let result = engine.evaluate(&tenant, None, "DROP TABLE users").await.unwrap();
        assert_eq!(result.policy_id.as_deref(), Some("good_pattern"));
    }

    fn engine_with_aadhaar_catalog() -> PolicyEngine {
        let mut store = InMemoryPolicyStore::default();
        store.system.push(PolicyRow::Static(
            crate::catalog::SYSTEM_STATIC_POLICIES
                .iter()
                .find(|p| p.id == crate::catalog::AADHAAR_POLICY_ID)
                .cloned()
                .unwrap(),
        ));
        engine_with(store)
    }

    #[tokio::test]
    async fn aadhaar_credit_card_false_positive_guard_s4() {
        // invariant 8 / scenario S4: a 16-digit credit card must not
        // surface as an aadhaar match.
        let engine = engine_with_aadhaar_catalog();
        let tenant = TenantId::from("acme");
        let ctx = HashMap::new();
        for fixture in [
            "Card: 4111-1111-1111-1111",
            "Card: 4111 1111 1111 1111",
            "Card: 4111111111111111",
            "Amex: 378282246310005",
            "Diners: 30569309025904",
        ] {
            let result = engine.evaluate_all(&tenant, None, fixture, "chat", &ctx).await.unwrap();
            assert!(
                result.matches.iter().all(|m| m.policy_id != crate::catalog::AADHAAR_POLICY_ID),
                "unexpected aadhaar match for {fixture}"
            );
        }
    }

    #[tokio::test]
    async fn aadhaar_plain_number_still_matches() {
        let engine = engine_with_aadhaar_catalog();
        let tenant = TenantId::from("acme");
        let result = engine.evaluate(&tenant, None, "aadhaar 1234 5678 9012 on file").await.unwrap();
        assert!(result.matched);
        assert_eq!(result.policy_id.as_deref(), Some(crate::catalog::AADHAAR_POLICY_ID));
    }
}
