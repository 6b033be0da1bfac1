//! The two-level cache (spec.md §3 "Cache entries", §5 concurrency
//! model): an effective-policy set per tenant, and compiled regex per
//! pattern. Both are guarded by a `parking_lot::RwLock` the way the
//! teacher's `feature_flags.rs`/`metrics.rs` guard their maps -- readers
//! take a snapshot under the read lock and release it before doing any
//! real work.

use crate::model::{Category, EffectivePolicy, Tier};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

/// Default cache TTL (spec.md §3: TTL in `[30s, 30m]`, default 5m).
pub const DEFAULT_TTL: Duration = Duration::minutes(5);
pub const MIN_TTL_SECS: i64 = 30;
pub const MAX_TTL_SECS: i64 = 1800;

/// Bound on distinct compiled patterns held at once (spec.md §3).
pub const MAX_PATTERN_CACHE_SIZE: usize = 1000;

/// One tenant[:org]'s resolved, ordered policy set plus category/tier
/// indices, as it sits in the cache.
#[derive(Debug)]
pub struct TenantPolicyCache {
    pub policies: Vec<EffectivePolicy>,
    pub by_category: HashMap<Category, Vec<usize>>,
    pub by_tier: HashMap<u8, Vec<usize>>,
    pub compiled_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub policy_count: usize,
    pub override_count: usize,
}

impl TenantPolicyCache {
    pub fn build(policies: Vec<EffectivePolicy>, override_count: usize, ttl: Duration) -> Self {
        let mut by_category: HashMap<Category, Vec<usize>> = HashMap::new();
        let mut by_tier: HashMap<u8, Vec<usize>> = HashMap::new();
        for (idx, p) in policies.iter().enumerate() {
            by_category.entry(p.category()).or_default().push(idx);
            by_tier.entry(p.tier().rank()).or_default().push(idx);
        }
        let compiled_at = Utc::now();
        Self {
            policy_count: policies.len(),
            by_category,
            by_tier,
            policies,
            override_count,
            compiled_at,
            expires_at: compiled_at + ttl,
        }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn category(&self, category: Category) -> Vec<&EffectivePolicy> {
        self.by_category
            .get(&category)
            .map(|idxs| idxs.iter().map(|&i| &self.policies[i]).collect())
            .unwrap_or_default()
    }

    pub fn tier(&self, tier: Tier) -> Vec<&EffectivePolicy> {
        self.by_tier
            .get(&tier.rank())
            .map(|idxs| idxs.iter().map(|&i| &self.policies[i]).collect())
            .unwrap_or_default()
    }
}

/// Per-tenant cache, keyed by `tenant[:org]`. Entries are immutable once
/// inserted: `get` hands back an `Arc` snapshot so evaluation never holds
/// the lock.
pub struct TenantCacheStore {
    entries: RwLock<HashMap<String, Arc<TenantPolicyCache>>>,
    ttl: Duration,
}

impl TenantCacheStore {
    pub fn new(ttl: Duration) -> Self {
        let ttl = ttl.num_seconds().clamp(MIN_TTL_SECS, MAX_TTL_SECS);
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: Duration::seconds(ttl),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns a fresh snapshot if present and not expired; `None` means
    /// the caller must refresh from the store.
    pub fn get(&self, key: &str) -> Option<Arc<TenantPolicyCache>> {
        let guard = self.entries.read();
        let entry = guard.get(key)?;
        if entry.is_fresh(Utc::now()) {
            Some(Arc::clone(entry))
        } else {
            None
        }
    }

    pub fn insert(&self, key: String, cache: TenantPolicyCache) -> Arc<TenantPolicyCache> {
        let cache = Arc::new(cache);
        self.entries.write().insert(key, Arc::clone(&cache));
        cache
    }

    pub fn invalidate(&self, key: &str) {
        self.entries.write().remove(key);
    }

    pub fn invalidate_all(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bounded map from pattern-string to compiled regex. Once full, new
/// entries are silently not inserted -- compiling still works for the
/// caller, it's just not memoized (spec.md §3/§5: "stop inserting when
/// full", "eviction policy ... simple and deterministic").
pub struct PatternCache {
    compiled: RwLock<HashMap<String, Arc<Regex>>>,
    max_size: usize,
}

impl PatternCache {
    pub fn new(max_size: usize) -> Self {
        Self {
            compiled: RwLock::new(HashMap::new()),
            max_size,
        }
    }

    /// Look up a compiled pattern, compiling and inserting on miss
    /// (subject to the size bound). A compile failure is returned to the
    /// caller, who treats it as a per-policy skip -- never fatal to the
    /// overall evaluation.
    pub fn get_or_compile(&self, pattern: &str) -> Result<Arc<Regex>, regex::Error> {
        if let Some(re) = self.compiled.read().get(pattern) {
            return Ok(Arc::clone(re));
        }
        let compiled = Arc::new(Regex::new(pattern)?);
        let mut guard = self.compiled.write();
        if guard.len() < self.max_size {
            guard.entry(pattern.to_string()).or_insert_with(|| Arc::clone(&compiled));
        }
        Ok(compiled)
    }

    pub fn len(&self) -> usize {
        self.compiled.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Default for PatternCache {
    fn default() -> Self {
        Self::new(MAX_PATTERN_CACHE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_cache_bounds_exactly() {
        // invariant 4: after inserting MaxPatternCacheSize + K distinct
        // patterns, the cache size equals MaxPatternCacheSize exactly.
        let cache = PatternCache::new(10);
        for i in 0..25 {
            let pattern = format!("pattern-{}", i);
            cache.get_or_compile(&pattern).unwrap();
        }
        assert_eq!(cache.len(), 10);
    }

    #[test]
    fn pattern_cache_hits_return_same_compiled_pattern() {
        let cache = PatternCache::new(10);
        let a = cache.get_or_compile("abc").unwrap();
        let b = cache.get_or_compile("abc").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn compile_failure_does_not_panic() {
        let cache = PatternCache::new(10);
        assert!(cache.get_or_compile("(unterminated").is_err());
    }

    #[test]
    fn tenant_cache_snapshot_is_pointer_stable_within_ttl() {
        let store = TenantCacheStore::new(Duration::minutes(5));
        let cache = TenantPolicyCache::build(vec![], 0, store.ttl());
        let inserted = store.insert("acme".into(), cache);
        let first = store.get("acme").unwrap();
        let second = store.get("acme").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&inserted, &first));
    }

    #[test]
    fn invalidate_has_immediate_effect() {
        let store = TenantCacheStore::new(Duration::minutes(5));
        let cache = TenantPolicyCache::build(vec![], 0, store.ttl());
        store.insert("acme".into(), cache);
        assert!(store.get("acme").is_some());
        store.invalidate("acme");
        assert!(store.get("acme").is_none());
    }

    #[test]
    fn ttl_is_clamped_to_spec_bounds() {
        let too_short = TenantCacheStore::new(Duration::seconds(1));
        assert_eq!(too_short.ttl(), Duration::seconds(MIN_TTL_SECS));
        let too_long = TenantCacheStore::new(Duration::hours(2));
        assert_eq!(too_long.ttl(), Duration::seconds(MAX_TTL_SECS));
    }
}
