//! Gateway-mode `context_id` issuance/verification (spec.md §4.3: "binds
//! `{tenant_id, client_id, query_fingerprint, issued_at, expires_at}`").
//!
//! `GetPolicyApprovedContext` issues one after a successful pre-check;
//! `AuditLLMCall` later verifies it. A short-lived in-memory map is
//! sufficient -- contexts outlive a single request but not a process
//! restart, matching spec.md's "expired but accepted, flagged" design
//! (there's nothing to persist across restarts for a value this
//! short-lived).

use axonflow_types::{ClientId, TenantId};
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ApprovedContext {
    pub tenant_id: TenantId,
    pub client_id: ClientId,
    pub query_fingerprint: String,
    pub issued_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

impl ApprovedContext {
    pub fn is_expired(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        now > self.expires_at
    }
}

/// `query_fingerprint`: a stable hash of the pre-checked query, so a
/// later audit call can detect (without storing the raw query twice)
/// whether it's auditing the same request it pre-checked.
pub fn query_fingerprint(query: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(query.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// In-memory store of outstanding approved contexts, keyed by
/// `context_id`. Guarded by a single `RwLock`, matching the cache
/// locking discipline in spec.md §5.
#[derive(Default)]
pub struct ContextStore {
    contexts: RwLock<HashMap<String, ApprovedContext>>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new `context_id` for a pre-check that passed, with the
    /// default 10-minute TTL from spec.md §4.3.
    pub fn issue(&self, tenant_id: TenantId, client_id: ClientId, query: &str, ttl: chrono::Duration) -> String {
        let now = chrono::Utc::now();
        let context_id = Uuid::new_v4().to_string();
        let context = ApprovedContext {
            tenant_id,
            client_id,
            query_fingerprint: query_fingerprint(query),
            issued_at: now,
            expires_at: now + ttl,
        };
        self.contexts.write().insert(context_id.clone(), context);
        context_id
    }

    /// Looks up a context for audit. Per spec.md §4.3, an expired
    /// context is accepted (not dropped) but the caller should flag it
    /// -- `VerifiedContext::expired` carries that signal.
    pub fn verify(&self, context_id: &str) -> Option<VerifiedContext> {
        let context = self.contexts.read().get(context_id).cloned()?;
        let expired = context.is_expired(chrono::Utc::now());
        Some(VerifiedContext { context, expired })
    }

    /// Drops a context once it's been consumed by an audit call --
    /// contexts are single-use.
    pub fn consume(&self, context_id: &str) {
        self.contexts.write().remove(context_id);
    }

    pub fn len(&self) -> usize {
        self.contexts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct VerifiedContext {
    pub context: ApprovedContext,
    pub expired: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_then_verify_round_trips() {
        let store = ContextStore::new();
        let id = store.issue(TenantId::from("acme"), ClientId::from("client-1"), "SELECT 1", chrono::Duration::minutes(10));
        let verified = store.verify(&id).expect("context should be present");
        assert!(!verified.expired);
        assert_eq!(verified.context.tenant_id.as_str(), "acme");
    }

    #[test]
    fn expired_context_is_still_accepted_but_flagged() {
        let store = ContextStore::new();
        let id = store.issue(TenantId::from("acme"), ClientId::from("client-1"), "SELECT 1", chrono::Duration::seconds(-1));
        let verified = store.verify(&id).expect("expired context is still returned, not dropped");
        assert!(verified.expired);
    }

    #[test]
    fn unknown_context_id_is_none() {
        let store = ContextStore::new();
        assert!(store.verify("does-not-exist").is_none());
    }

    #[test]
    fn consume_removes_the_context() {
        let store = ContextStore::new();
        let id = store.issue(TenantId::from("acme"), ClientId::from("client-1"), "SELECT 1", chrono::Duration::minutes(10));
        store.consume(&id);
        assert!(store.verify(&id).is_none());
    }
}
