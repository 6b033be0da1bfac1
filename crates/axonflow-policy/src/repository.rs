//! The store-facing contract the policy engine refreshes its cache
//! through. The core never issues ad-hoc queries outside these
//! abstractions (spec.md §6 "Persisted state layout").

use crate::model::{DynamicPolicy, Override, StaticPolicy};
use async_trait::async_trait;
use axonflow_types::{OrgId, TenantId};

/// A row loaded from the `policies` table -- either a static or dynamic
/// definition, scoped to system, org or tenant.
#[derive(Debug, Clone)]
pub enum PolicyRow {
    Static(StaticPolicy),
    Dynamic(DynamicPolicy),
}

/// Loads policy rows and overrides. A single query with a LEFT JOIN to
/// `policy_overrides` is preferred over N+1 (spec.md §4.1 step 2); this
/// trait doesn't mandate the join, only the result shape, so a
/// `sqlx`-backed implementation can do it in one round trip while an
/// in-memory test double does three lookups.
#[async_trait]
pub trait PolicyRepository: Send + Sync {
    async fn system_policies(&self) -> Result<Vec<PolicyRow>, sqlx::Error>;
    async fn org_policies(&self, org: &OrgId) -> Result<Vec<PolicyRow>, sqlx::Error>;
    async fn tenant_policies(&self, tenant: &TenantId) -> Result<Vec<PolicyRow>, sqlx::Error>;
}

#[async_trait]
pub trait OverrideRepository: Send + Sync {
    /// All overrides whose `scope_id` is the org or the tenant.
    async fn overrides_for(
        &self,
        tenant: &TenantId,
        org: Option<&OrgId>,
    ) -> Result<Vec<Override>, sqlx::Error>;
}

/// An in-memory double used by tests and by the community build when no
/// row store is configured. Holds nothing beyond the system catalog by
/// default.
#[derive(Default)]
pub struct InMemoryPolicyStore {
    pub system: Vec<PolicyRow>,
    pub org: std::collections::HashMap<String, Vec<PolicyRow>>,
    pub tenant: std::collections::HashMap<String, Vec<PolicyRow>>,
    pub overrides: Vec<Override>,
}

#[async_trait]
impl PolicyRepository for InMemoryPolicyStore {
    async fn system_policies(&self) -> Result<Vec<PolicyRow>, sqlx::Error> {
        Ok(self.system.clone())
    }

    async fn org_policies(&self, org: &OrgId) -> Result<Vec<PolicyRow>, sqlx::Error> {
        Ok(self.org.get(org.as_str()).cloned().unwrap_or_default())
    }

    async fn tenant_policies(&self, tenant: &TenantId) -> Result<Vec<PolicyRow>, sqlx::Error> {
        Ok(self.tenant.get(tenant.as_str()).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl OverrideRepository for InMemoryPolicyStore {
    async fn overrides_for(
        &self,
        tenant: &TenantId,
        org: Option<&OrgId>,
    ) -> Result<Vec<Override>, sqlx::Error> {
        Ok(self
            .overrides
            .iter()
            .filter(|ov| {
                ov.scope_id == tenant.as_str()
                    || org.map(|o| ov.scope_id == o.as_str()).unwrap_or(false)
            })
            .cloned()
            .collect())
    }
}
