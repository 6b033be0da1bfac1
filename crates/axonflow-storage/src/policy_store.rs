//! `PolicyRepository`/`OverrideRepository` implementations against the
//! `policies`/`policy_overrides` tables (spec.md §6). Dynamic policies
//! share the `policies` table with static ones; their conditions/actions
//! are carried in two JSON columns the spec's semantic column list
//! doesn't name explicitly but doesn't forbid either (see DESIGN.md).

use crate::pool::StoragePool;
use async_trait::async_trait;
use axonflow_policy::model::{
    Action, Category, Condition, DynamicAction, DynamicPolicy, Override, OverrideScope,
    StaticPolicy, Tier,
};
use axonflow_policy::repository::{OverrideRepository, PolicyRepository, PolicyRow};
use axonflow_types::{OrgId, TenantId};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

fn decode<T: serde::de::DeserializeOwned>(s: &str) -> Option<T> {
    serde_json::from_value(JsonValue::String(s.to_string())).ok()
}

fn encode<T: serde::Serialize>(value: &T) -> String {
    match serde_json::to_value(value).expect("enum always serializes to a string") {
        JsonValue::String(s) => s,
        other => other.to_string(),
    }
}

#[derive(FromRow)]
struct PolicyRecord {
    policy_id: String,
    kind: String,
    tier: String,
    category: String,
    name: String,
    description: String,
    pattern: Option<String>,
    severity: Option<String>,
    action: Option<String>,
    policy_type: Option<String>,
    conditions_json: Option<JsonValue>,
    actions_json: Option<JsonValue>,
    priority: i32,
    enabled: bool,
}

impl PolicyRecord {
    fn into_policy_row(self) -> Option<PolicyRow> {
        let tier: Tier = decode(&self.tier)?;
        let category: Category = decode(&self.category)?;
        if self.kind == "dynamic" {
            let conditions: Vec<Condition> =
                serde_json::from_value(self.conditions_json.unwrap_or(JsonValue::Array(vec![]))).ok()?;
            let actions: Vec<DynamicAction> =
                serde_json::from_value(self.actions_json.unwrap_or(JsonValue::Array(vec![]))).ok()?;
            Some(PolicyRow::Dynamic(DynamicPolicy {
                id: self.policy_id,
                name: self.name,
                category,
                tier,
                policy_type: self.policy_type.unwrap_or_default(),
                conditions,
                actions,
                priority: self.priority,
                enabled: self.enabled,
            }))
        } else {
            let severity = decode(&self.severity?)?;
            let action: Action = decode(&self.action?)?;
            Some(PolicyRow::Static(StaticPolicy {
                id: self.policy_id,
                name: self.name,
                description: self.description,
                category,
                tier,
                pattern: self.pattern.unwrap_or_default(),
                severity,
                action,
                priority: self.priority,
                enabled: self.enabled,
            }))
        }
    }
}

pub struct PgPolicyStore {
    pool: StoragePool,
}

impl PgPolicyStore {
    pub fn new(pool: StoragePool) -> Self {
        Self { pool }
    }

    async fn policies_where(&self, clause: &str, bind: Option<&str>) -> Result<Vec<PolicyRow>, sqlx::Error> {
        let sql = format!(
            "SELECT policy_id, kind, tier, category, name, description, pattern, severity, \
             action, policy_type, conditions_json, actions_json, priority, enabled \
             FROM policies WHERE {clause}"
        );
        let records: Vec<PolicyRecord> = if let Some(value) = bind {
            sqlx::query_as(&sql).bind(value).fetch_all(self.pool.raw()).await?
        } else {
            sqlx::query_as(&sql).fetch_all(self.pool.raw()).await?
        };
        Ok(records.into_iter().filter_map(PolicyRecord::into_policy_row).collect())
    }
}

#[async_trait]
impl PolicyRepository for PgPolicyStore {
    async fn system_policies(&self) -> Result<Vec<PolicyRow>, sqlx::Error> {
        self.policies_where("tier = 'system' AND tenant_id IS NULL AND org_id IS NULL", None).await
    }

    async fn org_policies(&self, org: &OrgId) -> Result<Vec<PolicyRow>, sqlx::Error> {
        self.policies_where("tier = 'organization' AND org_id = $1", Some(org.as_str())).await
    }

    async fn tenant_policies(&self, tenant: &TenantId) -> Result<Vec<PolicyRow>, sqlx::Error> {
        self.policies_where("tier = 'tenant' AND tenant_id = $1", Some(tenant.as_str())).await
    }
}

#[derive(FromRow)]
struct OverrideRecord {
    policy_id: String,
    scope: String,
    scope_id: String,
    action_override: Option<String>,
    enabled_override: Option<bool>,
    reason: String,
    created_by: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl OverrideRecord {
    fn into_override(self) -> Option<Override> {
        let scope: OverrideScope = decode(&self.scope)?;
        let action_override = self.action_override.as_deref().and_then(decode::<Action>);
        Some(Override {
            policy_id: self.policy_id,
            scope,
            scope_id: self.scope_id,
            action_override,
            enabled_override: self.enabled_override,
            reason: self.reason,
            created_by: self.created_by,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl OverrideRepository for PgPolicyStore {
    async fn overrides_for(&self, tenant: &TenantId, org: Option<&OrgId>) -> Result<Vec<Override>, sqlx::Error> {
        let records: Vec<OverrideRecord> = sqlx::query_as(
            "SELECT policy_id, scope, scope_id, action_override, enabled_override, reason, \
             created_by, created_at FROM policy_overrides WHERE scope_id = $1 OR scope_id = $2",
        )
        .bind(tenant.as_str())
        .bind(org.map(|o| o.as_str()).unwrap_or(""))
        .fetch_all(self.pool.raw())
        .await?;
        Ok(records.into_iter().filter_map(OverrideRecord::into_override).collect())
    }
}

/// Inserts (or updates) a policy row -- used by the admin/override write
/// path, not by the engine's read path.
pub async fn upsert_static_policy(
    pool: &StoragePool,
    policy: &StaticPolicy,
    tenant_id: Option<&str>,
    org_id: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO policies (policy_id, kind, tier, category, name, description, pattern, \
         severity, action, priority, enabled, tenant_id, org_id) \
         VALUES ($1, 'static', $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
         ON CONFLICT (policy_id) DO UPDATE SET \
         tier = EXCLUDED.tier, category = EXCLUDED.category, name = EXCLUDED.name, \
         description = EXCLUDED.description, pattern = EXCLUDED.pattern, \
         severity = EXCLUDED.severity, action = EXCLUDED.action, priority = EXCLUDED.priority, \
         enabled = EXCLUDED.enabled, updated_at = now()",
    )
    .bind(&policy.id)
    .bind(encode(&policy.tier))
    .bind(encode(&policy.category))
    .bind(&policy.name)
    .bind(&policy.description)
    .bind(&policy.pattern)
    .bind(encode(&policy.severity))
    .bind(encode(&policy.action))
    .bind(policy.priority)
    .bind(policy.enabled)
    .bind(tenant_id)
    .bind(org_id)
    .execute(pool.raw())
    .await?;
    Ok(())
}

/// Inserts (or updates) a dynamic policy row, mirroring
/// `upsert_static_policy` for the conditions/actions columns.
pub async fn upsert_dynamic_policy(pool: &StoragePool, policy: &DynamicPolicy) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO policies (policy_id, kind, tier, category, name, description, policy_type, \
         conditions_json, actions_json, priority, enabled) \
         VALUES ($1, 'dynamic', $2, $3, $4, '', $5, $6, $7, $8, $9) \
         ON CONFLICT (policy_id) DO UPDATE SET \
         tier = EXCLUDED.tier, category = EXCLUDED.category, name = EXCLUDED.name, \
         policy_type = EXCLUDED.policy_type, conditions_json = EXCLUDED.conditions_json, \
         actions_json = EXCLUDED.actions_json, priority = EXCLUDED.priority, \
         enabled = EXCLUDED.enabled, updated_at = now()",
    )
    .bind(&policy.id)
    .bind(encode(&policy.tier))
    .bind(encode(&policy.category))
    .bind(&policy.name)
    .bind(&policy.policy_type)
    .bind(serde_json::to_value(&policy.conditions).expect("conditions always serialize"))
    .bind(serde_json::to_value(&policy.actions).expect("actions always serialize"))
    .bind(policy.priority)
    .bind(policy.enabled)
    .execute(pool.raw())
    .await?;
    Ok(())
}

/// Seeds (or refreshes) the system-tier catalog into the row store.
/// Idempotent -- safe to call on every server startup so a fresh
/// community install never needs a separate migration step for the
/// built-in policies (spec.md §4.2).
pub async fn seed_system_catalog(pool: &StoragePool) -> Result<(), sqlx::Error> {
    for policy in axonflow_policy::catalog::SYSTEM_STATIC_POLICIES.iter() {
        upsert_static_policy(pool, policy, None, None).await?;
    }
    for policy in axonflow_policy::catalog::SYSTEM_DYNAMIC_POLICIES.iter() {
        upsert_dynamic_policy(pool, policy).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trips_for_every_tier() {
        for tier in [Tier::System, Tier::Organization, Tier::Tenant] {
            let encoded = encode(&tier);
            let decoded: Tier = decode(&encoded).unwrap();
            assert_eq!(decoded, tier);
        }
    }

    #[test]
    fn encode_decode_round_trips_for_every_category() {
        for category in [Category::SecuritySqli, Category::PiiIndia, Category::DynamicCost] {
            let encoded = encode(&category);
            let decoded: Category = decode(&encoded).unwrap();
            assert_eq!(decoded, category);
        }
    }
}
