//! The policy data model (spec.md §3).

use axonflow_types::Severity;
use serde::{Deserialize, Serialize};

/// Policy origin tier. Lower-numbered tiers win ties -- `system` first,
/// `tenant` last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    System,
    Organization,
    Tenant,
}

impl Tier {
    /// `tier_rank(system)=0, organization=1, tenant=2`, used to sort the
    /// effective policy set.
    pub fn rank(&self) -> u8 {
        match self {
            Self::System => 0,
            Self::Organization => 1,
            Self::Tenant => 2,
        }
    }

    /// Whether `self` is strictly higher-tier than `scope`, i.e. whether
    /// an override with this scope is even eligible to touch a policy of
    /// this tier (spec.md §3: "Applies only to policies of a higher tier
    /// than the override's scope").
    pub fn outranks(&self, scope: Tier) -> bool {
        self.rank() < scope.rank()
    }
}

/// Closed set of policy categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    SecuritySqli,
    SecurityAdmin,
    PiiGlobal,
    PiiUs,
    PiiEu,
    PiiIndia,
    CodeSecrets,
    CodeUnsafe,
    DynamicRisk,
    DynamicCompliance,
    DynamicSecurity,
    DynamicCost,
    DynamicAccess,
}

/// Closed set of static-policy actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Block,
    Warn,
    Log,
    Redact,
    Alert,
}

impl Action {
    pub fn is_blocking(&self) -> bool {
        matches!(self, Action::Block)
    }
}

/// `StaticPolicy` per spec.md §3: `id` unique and stable, `pattern` must
/// compile, `tier=system` implies immutable by tenant/organization
/// writers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticPolicy {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub tier: Tier,
    pub pattern: String,
    pub severity: Severity,
    pub action: Action,
    pub priority: i32,
    pub enabled: bool,
}

/// Comparison operator for a `DynamicPolicy` condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    NotEquals,
    GreaterThan,
    Contains,
    ContainsAny,
    In,
    Regex,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DynamicActionType {
    Block,
    Alert,
    Redact,
    Log,
    ModifyRisk,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicAction {
    #[serde(rename = "type")]
    pub action_type: DynamicActionType,
    #[serde(default)]
    pub config: serde_json::Value,
}

/// `DynamicPolicy` per spec.md §3: ordered conditions, ordered actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicPolicy {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub tier: Tier,
    pub policy_type: String,
    pub conditions: Vec<Condition>,
    pub actions: Vec<DynamicAction>,
    pub priority: i32,
    pub enabled: bool,
}

/// Either kind of policy, unified for sorting/matching purposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum PolicyKind {
    Static(StaticPolicy),
    Dynamic(DynamicPolicy),
}

impl PolicyKind {
    pub fn id(&self) -> &str {
        match self {
            Self::Static(p) => &p.id,
            Self::Dynamic(p) => &p.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Static(p) => &p.name,
            Self::Dynamic(p) => &p.name,
        }
    }

    pub fn tier(&self) -> Tier {
        match self {
            Self::Static(p) => p.tier,
            Self::Dynamic(p) => p.tier,
        }
    }

    pub fn priority(&self) -> i32 {
        match self {
            Self::Static(p) => p.priority,
            Self::Dynamic(p) => p.priority,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Self::Static(p) => p.category,
            Self::Dynamic(p) => p.category,
        }
    }

    pub fn base_enabled(&self) -> bool {
        match self {
            Self::Static(p) => p.enabled,
            Self::Dynamic(p) => p.enabled,
        }
    }

    /// The base action as a spec.md §3 `Action`, for static policies.
    /// Dynamic policies carry a richer ordered action list instead; the
    /// first blocking action (if any) is surfaced here so dynamic and
    /// static policies can share the `EffectivePolicy::effective_action`
    /// contract.
    pub fn base_action(&self) -> Action {
        match self {
            Self::Static(p) => p.action,
            Self::Dynamic(p) => {
                if p.actions.iter().any(|a| a.action_type == DynamicActionType::Block) {
                    Action::Block
                } else if p.actions.iter().any(|a| a.action_type == DynamicActionType::Alert) {
                    Action::Alert
                } else if p.actions.iter().any(|a| a.action_type == DynamicActionType::Redact) {
                    Action::Redact
                } else {
                    Action::Log
                }
            }
        }
    }
}

/// Which scope an override applies at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverrideScope {
    Org,
    Tenant,
}

impl OverrideScope {
    /// The tier an override of this scope is writing at, for the
    /// `Tier::outranks` eligibility check.
    pub fn as_tier(&self) -> Tier {
        match self {
            Self::Org => Tier::Organization,
            Self::Tenant => Tier::Tenant,
        }
    }
}

/// `Override` per spec.md §3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Override {
    pub policy_id: String,
    pub scope: OverrideScope,
    pub scope_id: String,
    pub action_override: Option<Action>,
    pub enabled_override: Option<bool>,
    pub reason: String,
    pub created_by: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// The resolved record returned by the engine: base policy plus any
/// applicable override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectivePolicy {
    pub policy: PolicyKind,
    pub has_override: bool,
    pub override_reason: Option<String>,
    base_action: Action,
    base_enabled: bool,
}

impl EffectivePolicy {
    pub fn new(policy: PolicyKind, applied: Option<&Override>) -> Self {
        let base_action = policy.base_action();
        let base_enabled = policy.base_enabled();
        match applied {
            Some(ov) => Self {
                base_action: ov.action_override.unwrap_or(base_action),
                base_enabled: ov.enabled_override.unwrap_or(base_enabled),
                override_reason: Some(ov.reason.clone()),
                has_override: true,
                policy,
            },
            None => Self {
                base_action,
                base_enabled,
                override_reason: None,
                has_override: false,
                policy,
            },
        }
    }

    /// `effective_action = override.action_override ?? base.action`.
    pub fn effective_action(&self) -> Action {
        self.base_action
    }

    /// `effective_enabled = override.enabled_override ?? base.enabled`.
    pub fn effective_enabled(&self) -> bool {
        self.base_enabled
    }

    pub fn id(&self) -> &str {
        self.policy.id()
    }

    pub fn name(&self) -> &str {
        self.policy.name()
    }

    pub fn tier(&self) -> Tier {
        self.policy.tier()
    }

    pub fn priority(&self) -> i32 {
        self.policy.priority()
    }

    pub fn category(&self) -> Category {
        self.policy.category()
    }

    /// The regex pattern to match against input, for static policies.
    /// Dynamic policies have no single pattern -- they're matched by the
    /// DSL condition evaluator instead.
    pub fn pattern(&self) -> Option<&str> {
        match &self.policy {
            PolicyKind::Static(p) => Some(&p.pattern),
            PolicyKind::Dynamic(_) => None,
        }
    }

    pub fn severity(&self) -> Severity {
        match &self.policy {
            PolicyKind::Static(p) => p.severity,
            PolicyKind::Dynamic(_) => Severity::Medium,
        }
    }
}

/// Applies an override to a policy, honoring tier eligibility: an
/// override only applies to a policy of a strictly higher tier than its
/// own scope (spec.md §3).
pub fn applicable_override<'a>(policy: &PolicyKind, overrides: &'a [Override]) -> Option<&'a Override> {
    overrides.iter().find(|ov| {
        ov.policy_id == policy.id() && policy.tier().outranks(ov.scope.as_tier())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_static(tier: Tier, action: Action, enabled: bool) -> PolicyKind {
        PolicyKind::Static(StaticPolicy {
            id: "sys_pii_email".into(),
            name: "Email PII".into(),
            description: "detects emails".into(),
            category: Category::PiiGlobal,
            tier,
            pattern: r"[\w.+-]+@[\w-]+\.[\w.-]+".into(),
            severity: Severity::Medium,
            action,
            priority: 10,
            enabled,
        })
    }

    #[test]
    fn tier_rank_order() {
        assert!(Tier::System.rank() < Tier::Organization.rank());
        assert!(Tier::Organization.rank() < Tier::Tenant.rank());
    }

    #[test]
    fn tenant_override_outranks_system_policy() {
        assert!(Tier::System.outranks(Tier::Tenant));
        assert!(!Tier::Tenant.outranks(Tier::System));
    }

    #[test]
    fn override_action_precedence() {
        // invariant 3: an active override's action_override wins
        // regardless of the base action.
        let policy = sample_static(Tier::System, Action::Log, true);
        let ov = Override {
            policy_id: "sys_pii_email".into(),
            scope: OverrideScope::Tenant,
            scope_id: "acme".into(),
            action_override: Some(Action::Block),
            enabled_override: None,
            reason: "tenant wants emails blocked".into(),
            created_by: "admin".into(),
            created_at: Utc::now(),
        };
        let applied = applicable_override(&policy, std::slice::from_ref(&ov));
        assert!(applied.is_some());
        let eff = EffectivePolicy::new(policy, applied);
        assert!(eff.has_override);
        assert_eq!(eff.effective_action(), Action::Block);
    }

    #[test]
    fn override_does_not_apply_to_lower_or_equal_tier() {
        // A tenant-scope override can't touch a tenant-tier policy.
        let policy = sample_static(Tier::Tenant, Action::Log, true);
        let ov = Override {
            policy_id: "sys_pii_email".into(),
            scope: OverrideScope::Tenant,
            scope_id: "acme".into(),
            action_override: Some(Action::Block),
            enabled_override: None,
            reason: "irrelevant".into(),
            created_by: "admin".into(),
            created_at: Utc::now(),
        };
        assert!(applicable_override(&policy, std::slice::from_ref(&ov)).is_none());
    }

    #[test]
    fn no_override_keeps_base() {
        let policy = sample_static(Tier::System, Action::Warn, true);
        let eff = EffectivePolicy::new(policy, None);
        assert!(!eff.has_override);
        assert_eq!(eff.effective_action(), Action::Warn);
        assert!(eff.effective_enabled());
    }
}
