//! AxonFlow-Policy: the tier-aware policy evaluation engine.
//!
//! Given `(tenant_id, org_id?, input_text, context)` this crate resolves
//! the effective policy set for the tenant (system + organization +
//! tenant, with overrides applied) and matches it against input text,
//! within a single-digit-millisecond budget on cached data (spec.md §4.1).

pub mod cache;
pub mod catalog;
pub mod dsl;
pub mod engine;
pub mod model;
pub mod repository;

pub use cache::{PatternCache, TenantPolicyCache};
pub use engine::{
    AllMatchesResult, EngineError, FirstMatchResult, PolicyEngine, PolicyEngineStats,
    PolicyEngineStatsSnapshot, PolicyMatch,
};
pub use model::{
    Action, Category, DynamicPolicy, EffectivePolicy, Override, OverrideScope, StaticPolicy, Tier,
};
pub use repository::{OverrideRepository, PolicyRepository, PolicyRow};
