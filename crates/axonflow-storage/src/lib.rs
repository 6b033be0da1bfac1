//! AxonFlow-Storage: row-store backed implementations of the repository
//! traits the policy and usage crates define (spec.md §6 "Persisted
//! state layout"). The core never issues ad-hoc SQL against these
//! tables outside `PolicyRepository`, `OverrideRepository`,
//! `UsageRepository` -- this crate is the only place those are
//! implemented against a live `sqlx` pool.

pub mod pool;
pub mod policy_store;
pub mod usage_store;

pub use pool::StoragePool;
pub use policy_store::{seed_system_catalog, upsert_dynamic_policy, upsert_static_policy, PgPolicyStore};
pub use usage_store::PgUsageStore;
