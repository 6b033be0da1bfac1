//! AxonFlow-Gateway: the request pipeline (spec.md §4.3) and the
//! deployment/tenancy configuration that gates its dev shortcut. This
//! is the only crate in the workspace permitted to depend on every
//! capability crate (policy, license, connectors, llm, usage, storage)
//! -- it's the orchestration root, matching spec.md §2's "the pipeline
//! is the only component permitted to orchestrate across the other
//! layers."

pub mod config;
pub mod context;
pub mod pipeline;
pub mod sql_extract;

pub use config::{DeploymentConfig, PipelineConfig, SELF_HOSTED_ACK_STRING};
pub use context::{ApprovedContext, ContextStore, VerifiedContext};
pub use pipeline::{CodeArtifactInfo, ExecuteResponse, Gateway, PolicyInfo};
pub use sql_extract::extract_sql_block;
