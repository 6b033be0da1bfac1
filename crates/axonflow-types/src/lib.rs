//! AxonFlow: shared identity, request and error types.
//!
//! Every other crate in the workspace depends on this one. It carries no
//! business logic of its own -- just the vocabulary the rest of the
//! gateway is built from.

pub mod deployment;
pub mod error;
pub mod ids;
pub mod request;
pub mod severity;

pub use deployment::{DeploymentMode, Environment};
pub use error::AxonError;
pub use ids::{ClientId, OrgId, RequestId, TenantId};
pub use request::{Request, RequestType};
pub use severity::Severity;
