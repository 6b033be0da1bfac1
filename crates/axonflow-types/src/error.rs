//! Error taxonomy (spec.md §7).
//!
//! The core distinguishes exactly these kinds. Everything surfaced to a
//! transport layer goes through `AxonError` so the HTTP edge can map it
//! to `{request_id, success:false, error, message}` uniformly.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AxonError {
    /// A request was denied by a matching policy. Not retried.
    #[error("blocked by policy {policy_name} ({policy_id}): {description}")]
    PolicyBlock {
        policy_id: String,
        policy_name: String,
        severity: crate::severity::Severity,
        action: String,
        description: String,
    },

    /// The caller's license/service identity does not authorize the
    /// requested connector operation. Not retried.
    #[error("permission denied: requires {required_permission}")]
    PermissionDenied {
        required_permission: String,
        current_grants: Vec<String>,
    },

    /// A malformed/expired/unsigned license, in enterprise mode. In
    /// community mode this is demoted to an info-level downgrade instead
    /// of being surfaced as this variant.
    #[error("license invalid: {reason}")]
    LicenseInvalid { reason: String },

    /// A connector backend call failed. Transient sub-kinds are retried
    /// by the pipeline up to `MaxRetries` with exponential backoff.
    #[error("connector error: {connector} {operation}: {message}")]
    ConnectorError {
        connector: String,
        operation: String,
        message: String,
        transient: bool,
    },

    /// The LLM provider is unreachable or rejected the request.
    #[error("provider unavailable: {provider}")]
    ProviderUnavailable { provider: String, reason: String },

    /// Malformed input: missing tenant, empty query, bad request_type.
    /// Surfaces as a `400`-equivalent; never retried.
    #[error("validation error: {message}")]
    ValidationError { message: String },

    /// Non-recoverable setup problem. Must fail loudly at startup, never
    /// during request handling.
    #[error("config error: {message}")]
    ConfigError { message: String },
}

impl AxonError {
    /// The taxonomy kind as a stable machine-readable string, used as the
    /// `error` field in the HTTP response body.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PolicyBlock { .. } => "policy_block",
            Self::PermissionDenied { .. } => "permission_denied",
            Self::LicenseInvalid { .. } => "license_invalid",
            Self::ConnectorError { .. } => "connector_error",
            Self::ProviderUnavailable { .. } => "provider_unavailable",
            Self::ValidationError { .. } => "validation_error",
            Self::ConfigError { .. } => "config_error",
        }
    }

    /// Whether the pipeline may retry the call that produced this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConnectorError { transient: true, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::Severity;

    #[test]
    fn policy_block_is_not_retryable() {
        let err = AxonError::PolicyBlock {
            policy_id: "p1".into(),
            policy_name: "Stacked DROP Statement".into(),
            severity: Severity::Critical,
            action: "block".into(),
            description: "DROP TABLE detected".into(),
        };
        assert_eq!(err.kind(), "policy_block");
        assert!(!err.is_retryable());
    }

    #[test]
    fn connector_timeout_is_retryable() {
        let err = AxonError::ConnectorError {
            connector: "pg".into(),
            operation: "query".into(),
            message: "timeout".into(),
            transient: true,
        };
        assert!(err.is_retryable());
    }
}
