//! Deployment/tenancy config and the self-hosted dev shortcut
//! (spec.md §4.3 step 1, §6, §9). Read directly from environment
//! variables, the way the teacher's `ee/multitenancy` license lookup
//! reads `AGENTKERN_LICENSE_KEY` without a config-file crate.

use axonflow_types::{DeploymentMode, Environment};

/// The exact string `SELF_HOSTED_MODE_ACKNOWLEDGED` must equal to
/// activate the dev shortcut. Not a secret -- a deliberate speed bump
/// against accidentally running it in the wrong environment.
pub const SELF_HOSTED_ACK_STRING: &str = "I_UNDERSTAND_THIS_BYPASSES_AUTHENTICATION";

/// Timeouts and retry budget for outbound I/O (spec.md §5).
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    pub connector_timeout: std::time::Duration,
    pub llm_timeout: std::time::Duration,
    pub max_retries: u32,
    pub context_ttl: chrono::Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            connector_timeout: std::time::Duration::from_secs(30),
            llm_timeout: std::time::Duration::from_secs(60),
            max_retries: 3,
            context_ttl: chrono::Duration::minutes(10),
        }
    }
}

/// Deployment/tenancy config resolved once at startup (spec.md §6
/// "Environment variables").
#[derive(Debug, Clone)]
pub struct DeploymentConfig {
    pub mode: DeploymentMode,
    pub environment: Environment,
    pub self_hosted_requested: bool,
    pub self_hosted_acknowledged: bool,
}

impl DeploymentConfig {
    pub fn from_env() -> Self {
        Self {
            mode: std::env::var("DEPLOYMENT_MODE")
                .map(|v| DeploymentMode::from_env_str(&v))
                .unwrap_or(DeploymentMode::Community),
            environment: std::env::var("ENVIRONMENT")
                .map(|v| Environment::from_env_str(&v))
                .unwrap_or(Environment::Other),
            self_hosted_requested: std::env::var("SELF_HOSTED_MODE")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            self_hosted_acknowledged: std::env::var("SELF_HOSTED_MODE_ACKNOWLEDGED")
                .map(|v| v == SELF_HOSTED_ACK_STRING)
                .unwrap_or(false),
        }
    }

    /// Whether the dev-admin shortcut is active for this process
    /// (spec.md §9: "must refuse to activate when the environment tag
    /// names production, and must require an explicit acknowledgment
    /// string. This is a security decision, not a convenience.").
    pub fn self_hosted_shortcut_active(&self) -> bool {
        self.self_hosted_requested && self.self_hosted_acknowledged && !self.environment.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(requested: bool, acknowledged: bool, production: bool) -> DeploymentConfig {
        DeploymentConfig {
            mode: DeploymentMode::Community,
            environment: if production { Environment::Production } else { Environment::Other },
            self_hosted_requested: requested,
            self_hosted_acknowledged: acknowledged,
        }
    }

    #[test]
    fn shortcut_requires_both_flags_and_non_production() {
        assert!(config(true, true, false).self_hosted_shortcut_active());
        assert!(!config(true, false, false).self_hosted_shortcut_active());
        assert!(!config(false, true, false).self_hosted_shortcut_active());
    }

    #[test]
    fn shortcut_refuses_production_even_with_both_flags() {
        assert!(!config(true, true, true).self_hosted_shortcut_active());
    }
}
