//! Deployment-mode and environment parsing, shared by every crate that
//! needs to know whether it's running community or enterprise, dev or
//! production (spec.md "Environment variables").

/// `DEPLOYMENT_MODE`: gates whether usage recording and several modules
/// are no-op stubs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentMode {
    Community,
    Enterprise,
}

impl DeploymentMode {
    pub fn from_env_str(value: &str) -> Self {
        if value.eq_ignore_ascii_case("enterprise") {
            Self::Enterprise
        } else {
            Self::Community
        }
    }

    pub fn is_community(&self) -> bool {
        matches!(self, Self::Community)
    }

    pub fn is_enterprise(&self) -> bool {
        matches!(self, Self::Enterprise)
    }
}

/// `ENVIRONMENT`: case-insensitive; `production`/`prod` disables the
/// self-hosted dev shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Other,
}

impl Environment {
    pub fn from_env_str(value: &str) -> Self {
        let lower = value.to_ascii_lowercase();
        if lower == "production" || lower == "prod" {
            Self::Production
        } else {
            Self::Other
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deployment_mode_defaults_to_community() {
        assert_eq!(DeploymentMode::from_env_str("anything"), DeploymentMode::Community);
        assert_eq!(DeploymentMode::from_env_str("enterprise"), DeploymentMode::Enterprise);
        assert_eq!(DeploymentMode::from_env_str("ENTERPRISE"), DeploymentMode::Enterprise);
    }

    #[test]
    fn environment_matches_production_case_insensitively() {
        assert!(Environment::from_env_str("PRODUCTION").is_production());
        assert!(Environment::from_env_str("prod").is_production());
        assert!(!Environment::from_env_str("staging").is_production());
    }
}
