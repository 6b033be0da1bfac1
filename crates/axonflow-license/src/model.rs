//! The V2 license payload and validation result shapes (spec.md "License
//! key format", §4.4).

use serde::{Deserialize, Serialize};

/// License tier, lowest to highest privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    #[serde(rename = "Community")]
    Community,
    #[serde(rename = "PLUS")]
    Plus,
    #[serde(rename = "PRO")]
    Pro,
    #[serde(rename = "ENT")]
    Enterprise,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Community => "Community",
            Self::Plus => "PLUS",
            Self::Pro => "PRO",
            Self::Enterprise => "ENT",
        }
    }
}

/// `LicensePayload` per spec.md: the JSON object carried, base64url
/// encoded, inside the license key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicensePayload {
    pub tier: Tier,
    pub tenant_id: String,
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    /// `YYYYMMDD`.
    pub expires_at: String,
}

/// `ValidationResult` returned by `validate_license`. Always produced --
/// the community build never refuses to run on a bad signature, it just
/// downgrades (spec.md "License" glossary entry).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub tier: Tier,
    pub tenant_id: String,
    pub expires_at: chrono::NaiveDate,
    /// Feature map derived from tier, e.g. `{"unlimited_nodes": true}` for
    /// a downgraded community license.
    pub features: std::collections::HashMap<String, bool>,
    pub service_name: Option<String>,
    pub service_type: Option<String>,
    pub permissions: Vec<String>,
}

impl ValidationResult {
    pub fn is_service_identity(&self) -> bool {
        self.service_name.as_deref().is_some_and(|s| !s.is_empty())
    }

    pub fn is_expired(&self, today: chrono::NaiveDate) -> bool {
        today > self.expires_at
    }
}
