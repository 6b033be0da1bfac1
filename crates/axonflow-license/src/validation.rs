//! `ValidateLicense` (spec.md §4.4): parse the `AXON-V2-{payload}-{sig}`
//! shape, verify the HMAC, and never abort -- a malformed or
//! unverifiable key downgrades to Community tier rather than failing
//! the caller.

use crate::model::{LicensePayload, Tier, ValidationResult};
use axonflow_types::{AxonError, DeploymentMode};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::NaiveDate;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::HashMap;

type HmacSha256 = Hmac<Sha256>;

const KEY_PREFIX: &str = "AXON-V2-";
/// Fixed shared secret the community build signs/verifies against. A
/// real enterprise deployment rotates this via `AXONFLOW_LICENSE_SECRET`;
/// the constant here is the documented community default.
const COMMUNITY_SHARED_SECRET: &[u8] = b"axonflow-community-shared-secret-v2";
const SIG_HEX_LEN: usize = 8;

/// `2999-12-31`: the far-future expiry a downgraded community license
/// carries so "unlimited nodes" checks never trip on it.
fn far_future_expiry() -> NaiveDate {
    NaiveDate::from_ymd_opt(2999, 12, 31).expect("valid constant date")
}

fn community_downgrade(tenant_id: &str) -> ValidationResult {
    let mut features = HashMap::new();
    features.insert("unlimited_nodes".to_string(), true);
    ValidationResult {
        valid: true,
        tier: Tier::Community,
        tenant_id: tenant_id.to_string(),
        expires_at: far_future_expiry(),
        features,
        service_name: None,
        service_type: None,
        permissions: Vec::new(),
    }
}

fn features_for_tier(tier: Tier) -> HashMap<String, bool> {
    let mut features = HashMap::new();
    match tier {
        Tier::Community => {
            features.insert("unlimited_nodes".to_string(), true);
        }
        Tier::Plus | Tier::Pro | Tier::Enterprise => {
            features.insert("node_enforcement".to_string(), true);
            features.insert("overrides".to_string(), tier >= Tier::Pro);
        }
    }
    features
}

/// Parses `AXON-V2-{payload}-{sig}`, verifies the HMAC over the payload's
/// base64 string (constant-time compare on the first 8 hex chars), and
/// returns the decoded license. In the community build this never
/// errors -- any failure downgrades to an anonymous Community-tier
/// result, logged at `info` (spec.md §7: `LicenseInvalid` is demoted to
/// an info-level downgrade in community mode, surfaced as an error in
/// enterprise mode).
pub fn validate_license(key: &str, mode: DeploymentMode) -> Result<ValidationResult, AxonError> {
    match try_validate(key) {
        Ok(result) => Ok(result),
        Err(reason) => {
            if mode.is_community() {
                tracing::info!(reason = %reason, "license invalid, downgrading to community");
                Ok(community_downgrade("community"))
            } else {
                Err(AxonError::LicenseInvalid { reason: reason.to_string() })
            }
        }
    }
}

fn try_validate(key: &str) -> Result<ValidationResult, &'static str> {
    let body = key.strip_prefix(KEY_PREFIX).ok_or("missing AXON-V2- prefix")?;
    let (payload_b64, sig) = body.rsplit_once('-').ok_or("missing signature segment")?;
    if payload_b64.is_empty() || sig.is_empty() {
        return Err("empty payload or signature");
    }

    verify_signature(payload_b64, sig)?;

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| "payload is not valid base64url")?;
    let payload: LicensePayload =
        serde_json::from_slice(&payload_bytes).map_err(|_| "payload is not valid JSON")?;

    let expires_at = NaiveDate::parse_from_str(&payload.expires_at, "%Y%m%d")
        .map_err(|_| "expires_at is not YYYYMMDD")?;

    let result = ValidationResult {
        valid: true,
        features: features_for_tier(payload.tier),
        tier: payload.tier,
        tenant_id: payload.tenant_id,
        expires_at,
        service_name: payload.service_name,
        service_type: payload.service_type,
        permissions: payload.permissions,
    };

    if result.is_expired(chrono::Utc::now().date_naive()) {
        return Err("license expired");
    }

    Ok(result)
}

fn verify_signature(payload_b64: &str, sig: &str) -> Result<(), &'static str> {
    if sig.len() < SIG_HEX_LEN {
        return Err("signature too short");
    }
    let mut mac = HmacSha256::new_from_slice(COMMUNITY_SHARED_SECRET).expect("hmac accepts any key length");
    mac.update(payload_b64.as_bytes());
    let computed = mac.finalize().into_bytes();
    let computed_hex = hex_encode(&computed[..4]);
    let given_hex = &sig[..SIG_HEX_LEN.min(sig.len())];

    if constant_time_eq(computed_hex.as_bytes(), given_hex.as_bytes()) {
        Ok(())
    } else {
        Err("signature mismatch")
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        write!(out, "{:02x}", b).expect("writing to a String never fails");
    }
    out
}

/// Constant-time byte comparison, independent of where the first
/// mismatch falls.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Encodes a `LicensePayload` back into an `AXON-V2-{payload}-{sig}` key.
/// Used by tests and by the (community-stubbed) license generator hook.
pub fn encode_license(payload: &LicensePayload) -> String {
    let payload_json = serde_json::to_vec(payload).expect("LicensePayload always serializes");
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload_json);
    let mut mac = HmacSha256::new_from_slice(COMMUNITY_SHARED_SECRET).expect("hmac accepts any key length");
    mac.update(payload_b64.as_bytes());
    let sig = hex_encode(&mac.finalize().into_bytes());
    format!("{KEY_PREFIX}{payload_b64}-{sig}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payload(tier: Tier, tenant_id: &str, days_from_epoch: &str) -> LicensePayload {
        LicensePayload {
            tier,
            tenant_id: tenant_id.to_string(),
            service_name: None,
            service_type: None,
            permissions: Vec::new(),
            expires_at: days_from_epoch.to_string(),
        }
    }

    #[test]
    fn round_trip_license_preserves_tier_and_tenant() {
        // invariant: S6-adjacent round-trip property (spec.md §8 item 6).
        for (tier, tenant) in [
            (Tier::Pro, "acme"),
            (Tier::Enterprise, "globex"),
            (Tier::Plus, "initech"),
            (Tier::Community, "hooli"),
        ] {
            let payload = sample_payload(tier, tenant, "20991231");
            let key = encode_license(&payload);
            let result = validate_license(&key, DeploymentMode::Community).unwrap();
            assert!(result.valid);
            assert_eq!(result.tier, tier);
            assert_eq!(result.tenant_id, tenant);
        }
    }

    #[test]
    fn malformed_key_downgrades_to_community_never_aborts() {
        let result = validate_license("not-a-license-key", DeploymentMode::Community).unwrap();
        assert!(result.valid);
        assert_eq!(result.tier, Tier::Community);
        assert_eq!(result.features.get("unlimited_nodes"), Some(&true));
    }

    #[test]
    fn malformed_key_is_an_error_in_enterprise_mode() {
        let result = validate_license("not-a-license-key", DeploymentMode::Enterprise);
        assert!(matches!(result, Err(AxonError::LicenseInvalid { .. })));
    }

    #[test]
    fn tampered_payload_downgrades() {
        let payload = sample_payload(Tier::Enterprise, "acme", "20991231");
        let key = encode_license(&payload);
        let body = key.strip_prefix(KEY_PREFIX).unwrap();
        let (payload_b64, sig) = body.rsplit_once('-').unwrap();
        // flip the last char of the payload without recomputing the signature
        let mut chars: Vec<char> = payload_b64.chars().collect();
        let last = chars.len() - 1;
        chars[last] = if chars[last] == 'A' { 'B' } else { 'A' };
        let tampered_payload: String = chars.into_iter().collect();
        let tampered = format!("{KEY_PREFIX}{tampered_payload}-{sig}");

        let result = validate_license(&tampered, DeploymentMode::Community).unwrap();
        assert_eq!(result.tier, Tier::Community);
    }

    #[test]
    fn service_identity_round_trips() {
        let payload = LicensePayload {
            tier: Tier::Pro,
            tenant_id: "acme".into(),
            service_name: Some("amadeus-bridge".into()),
            service_type: Some("mcp-connector".into()),
            permissions: vec!["mcp:amadeus:search_flights".into()],
            expires_at: "20991231".into(),
        };
        let key = encode_license(&payload);
        let result = validate_license(&key, DeploymentMode::Community).unwrap();
        assert!(result.is_service_identity());
        assert_eq!(result.permissions, vec!["mcp:amadeus:search_flights".to_string()]);
    }

    #[test]
    fn empty_key_downgrades() {
        let result = validate_license("", DeploymentMode::Community).unwrap();
        assert_eq!(result.tier, Tier::Community);
    }

    #[test]
    fn expired_enterprise_license_surfaces_as_invalid() {
        let payload = sample_payload(Tier::Enterprise, "acme", "20200101");
        let key = encode_license(&payload);
        let result = validate_license(&key, DeploymentMode::Enterprise);
        assert!(matches!(result, Err(AxonError::LicenseInvalid { .. })));
    }

    #[test]
    fn expired_license_downgrades_to_community() {
        let payload = sample_payload(Tier::Enterprise, "acme", "20200101");
        let key = encode_license(&payload);
        let result = validate_license(&key, DeploymentMode::Community).unwrap();
        assert_eq!(result.tier, Tier::Community);
        assert_eq!(result.features.get("unlimited_nodes"), Some(&true));
    }
}
