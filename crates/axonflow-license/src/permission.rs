//! `EvaluateMCPPermission` and `ValidatePermissionFormat` (spec.md §4.4).

use crate::model::ValidationResult;

/// `mcp:CONN:OP` wildcard precedence, checked in this order, first match
/// wins: exact, connector wildcard, resource wildcard, global wildcard.
/// Defaults to deny.
pub fn evaluate_mcp_permission(
    validation: Option<&ValidationResult>,
    connector: &str,
    operation: &str,
) -> Result<bool, String> {
    let validation = validation.filter(|v| v.valid).ok_or_else(|| "license is missing or invalid".to_string())?;

    if connector.is_empty() || operation.is_empty() {
        return Err("connector and operation must not be empty".to_string());
    }

    if !validation.is_service_identity() {
        return Err("license has no service identity; connector access denied".to_string());
    }

    let exact = format!("mcp:{connector}:{operation}");
    let connector_wildcard = format!("mcp:{connector}:*");
    let resource_wildcard = "mcp:*";
    let global_wildcard = "*";

    let allowed = validation.permissions.iter().any(|p| {
        p == &exact || p == &connector_wildcard || p == resource_wildcard || p == global_wildcard
    });

    if allowed {
        Ok(true)
    } else {
        Err(format!("permission denied: no grant covers {exact}"))
    }
}

/// `ValidatePermissionFormat`: rejects empty strings, strings without at
/// least two colons (except the special forms `*` and `mcp:*`), strings
/// starting/ending with a colon, and strings with consecutive colons.
pub fn validate_permission_format(permission: &str) -> bool {
    if permission.is_empty() {
        return false;
    }
    if permission == "*" || permission == "mcp:*" {
        return true;
    }
    if permission.starts_with(':') || permission.ends_with(':') {
        return false;
    }
    if permission.contains("::") {
        return false;
    }
    permission.matches(':').count() >= 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Tier;
    use chrono::NaiveDate;

    fn validation_with(permissions: Vec<&str>, service_name: Option<&str>) -> ValidationResult {
        ValidationResult {
            valid: true,
            tier: Tier::Pro,
            tenant_id: "acme".into(),
            expires_at: NaiveDate::from_ymd_opt(2099, 12, 31).unwrap(),
            features: Default::default(),
            service_name: service_name.map(String::from),
            service_type: Some("mcp-connector".into()),
            permissions: permissions.into_iter().map(String::from).collect(),
        }
    }

    #[test]
    fn exact_permission_allows() {
        // S5 permission-exact (spec.md §8).
        let v = validation_with(vec!["mcp:amadeus:search_flights"], Some("amadeus-bridge"));
        assert_eq!(evaluate_mcp_permission(Some(&v), "amadeus", "search_flights"), Ok(true));
    }

    #[test]
    fn non_granted_operation_denies_with_message() {
        let v = validation_with(vec!["mcp:amadeus:search_flights"], Some("amadeus-bridge"));
        let result = evaluate_mcp_permission(Some(&v), "amadeus", "search_hotels");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("permission denied"));
    }

    #[test]
    fn connector_wildcard_allows_any_operation() {
        let v = validation_with(vec!["mcp:amadeus:*"], Some("amadeus-bridge"));
        assert_eq!(evaluate_mcp_permission(Some(&v), "amadeus", "search_hotels"), Ok(true));
    }

    #[test]
    fn global_wildcard_allows_everything() {
        let v = validation_with(vec!["*"], Some("root-service"));
        assert_eq!(evaluate_mcp_permission(Some(&v), "any-connector", "any-op"), Ok(true));
    }

    #[test]
    fn non_service_license_is_rejected() {
        let v = validation_with(vec!["mcp:*"], None);
        assert!(evaluate_mcp_permission(Some(&v), "amadeus", "search_flights").is_err());
    }

    #[test]
    fn missing_validation_is_rejected() {
        assert!(evaluate_mcp_permission(None, "amadeus", "search_flights").is_err());
    }

    #[test]
    fn empty_connector_or_operation_is_rejected() {
        let v = validation_with(vec!["*"], Some("svc"));
        assert!(evaluate_mcp_permission(Some(&v), "", "search_flights").is_err());
        assert!(evaluate_mcp_permission(Some(&v), "amadeus", "").is_err());
    }

    #[test]
    fn global_wildcard_implies_every_specific_grant_invariant_7() {
        // invariant 7: granting mcp:* implies every specific mcp:X:Y passes.
        let v = validation_with(vec!["mcp:*"], Some("root-service"));
        for (connector, op) in [("amadeus", "search_flights"), ("postgres", "query"), ("cassandra", "execute")] {
            assert_eq!(evaluate_mcp_permission(Some(&v), connector, op), Ok(true));
        }
    }

    #[test]
    fn permission_format_validation() {
        assert!(validate_permission_format("mcp:amadeus:search_flights"));
        assert!(validate_permission_format("*"));
        assert!(validate_permission_format("mcp:*"));
        assert!(!validate_permission_format(""));
        assert!(!validate_permission_format("mcp:amadeus"));
        assert!(!validate_permission_format(":mcp:amadeus:search"));
        assert!(!validate_permission_format("mcp:amadeus:search:"));
        assert!(!validate_permission_format("mcp::search_flights"));
    }
}
