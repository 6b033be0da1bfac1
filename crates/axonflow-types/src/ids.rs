//! Identity newtypes.
//!
//! Wrapping plain `String`s keeps tenant/org/client ids from being
//! accidentally swapped at call sites -- the compiler catches it.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(TenantId);
string_id!(OrgId);
string_id!(ClientId);

/// A request's unique identifier. Assigned at entry if the caller omits
/// one; it is the only identifier shared between the pipeline and the
/// audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Builds a cache key combining tenant and an optional organization, the
/// way the policy cache and override resolution key their lookups.
pub fn cache_key(tenant: &TenantId, org: Option<&OrgId>) -> String {
    match org {
        Some(org) => format!("{}:{}", tenant.0, org.0),
        None => tenant.0.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_with_org() {
        let t = TenantId::from("acme");
        let o = OrgId::from("corp");
        assert_eq!(cache_key(&t, Some(&o)), "acme:corp");
    }

    #[test]
    fn cache_key_without_org() {
        let t = TenantId::from("acme");
        assert_eq!(cache_key(&t, None), "acme");
    }

    #[test]
    fn request_id_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }
}
