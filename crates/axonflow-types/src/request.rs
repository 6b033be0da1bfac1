//! The inbound request shape shared by every pipeline mode.

use crate::ids::{ClientId, OrgId, RequestId, TenantId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The kind of request being governed. `NaturalLanguage` is re-entered
/// into the pipeline as `Sql` once the LLM has produced a SELECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    Chat,
    Sql,
    McpQuery,
    NaturalLanguage,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Sql => "sql",
            Self::McpQuery => "mcp-query",
            Self::NaturalLanguage => "natural_language",
        }
    }
}

/// `{ request_id, tenant_id, org_id?, user_token, client_id, request_type,
/// query, context }` from spec.md §3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub request_id: RequestId,
    pub tenant_id: TenantId,
    pub org_id: Option<OrgId>,
    pub user_token: String,
    pub client_id: ClientId,
    pub request_type: RequestType,
    pub query: String,
    #[serde(default)]
    pub context: HashMap<String, serde_json::Value>,
}
