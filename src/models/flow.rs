//! Approval flow metadata consumed from the stamp-hub catalog.

use serde::{Deserialize, Serialize};

use super::approval_request::ApproverType;
use super::param::ParamDefinition;

/// A catalog-registered approval flow: which inputs a request needs, who
/// reviews it, and whether an approved request may later be revoked.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalFlow {
    pub catalog_id: String,
    pub approval_flow_id: String,
    pub name: String,
    pub approver_id: String,
    pub approver_type: ApproverType,
    #[serde(default)]
    pub input_params: Vec<ParamDefinition>,
    /// Resource types the requester must select a resource for.
    #[serde(default)]
    pub required_resource_types: Vec<String>,
    #[serde(default)]
    pub enable_revoke: bool,
}

/// Inclusive `requestDate` range filter passed through unchanged on every
/// page of a listing accumulation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: chrono::DateTime<chrono::Utc>,
    pub end: chrono::DateTime<chrono::Utc>,
}
