//! Capability traits over the remote stamp-hub service.
//!
//! The lifecycle and query services only ever see these traits, so the core
//! stays store-agnostic: production wires in the reqwest [`client::HubClient`],
//! tests wire in in-memory fakes.

pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::approval_request::{ApprovalRequest, HandlerResult};
use crate::models::flow::{ApprovalFlow, DateRange};
use crate::models::group::{
    ApprovalRequestNotification, Group, GroupMemberNotification, GroupMembership,
    NotificationType,
};
use crate::pagination::Page;

#[derive(Debug, Error)]
pub enum HubError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The hub answered with a non-success status other than 404.
    #[error("hub returned status={status}: {body}")]
    Remote { status: u16, body: String },

    /// The hub could not be reached at all.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Filter fields for the catalog-scoped listing. All fields except the
/// cursor stay unchanged across pages of one accumulation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalFlowListFilter {
    pub catalog_id: String,
    pub approval_flow_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_date: Option<DateRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination_token: Option<String>,
}

/// Filter fields for the requesting-user listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestUserListFilter {
    pub request_user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_date: Option<DateRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination_token: Option<String>,
}

/// Channel config supplied when creating or updating a subscription. The hub
/// assigns the channel id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationChannelInput {
    pub type_id: String,
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// Approval-request persistence, flow lookup, and the flow-defined handler
/// invocations. Handler business failures come back as `Ok(HandlerResult)`
/// with `is_success=false`; only transport/infrastructure problems are `Err`.
#[async_trait]
pub trait ApprovalRequestHub: Send + Sync {
    async fn get_approval_request(&self, request_id: &str) -> Result<ApprovalRequest, HubError>;

    async fn create_approval_request(
        &self,
        request: &ApprovalRequest,
    ) -> Result<ApprovalRequest, HubError>;

    /// Full-record update. The hub enforces the status guard atomically
    /// (conditional write); a lost race surfaces as `Remote`, treated as a
    /// hard failure rather than retried.
    async fn update_approval_request(
        &self,
        request: &ApprovalRequest,
    ) -> Result<ApprovalRequest, HubError>;

    async fn list_by_approval_flow(
        &self,
        filter: &ApprovalFlowListFilter,
    ) -> Result<Page<ApprovalRequest>, HubError>;

    async fn list_by_request_user(
        &self,
        filter: &RequestUserListFilter,
    ) -> Result<Page<ApprovalRequest>, HubError>;

    async fn get_approval_flow(
        &self,
        catalog_id: &str,
        approval_flow_id: &str,
    ) -> Result<ApprovalFlow, HubError>;

    async fn run_validation_handler(
        &self,
        request: &ApprovalRequest,
    ) -> Result<HandlerResult, HubError>;

    async fn run_approved_handler(
        &self,
        request: &ApprovalRequest,
    ) -> Result<HandlerResult, HubError>;

    async fn run_revoked_handler(
        &self,
        request: &ApprovalRequest,
    ) -> Result<HandlerResult, HubError>;
}

/// Groups, memberships, and notification subscriptions.
#[async_trait]
pub trait GroupHub: Send + Sync {
    async fn get_group(&self, group_id: &str) -> Result<Group, HubError>;

    async fn list_groups(
        &self,
        pagination_token: Option<String>,
    ) -> Result<Page<Group>, HubError>;

    async fn list_group_memberships(
        &self,
        group_id: &str,
        pagination_token: Option<String>,
    ) -> Result<Page<GroupMembership>, HubError>;

    async fn create_group_membership(
        &self,
        membership: &GroupMembership,
    ) -> Result<GroupMembership, HubError>;

    async fn delete_group_membership(&self, group_id: &str, user_id: &str)
        -> Result<(), HubError>;

    async fn get_notification_type(&self, type_id: &str) -> Result<NotificationType, HubError>;

    async fn create_group_member_notification(
        &self,
        group_id: &str,
        channel: &NotificationChannelInput,
    ) -> Result<GroupMemberNotification, HubError>;

    async fn update_group_member_notification(
        &self,
        group_id: &str,
        notification_id: &str,
        channel: &NotificationChannelInput,
    ) -> Result<GroupMemberNotification, HubError>;

    async fn delete_group_member_notification(
        &self,
        group_id: &str,
        notification_id: &str,
    ) -> Result<(), HubError>;

    async fn create_approval_request_notification(
        &self,
        group_id: &str,
        channel: &NotificationChannelInput,
    ) -> Result<ApprovalRequestNotification, HubError>;

    async fn update_approval_request_notification(
        &self,
        group_id: &str,
        notification_id: &str,
        channel: &NotificationChannelInput,
    ) -> Result<ApprovalRequestNotification, HubError>;

    async fn delete_approval_request_notification(
        &self,
        group_id: &str,
        notification_id: &str,
    ) -> Result<(), HubError>;
}
