//! reqwest client for the stamp-hub REST API.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use super::{
    ApprovalFlowListFilter, ApprovalRequestHub, GroupHub, HubError, NotificationChannelInput,
    RequestUserListFilter,
};
use crate::models::approval_request::{ApprovalRequest, HandlerResult};
use crate::models::flow::ApprovalFlow;
use crate::models::group::{
    ApprovalRequestNotification, Group, GroupMemberNotification, GroupMembership,
    NotificationType,
};
use crate::pagination::Page;

#[derive(Clone)]
pub struct HubClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HubClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        // Url::join treats a base without a trailing slash as a file path
        // and would drop its last segment.
        let base = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&base)?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> Result<Url, HubError> {
        self.base_url
            .join(path)
            .map_err(|e| HubError::Transport(format!("invalid hub url path '{}': {}", path, e)))
    }

    /// Send a request and decode the JSON body.
    /// 404 becomes the typed NotFound for `entity`/`id`; any other
    /// non-success status is surfaced with its body.
    async fn send<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
        entity: &'static str,
        id: &str,
    ) -> Result<T, HubError> {
        let resp = req
            .send()
            .await
            .map_err(|e| HubError::Transport(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(HubError::NotFound {
                entity,
                id: id.to_string(),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(HubError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<T>()
            .await
            .map_err(|e| HubError::Transport(format!("invalid hub response: {}", e)))
    }

    /// Like [`Self::send`] but discards the response body.
    async fn send_no_body(
        &self,
        req: reqwest::RequestBuilder,
        entity: &'static str,
        id: &str,
    ) -> Result<(), HubError> {
        let resp = req
            .send()
            .await
            .map_err(|e| HubError::Transport(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(HubError::NotFound {
                entity,
                id: id.to_string(),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(HubError::Remote {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        entity: &'static str,
        id: &str,
    ) -> Result<T, HubError> {
        let url = self.url(path)?;
        self.send(self.client.get(url), entity, id).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        entity: &'static str,
        id: &str,
    ) -> Result<T, HubError> {
        let url = self.url(path)?;
        self.send(self.client.post(url).json(body), entity, id).await
    }

    async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        entity: &'static str,
        id: &str,
    ) -> Result<T, HubError> {
        let url = self.url(path)?;
        self.send(self.client.put(url).json(body), entity, id).await
    }

    async fn delete(&self, path: &str, entity: &'static str, id: &str) -> Result<(), HubError> {
        let url = self.url(path)?;
        self.send_no_body(self.client.delete(url), entity, id).await
    }

    fn with_token(path: &str, token: Option<String>) -> String {
        match token {
            Some(t) => format!("{}?paginationToken={}", path, t),
            None => path.to_string(),
        }
    }
}

#[async_trait]
impl ApprovalRequestHub for HubClient {
    async fn get_approval_request(&self, request_id: &str) -> Result<ApprovalRequest, HubError> {
        self.get_json(
            &format!("approval-requests/{}", request_id),
            "approval request",
            request_id,
        )
        .await
    }

    async fn create_approval_request(
        &self,
        request: &ApprovalRequest,
    ) -> Result<ApprovalRequest, HubError> {
        self.post_json("approval-requests", request, "approval request", &request.request_id)
            .await
    }

    async fn update_approval_request(
        &self,
        request: &ApprovalRequest,
    ) -> Result<ApprovalRequest, HubError> {
        self.put_json(
            &format!("approval-requests/{}", request.request_id),
            request,
            "approval request",
            &request.request_id,
        )
        .await
    }

    async fn list_by_approval_flow(
        &self,
        filter: &ApprovalFlowListFilter,
    ) -> Result<Page<ApprovalRequest>, HubError> {
        self.post_json(
            "approval-requests/list-by-approval-flow",
            filter,
            "approval flow",
            &filter.approval_flow_id,
        )
        .await
    }

    async fn list_by_request_user(
        &self,
        filter: &RequestUserListFilter,
    ) -> Result<Page<ApprovalRequest>, HubError> {
        self.post_json(
            "approval-requests/list-by-request-user",
            filter,
            "user",
            &filter.request_user_id,
        )
        .await
    }

    async fn get_approval_flow(
        &self,
        catalog_id: &str,
        approval_flow_id: &str,
    ) -> Result<ApprovalFlow, HubError> {
        self.get_json(
            &format!("catalogs/{}/approval-flows/{}", catalog_id, approval_flow_id),
            "approval flow",
            approval_flow_id,
        )
        .await
    }

    async fn run_validation_handler(
        &self,
        request: &ApprovalRequest,
    ) -> Result<HandlerResult, HubError> {
        self.post_json(
            &format!(
                "catalogs/{}/approval-flows/{}/handlers/validation",
                request.catalog_id, request.approval_flow_id
            ),
            request,
            "approval flow",
            &request.approval_flow_id,
        )
        .await
    }

    async fn run_approved_handler(
        &self,
        request: &ApprovalRequest,
    ) -> Result<HandlerResult, HubError> {
        self.post_json(
            &format!(
                "catalogs/{}/approval-flows/{}/handlers/approved",
                request.catalog_id, request.approval_flow_id
            ),
            request,
            "approval flow",
            &request.approval_flow_id,
        )
        .await
    }

    async fn run_revoked_handler(
        &self,
        request: &ApprovalRequest,
    ) -> Result<HandlerResult, HubError> {
        self.post_json(
            &format!(
                "catalogs/{}/approval-flows/{}/handlers/revoked",
                request.catalog_id, request.approval_flow_id
            ),
            request,
            "approval flow",
            &request.approval_flow_id,
        )
        .await
    }
}

#[async_trait]
impl GroupHub for HubClient {
    async fn get_group(&self, group_id: &str) -> Result<Group, HubError> {
        self.get_json(&format!("groups/{}", group_id), "group", group_id)
            .await
    }

    async fn list_groups(
        &self,
        pagination_token: Option<String>,
    ) -> Result<Page<Group>, HubError> {
        self.get_json(&Self::with_token("groups", pagination_token), "group", "*")
            .await
    }

    async fn list_group_memberships(
        &self,
        group_id: &str,
        pagination_token: Option<String>,
    ) -> Result<Page<GroupMembership>, HubError> {
        self.get_json(
            &Self::with_token(&format!("groups/{}/members", group_id), pagination_token),
            "group",
            group_id,
        )
        .await
    }

    async fn create_group_membership(
        &self,
        membership: &GroupMembership,
    ) -> Result<GroupMembership, HubError> {
        self.post_json(
            &format!("groups/{}/members", membership.group_id),
            membership,
            "group",
            &membership.group_id,
        )
        .await
    }

    async fn delete_group_membership(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<(), HubError> {
        self.delete(
            &format!("groups/{}/members/{}", group_id, user_id),
            "group membership",
            user_id,
        )
        .await
    }

    async fn get_notification_type(&self, type_id: &str) -> Result<NotificationType, HubError> {
        self.get_json(
            &format!("notification-types/{}", type_id),
            "notification type",
            type_id,
        )
        .await
    }

    async fn create_group_member_notification(
        &self,
        group_id: &str,
        channel: &NotificationChannelInput,
    ) -> Result<GroupMemberNotification, HubError> {
        self.post_json(
            &format!("groups/{}/member-notifications", group_id),
            channel,
            "group",
            group_id,
        )
        .await
    }

    async fn update_group_member_notification(
        &self,
        group_id: &str,
        notification_id: &str,
        channel: &NotificationChannelInput,
    ) -> Result<GroupMemberNotification, HubError> {
        self.put_json(
            &format!("groups/{}/member-notifications/{}", group_id, notification_id),
            channel,
            "group member notification",
            notification_id,
        )
        .await
    }

    async fn delete_group_member_notification(
        &self,
        group_id: &str,
        notification_id: &str,
    ) -> Result<(), HubError> {
        self.delete(
            &format!("groups/{}/member-notifications/{}", group_id, notification_id),
            "group member notification",
            notification_id,
        )
        .await
    }

    async fn create_approval_request_notification(
        &self,
        group_id: &str,
        channel: &NotificationChannelInput,
    ) -> Result<ApprovalRequestNotification, HubError> {
        self.post_json(
            &format!("groups/{}/approval-request-notifications", group_id),
            channel,
            "group",
            group_id,
        )
        .await
    }

    async fn update_approval_request_notification(
        &self,
        group_id: &str,
        notification_id: &str,
        channel: &NotificationChannelInput,
    ) -> Result<ApprovalRequestNotification, HubError> {
        self.put_json(
            &format!(
                "groups/{}/approval-request-notifications/{}",
                group_id, notification_id
            ),
            channel,
            "approval request notification",
            notification_id,
        )
        .await
    }

    async fn delete_approval_request_notification(
        &self,
        group_id: &str,
        notification_id: &str,
    ) -> Result<(), HubError> {
        self.delete(
            &format!(
                "groups/{}/approval-request-notifications/{}",
                group_id, notification_id
            ),
            "approval request notification",
            notification_id,
        )
        .await
    }
}
