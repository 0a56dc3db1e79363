//! Group membership and notification subscription management.

use std::sync::Arc;

use serde::Deserialize;

use crate::errors::AppError;
use crate::hub::{GroupHub, NotificationChannelInput};
use crate::models::group::{
    ApprovalRequestNotification, Group, GroupMemberNotification, GroupMembership, MemberRole,
};
use crate::pagination::accumulate;

/// Upsert input for either notification subscription: an existing
/// `notification_id` means update, its absence means create.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationUpsert {
    #[serde(default)]
    pub notification_id: Option<String>,
    pub channel_type_id: String,
    #[serde(default)]
    pub channel_properties: serde_json::Map<String, serde_json::Value>,
}

#[derive(Clone)]
pub struct GroupService {
    hub: Arc<dyn GroupHub>,
}

impl GroupService {
    pub fn new(hub: Arc<dyn GroupHub>) -> Self {
        Self { hub }
    }

    pub async fn get_group(&self, group_id: &str) -> Result<Group, AppError> {
        Ok(self.hub.get_group(group_id).await?)
    }

    pub async fn list_groups(&self, limit: Option<usize>) -> Result<Vec<Group>, AppError> {
        let items = accumulate(|token| self.hub.list_groups(token), limit, None).await?;
        Ok(items)
    }

    pub async fn list_memberships(
        &self,
        group_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<GroupMembership>, AppError> {
        let items = accumulate(
            |token| self.hub.list_group_memberships(group_id, token),
            limit,
            None,
        )
        .await?;
        Ok(items)
    }

    /// Duplicate-add handling is the store's concern, not guaranteed here.
    pub async fn add_member(
        &self,
        group_id: &str,
        user_id: &str,
        role: MemberRole,
    ) -> Result<GroupMembership, AppError> {
        let membership = GroupMembership {
            group_id: group_id.to_string(),
            user_id: user_id.to_string(),
            role,
        };
        let created = self.hub.create_group_membership(&membership).await?;
        tracing::info!(group_id, user_id, ?role, "group member added");
        Ok(created)
    }

    pub async fn remove_member(&self, group_id: &str, user_id: &str) -> Result<(), AppError> {
        self.hub.delete_group_membership(group_id, user_id).await?;
        tracing::info!(group_id, user_id, "group member removed");
        Ok(())
    }

    /// Validate the channel properties against the type's declared schema;
    /// nothing is written when validation fails.
    async fn validated_channel(
        &self,
        input: &NotificationUpsert,
    ) -> Result<NotificationChannelInput, AppError> {
        let notification_type = self
            .hub
            .get_notification_type(&input.channel_type_id)
            .await?;
        notification_type
            .validate_properties(&input.channel_properties)
            .map_err(|fields| AppError::Validation { fields })?;
        Ok(NotificationChannelInput {
            type_id: input.channel_type_id.clone(),
            properties: input.channel_properties.clone(),
        })
    }

    pub async fn create_or_update_group_member_notification(
        &self,
        group_id: &str,
        input: NotificationUpsert,
    ) -> Result<GroupMemberNotification, AppError> {
        let channel = self.validated_channel(&input).await?;
        let saved = match &input.notification_id {
            Some(id) => {
                self.hub
                    .update_group_member_notification(group_id, id, &channel)
                    .await?
            }
            None => {
                self.hub
                    .create_group_member_notification(group_id, &channel)
                    .await?
            }
        };
        Ok(saved)
    }

    pub async fn delete_group_member_notification(
        &self,
        group_id: &str,
        notification_id: &str,
    ) -> Result<(), AppError> {
        self.hub
            .delete_group_member_notification(group_id, notification_id)
            .await?;
        Ok(())
    }

    pub async fn create_or_update_approval_request_notification(
        &self,
        group_id: &str,
        input: NotificationUpsert,
    ) -> Result<ApprovalRequestNotification, AppError> {
        let channel = self.validated_channel(&input).await?;
        let saved = match &input.notification_id {
            Some(id) => {
                self.hub
                    .update_approval_request_notification(group_id, id, &channel)
                    .await?
            }
            None => {
                self.hub
                    .create_approval_request_notification(group_id, &channel)
                    .await?
            }
        };
        Ok(saved)
    }

    pub async fn delete_approval_request_notification(
        &self,
        group_id: &str,
        notification_id: &str,
    ) -> Result<(), AppError> {
        self.hub
            .delete_approval_request_notification(group_id, notification_id)
            .await?;
        Ok(())
    }
}
