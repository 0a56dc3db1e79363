//! In-memory stamp-hub fakes shared by the integration suites.
#![allow(dead_code)] // each suite uses a different slice of the fakes

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use stamp::hub::{
    ApprovalFlowListFilter, ApprovalRequestHub, GroupHub, HubError, NotificationChannelInput,
    RequestUserListFilter,
};
use stamp::models::approval_request::{
    ApprovalRequest, ApproverType, HandlerResult, Status,
};
use stamp::models::flow::ApprovalFlow;
use stamp::models::group::{
    ApprovalRequestNotification, Group, GroupMemberNotification, GroupMembership,
    NotificationType,
};
use stamp::models::param::{ParamDefinition, ParamType};
use stamp::pagination::Page;

// ── Builders ─────────────────────────────────────────────────

pub fn rental_flow(enable_revoke: bool) -> ApprovalFlow {
    ApprovalFlow {
        catalog_id: "unicorn-rental".into(),
        approval_flow_id: "rent".into(),
        name: "Rent a unicorn".into(),
        approver_id: "unicorn-keepers".into(),
        approver_type: ApproverType::Group,
        input_params: vec![ParamDefinition {
            id: "period".into(),
            param_type: ParamType::Number,
            required: true,
        }],
        required_resource_types: vec!["unicorn".into()],
        enable_revoke,
    }
}

pub fn request_with_status(request_id: &str, status: &str) -> ApprovalRequest {
    let mut req = ApprovalRequest::submitted(
        "unicorn-rental".into(),
        "rent".into(),
        "user-1".into(),
        "unicorn-keepers".into(),
        ApproverType::Group,
        vec![],
        vec![],
        String::new(),
    );
    req.request_id = request_id.to_string();
    req.status = Status::parse(status).expect("known status");
    req
}

// ── Approval request hub fake ────────────────────────────────

/// Backing state is a plain map; listing answers come from scripted pages so
/// pagination behavior can be asserted call by call.
#[derive(Default)]
pub struct FakeHub {
    pub flows: Mutex<HashMap<(String, String), ApprovalFlow>>,
    pub requests: Mutex<HashMap<String, ApprovalRequest>>,
    pub validation_result: Mutex<Option<HandlerResult>>,
    pub approved_result: Mutex<Option<HandlerResult>>,
    pub revoked_result: Mutex<Option<HandlerResult>>,

    pub flow_pages: Mutex<Vec<Page<ApprovalRequest>>>,
    pub user_pages: Mutex<Vec<Page<ApprovalRequest>>>,
    flow_page_cursor: AtomicUsize,
    user_page_cursor: AtomicUsize,
    pub flow_filters_seen: Mutex<Vec<ApprovalFlowListFilter>>,
    pub user_filters_seen: Mutex<Vec<RequestUserListFilter>>,
}

impl FakeHub {
    pub fn with_flow(flow: ApprovalFlow) -> Self {
        let fake = Self::default();
        fake.flows.lock().unwrap().insert(
            (flow.catalog_id.clone(), flow.approval_flow_id.clone()),
            flow,
        );
        *fake.validation_result.lock().unwrap() = Some(HandlerResult::ok("validated"));
        *fake.approved_result.lock().unwrap() = Some(HandlerResult::ok("granted"));
        *fake.revoked_result.lock().unwrap() = Some(HandlerResult::ok("revoked"));
        fake
    }

    pub fn stored(&self, request_id: &str) -> ApprovalRequest {
        self.requests
            .lock()
            .unwrap()
            .get(request_id)
            .cloned()
            .expect("request stored in fake hub")
    }

    pub fn insert(&self, request: ApprovalRequest) {
        self.requests
            .lock()
            .unwrap()
            .insert(request.request_id.clone(), request);
    }
}

#[async_trait]
impl ApprovalRequestHub for FakeHub {
    async fn get_approval_request(&self, request_id: &str) -> Result<ApprovalRequest, HubError> {
        self.requests
            .lock()
            .unwrap()
            .get(request_id)
            .cloned()
            .ok_or(HubError::NotFound {
                entity: "approval request",
                id: request_id.to_string(),
            })
    }

    async fn create_approval_request(
        &self,
        request: &ApprovalRequest,
    ) -> Result<ApprovalRequest, HubError> {
        self.insert(request.clone());
        Ok(request.clone())
    }

    async fn update_approval_request(
        &self,
        request: &ApprovalRequest,
    ) -> Result<ApprovalRequest, HubError> {
        self.insert(request.clone());
        Ok(request.clone())
    }

    async fn list_by_approval_flow(
        &self,
        filter: &ApprovalFlowListFilter,
    ) -> Result<Page<ApprovalRequest>, HubError> {
        self.flow_filters_seen.lock().unwrap().push(filter.clone());
        let n = self.flow_page_cursor.fetch_add(1, Ordering::SeqCst);
        self.flow_pages
            .lock()
            .unwrap()
            .get(n)
            .cloned()
            .ok_or(HubError::Transport("no more scripted pages".into()))
    }

    async fn list_by_request_user(
        &self,
        filter: &RequestUserListFilter,
    ) -> Result<Page<ApprovalRequest>, HubError> {
        self.user_filters_seen.lock().unwrap().push(filter.clone());
        let n = self.user_page_cursor.fetch_add(1, Ordering::SeqCst);
        self.user_pages
            .lock()
            .unwrap()
            .get(n)
            .cloned()
            .ok_or(HubError::Transport("no more scripted pages".into()))
    }

    async fn get_approval_flow(
        &self,
        catalog_id: &str,
        approval_flow_id: &str,
    ) -> Result<ApprovalFlow, HubError> {
        self.flows
            .lock()
            .unwrap()
            .get(&(catalog_id.to_string(), approval_flow_id.to_string()))
            .cloned()
            .ok_or(HubError::NotFound {
                entity: "approval flow",
                id: approval_flow_id.to_string(),
            })
    }

    async fn run_validation_handler(
        &self,
        _request: &ApprovalRequest,
    ) -> Result<HandlerResult, HubError> {
        Ok(self.validation_result.lock().unwrap().clone().unwrap())
    }

    async fn run_approved_handler(
        &self,
        _request: &ApprovalRequest,
    ) -> Result<HandlerResult, HubError> {
        Ok(self.approved_result.lock().unwrap().clone().unwrap())
    }

    async fn run_revoked_handler(
        &self,
        _request: &ApprovalRequest,
    ) -> Result<HandlerResult, HubError> {
        Ok(self.revoked_result.lock().unwrap().clone().unwrap())
    }
}

// ── Group hub fake ───────────────────────────────────────────

#[derive(Default)]
pub struct FakeGroupHub {
    pub groups: Mutex<HashMap<String, Group>>,
    pub group_pages: Mutex<Vec<Page<Group>>>,
    group_page_cursor: AtomicUsize,
    pub membership_pages: Mutex<Vec<Page<GroupMembership>>>,
    membership_page_cursor: AtomicUsize,
    pub memberships: Mutex<Vec<GroupMembership>>,
    pub removed_members: Mutex<Vec<(String, String)>>,
    pub notification_types: Mutex<HashMap<String, NotificationType>>,
    pub member_notification_creates: Mutex<Vec<(String, NotificationChannelInput)>>,
    pub member_notification_updates: Mutex<Vec<(String, String, NotificationChannelInput)>>,
    pub request_notification_creates: Mutex<Vec<(String, NotificationChannelInput)>>,
    pub request_notification_updates: Mutex<Vec<(String, String, NotificationChannelInput)>>,
    pub deleted_notifications: Mutex<Vec<(String, String)>>,
}

impl FakeGroupHub {
    pub fn with_notification_type(notification_type: NotificationType) -> Self {
        let fake = Self::default();
        fake.notification_types
            .lock()
            .unwrap()
            .insert(notification_type.id.clone(), notification_type);
        fake
    }

    fn channel(id: &str, input: &NotificationChannelInput) -> stamp::models::group::NotificationChannel {
        stamp::models::group::NotificationChannel {
            id: id.to_string(),
            type_id: input.type_id.clone(),
            properties: input.properties.clone(),
        }
    }
}

#[async_trait]
impl GroupHub for FakeGroupHub {
    async fn get_group(&self, group_id: &str) -> Result<Group, HubError> {
        self.groups
            .lock()
            .unwrap()
            .get(group_id)
            .cloned()
            .ok_or(HubError::NotFound {
                entity: "group",
                id: group_id.to_string(),
            })
    }

    async fn list_groups(
        &self,
        _pagination_token: Option<String>,
    ) -> Result<Page<Group>, HubError> {
        let n = self.group_page_cursor.fetch_add(1, Ordering::SeqCst);
        self.group_pages
            .lock()
            .unwrap()
            .get(n)
            .cloned()
            .ok_or(HubError::Transport("no more scripted pages".into()))
    }

    async fn list_group_memberships(
        &self,
        _group_id: &str,
        _pagination_token: Option<String>,
    ) -> Result<Page<GroupMembership>, HubError> {
        let n = self.membership_page_cursor.fetch_add(1, Ordering::SeqCst);
        self.membership_pages
            .lock()
            .unwrap()
            .get(n)
            .cloned()
            .ok_or(HubError::Transport("no more scripted pages".into()))
    }

    async fn create_group_membership(
        &self,
        membership: &GroupMembership,
    ) -> Result<GroupMembership, HubError> {
        self.memberships.lock().unwrap().push(membership.clone());
        Ok(membership.clone())
    }

    async fn delete_group_membership(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<(), HubError> {
        self.removed_members
            .lock()
            .unwrap()
            .push((group_id.to_string(), user_id.to_string()));
        Ok(())
    }

    async fn get_notification_type(&self, type_id: &str) -> Result<NotificationType, HubError> {
        self.notification_types
            .lock()
            .unwrap()
            .get(type_id)
            .cloned()
            .ok_or(HubError::NotFound {
                entity: "notification type",
                id: type_id.to_string(),
            })
    }

    async fn create_group_member_notification(
        &self,
        group_id: &str,
        channel: &NotificationChannelInput,
    ) -> Result<GroupMemberNotification, HubError> {
        self.member_notification_creates
            .lock()
            .unwrap()
            .push((group_id.to_string(), channel.clone()));
        Ok(GroupMemberNotification {
            notification_id: "gmn_1".into(),
            group_id: group_id.to_string(),
            notification_channel: Self::channel("chan_1", channel),
        })
    }

    async fn update_group_member_notification(
        &self,
        group_id: &str,
        notification_id: &str,
        channel: &NotificationChannelInput,
    ) -> Result<GroupMemberNotification, HubError> {
        self.member_notification_updates.lock().unwrap().push((
            group_id.to_string(),
            notification_id.to_string(),
            channel.clone(),
        ));
        Ok(GroupMemberNotification {
            notification_id: notification_id.to_string(),
            group_id: group_id.to_string(),
            notification_channel: Self::channel("chan_1", channel),
        })
    }

    async fn delete_group_member_notification(
        &self,
        group_id: &str,
        notification_id: &str,
    ) -> Result<(), HubError> {
        self.deleted_notifications
            .lock()
            .unwrap()
            .push((group_id.to_string(), notification_id.to_string()));
        Ok(())
    }

    async fn create_approval_request_notification(
        &self,
        group_id: &str,
        channel: &NotificationChannelInput,
    ) -> Result<ApprovalRequestNotification, HubError> {
        self.request_notification_creates
            .lock()
            .unwrap()
            .push((group_id.to_string(), channel.clone()));
        Ok(ApprovalRequestNotification {
            notification_id: "arn_1".into(),
            group_id: group_id.to_string(),
            notification_channel: Self::channel("chan_1", channel),
        })
    }

    async fn update_approval_request_notification(
        &self,
        group_id: &str,
        notification_id: &str,
        channel: &NotificationChannelInput,
    ) -> Result<ApprovalRequestNotification, HubError> {
        self.request_notification_updates.lock().unwrap().push((
            group_id.to_string(),
            notification_id.to_string(),
            channel.clone(),
        ));
        Ok(ApprovalRequestNotification {
            notification_id: notification_id.to_string(),
            group_id: group_id.to_string(),
            notification_channel: Self::channel("chan_1", channel),
        })
    }

    async fn delete_approval_request_notification(
        &self,
        group_id: &str,
        notification_id: &str,
    ) -> Result<(), HubError> {
        self.deleted_notifications
            .lock()
            .unwrap()
            .push((group_id.to_string(), notification_id.to_string()));
        Ok(())
    }
}
