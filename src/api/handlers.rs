use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::approval_request::{ApprovalRequest, Status};
use crate::models::flow::DateRange;
use crate::models::group::{
    ApprovalRequestNotification, Group, GroupMemberNotification, GroupMembership, MemberRole,
};
use crate::services::approval_requests::{ActionResult, SubmitRequest};
use crate::services::groups::NotificationUpsert;
use crate::AppState;

// ── Request / Response DTOs ──────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListByUserParams {
    pub user_id: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
    /// Keep only requests in this status (post-fetch page filter).
    pub status: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListByCatalogParams {
    pub user_id: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    pub acting_user_id: String,
    #[serde(default)]
    pub comment: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub user_id: String,
    pub role: MemberRole,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub limit: Option<usize>,
}

fn date_range(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<Option<DateRange>, AppError> {
    match (start, end) {
        (Some(start), Some(end)) => Ok(Some(DateRange { start, end })),
        (None, None) => Ok(None),
        _ => Err(AppError::validation(
            "requestDate",
            "start and end must be supplied together",
        )),
    }
}

fn status_filter(raw: Option<&str>) -> Result<Option<Status>, AppError> {
    match raw {
        None => Ok(None),
        Some(s) => Status::parse(s)
            .map(Some)
            .ok_or_else(|| AppError::validation("status", "unknown status value")),
    }
}

// ── Approval request handlers ────────────────────────────────

/// GET /api/v1/approval-requests — the caller's own requests
pub async fn list_approval_requests_by_user(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListByUserParams>,
) -> Result<Json<Vec<ApprovalRequest>>, AppError> {
    let range = date_range(params.start, params.end)?;
    let wanted = status_filter(params.status.as_deref())?;
    let filter = wanted.map(|s| move |r: &ApprovalRequest| r.status == s);

    let items = state
        .approvals
        .list_by_user(
            &params.user_id,
            range,
            params.limit,
            filter
                .as_ref()
                .map(|f| f as &(dyn Fn(&ApprovalRequest) -> bool + Send + Sync)),
        )
        .await?;
    Ok(Json(items))
}

/// GET /api/v1/catalogs/:catalog_id/approval-flows/:flow_id/approval-requests
pub async fn list_approval_requests_by_catalog(
    State(state): State<Arc<AppState>>,
    Path((catalog_id, flow_id)): Path<(String, String)>,
    Query(params): Query<ListByCatalogParams>,
) -> Result<Json<Vec<ApprovalRequest>>, AppError> {
    let range = date_range(params.start, params.end)?;
    let wanted = status_filter(params.status.as_deref())?;
    let filter = wanted.map(|s| move |r: &ApprovalRequest| r.status == s);

    let items = state
        .approvals
        .list_by_catalog(
            &catalog_id,
            &flow_id,
            params.user_id,
            range,
            filter
                .as_ref()
                .map(|f| f as &(dyn Fn(&ApprovalRequest) -> bool + Send + Sync)),
        )
        .await?;
    Ok(Json(items))
}

/// GET /api/v1/approval-requests/:id
pub async fn get_approval_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApprovalRequest>, AppError> {
    Ok(Json(state.approvals.get(&id).await?))
}

/// POST /api/v1/approval-requests — submit a new request
pub async fn submit_approval_request(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<ApprovalRequest>), AppError> {
    let request = state.approvals.submit(payload).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// POST /api/v1/approval-requests/:id/approve
pub async fn approve_approval_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<DecisionRequest>,
) -> Result<Json<ActionResult>, AppError> {
    let result = state
        .approvals
        .approve(&id, &payload.acting_user_id, &payload.comment)
        .await?;
    Ok(Json(result))
}

/// POST /api/v1/approval-requests/:id/reject
pub async fn reject_approval_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<DecisionRequest>,
) -> Result<Json<ActionResult>, AppError> {
    let result = state
        .approvals
        .reject(&id, &payload.acting_user_id, &payload.comment)
        .await?;
    Ok(Json(result))
}

/// POST /api/v1/approval-requests/:id/revoke
pub async fn revoke_approval_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<DecisionRequest>,
) -> Result<Json<ActionResult>, AppError> {
    let result = state
        .approvals
        .revoke(&id, &payload.acting_user_id, &payload.comment)
        .await?;
    Ok(Json(result))
}

// ── Group handlers ───────────────────────────────────────────

/// GET /api/v1/groups
pub async fn list_groups(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Group>>, AppError> {
    Ok(Json(state.groups.list_groups(params.limit).await?))
}

/// GET /api/v1/groups/:id
pub async fn get_group(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Group>, AppError> {
    Ok(Json(state.groups.get_group(&id).await?))
}

/// GET /api/v1/groups/:id/members
pub async fn list_group_members(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<GroupMembership>>, AppError> {
    Ok(Json(state.groups.list_memberships(&id, params.limit).await?))
}

/// POST /api/v1/groups/:id/members
pub async fn add_group_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<GroupMembership>), AppError> {
    let membership = state
        .groups
        .add_member(&id, &payload.user_id, payload.role)
        .await?;
    Ok((StatusCode::CREATED, Json(membership)))
}

/// DELETE /api/v1/groups/:id/members/:user_id
pub async fn remove_group_member(
    State(state): State<Arc<AppState>>,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    state.groups.remove_member(&id, &user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/groups/:id/member-notification
pub async fn upsert_group_member_notification(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<NotificationUpsert>,
) -> Result<Json<GroupMemberNotification>, AppError> {
    let saved = state
        .groups
        .create_or_update_group_member_notification(&id, payload)
        .await?;
    Ok(Json(saved))
}

/// DELETE /api/v1/groups/:id/member-notification/:notification_id
pub async fn delete_group_member_notification(
    State(state): State<Arc<AppState>>,
    Path((id, notification_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    state
        .groups
        .delete_group_member_notification(&id, &notification_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/groups/:id/approval-request-notification
pub async fn upsert_approval_request_notification(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<NotificationUpsert>,
) -> Result<Json<ApprovalRequestNotification>, AppError> {
    let saved = state
        .groups
        .create_or_update_approval_request_notification(&id, payload)
        .await?;
    Ok(Json(saved))
}

/// DELETE /api/v1/groups/:id/approval-request-notification/:notification_id
pub async fn delete_approval_request_notification(
    State(state): State<Arc<AppState>>,
    Path((id, notification_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    state
        .groups
        .delete_approval_request_notification(&id, &notification_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
