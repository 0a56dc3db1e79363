//! Approval request lifecycle actions and the paginated query service.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::hub::{ApprovalFlowListFilter, ApprovalRequestHub, RequestUserListFilter};
use crate::models::approval_request::{ApprovalRequest, InputResource};
use crate::models::flow::DateRange;
use crate::models::param::InputParam;
use crate::pagination::accumulate;

/// Predicate applied to each raw page before the accumulator's
/// continuation check.
pub type RequestFilter<'a> = &'a (dyn Fn(&ApprovalRequest) -> bool + Send + Sync);

/// Outcome of a mutating lifecycle action. `is_success` is the authoritative
/// signal: approving a request whose downstream action fails still reports
/// success here — the approval itself happened, and the action failure is
/// recorded on the request's status and handler result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub is_success: bool,
    pub message: String,
}

/// A raw submitted parameter, not yet checked against the flow's
/// declarations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInputParam {
    pub id: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub catalog_id: String,
    pub approval_flow_id: String,
    pub request_user_id: String,
    #[serde(default)]
    pub input_params: Vec<RawInputParam>,
    #[serde(default)]
    pub input_resources: Vec<InputResource>,
    #[serde(default)]
    pub request_comment: String,
}

#[derive(Clone)]
pub struct ApprovalRequestService {
    hub: Arc<dyn ApprovalRequestHub>,
}

impl ApprovalRequestService {
    pub fn new(hub: Arc<dyn ApprovalRequestHub>) -> Self {
        Self { hub }
    }

    // ── Queries ──────────────────────────────────────────────────

    /// Catalog-scoped listing: drains the stream to exhaustion (operators
    /// bound these by flow and date range, not by count).
    pub async fn list_by_catalog(
        &self,
        catalog_id: &str,
        approval_flow_id: &str,
        request_user_id: Option<String>,
        date_range: Option<DateRange>,
        filter: Option<RequestFilter<'_>>,
    ) -> Result<Vec<ApprovalRequest>, AppError> {
        let base = ApprovalFlowListFilter {
            catalog_id: catalog_id.to_string(),
            approval_flow_id: approval_flow_id.to_string(),
            request_user_id,
            request_date: date_range,
            pagination_token: None,
        };
        let items = accumulate(
            |token| {
                let mut page_filter = base.clone();
                page_filter.pagination_token = token;
                async move { self.hub.list_by_approval_flow(&page_filter).await }
            },
            None,
            filter,
        )
        .await?;
        Ok(items)
    }

    /// Requesting-user listing. `limit: None` returns everything; the
    /// accumulator keeps fetching past fully-filtered-out pages until the
    /// post-filter count satisfies `limit` or the stream ends.
    pub async fn list_by_user(
        &self,
        request_user_id: &str,
        date_range: Option<DateRange>,
        limit: Option<usize>,
        filter: Option<RequestFilter<'_>>,
    ) -> Result<Vec<ApprovalRequest>, AppError> {
        let base = RequestUserListFilter {
            request_user_id: request_user_id.to_string(),
            request_date: date_range,
            pagination_token: None,
        };
        let items = accumulate(
            |token| {
                let mut page_filter = base.clone();
                page_filter.pagination_token = token;
                async move { self.hub.list_by_request_user(&page_filter).await }
            },
            limit,
            filter,
        )
        .await?;
        Ok(items)
    }

    pub async fn get(&self, request_id: &str) -> Result<ApprovalRequest, AppError> {
        Ok(self.hub.get_approval_request(request_id).await?)
    }

    // ── Lifecycle actions ────────────────────────────────────────

    /// Validate inputs against the flow, create the record as `submitted`,
    /// then run the flow's validation handler to reach `pending` or
    /// `validationFailed`.
    pub async fn submit(&self, input: SubmitRequest) -> Result<ApprovalRequest, AppError> {
        let flow = self
            .hub
            .get_approval_flow(&input.catalog_id, &input.approval_flow_id)
            .await?;

        let mut fields: HashMap<String, String> = HashMap::new();
        let mut params: Vec<InputParam> = Vec::new();

        for def in &flow.input_params {
            match input.input_params.iter().find(|p| p.id == def.id) {
                Some(raw) => match def.param_type.parse(&raw.value) {
                    Ok(value) => params.push(InputParam {
                        id: def.id.clone(),
                        value,
                    }),
                    Err(msg) => {
                        fields.insert(def.id.clone(), msg);
                    }
                },
                None if def.required => {
                    fields.insert(def.id.clone(), "required parameter is missing".to_string());
                }
                None => {}
            }
        }
        for raw in &input.input_params {
            if !flow.input_params.iter().any(|d| d.id == raw.id) {
                fields.insert(raw.id.clone(), "unknown parameter".to_string());
            }
        }
        for resource_type in &flow.required_resource_types {
            if !input
                .input_resources
                .iter()
                .any(|r| &r.resource_type_id == resource_type)
            {
                fields.insert(
                    resource_type.clone(),
                    "a resource of this type must be selected".to_string(),
                );
            }
        }
        if !fields.is_empty() {
            return Err(AppError::Validation { fields });
        }

        let request = ApprovalRequest::submitted(
            input.catalog_id,
            input.approval_flow_id,
            input.request_user_id,
            flow.approver_id.clone(),
            flow.approver_type,
            params,
            input.input_resources,
            input.request_comment,
        );
        let mut request = self.hub.create_approval_request(&request).await?;
        tracing::info!(
            request_id = %request.request_id,
            flow = %request.approval_flow_id,
            "approval request submitted"
        );

        let result = self.hub.run_validation_handler(&request).await?;
        request
            .record_validation(result)
            .map_err(AppError::GuardViolation)?;
        let request = self.hub.update_approval_request(&request).await?;
        Ok(request)
    }

    pub async fn approve(
        &self,
        request_id: &str,
        acting_user_id: &str,
        comment: &str,
    ) -> Result<ActionResult, AppError> {
        let mut request = self.hub.get_approval_request(request_id).await?;
        request
            .record_approved(acting_user_id.to_string(), comment.to_string())
            .map_err(AppError::GuardViolation)?;
        // Persist the decision before the handler runs so a handler crash
        // cannot lose the approval itself.
        let mut request = self.hub.update_approval_request(&request).await?;

        let result = self.hub.run_approved_handler(&request).await?;
        let handler_ok = result.is_success;
        let handler_msg = result.message.clone();
        request.record_approved_outcome(result);
        self.hub.update_approval_request(&request).await?;

        tracing::info!(
            request_id = %request.request_id,
            approver = %acting_user_id,
            handler_ok,
            "approval request approved"
        );
        Ok(ActionResult {
            is_success: true,
            message: if handler_ok {
                "approved".to_string()
            } else {
                format!("approved, but the approved action failed: {}", handler_msg)
            },
        })
    }

    pub async fn reject(
        &self,
        request_id: &str,
        acting_user_id: &str,
        comment: &str,
    ) -> Result<ActionResult, AppError> {
        let mut request = self.hub.get_approval_request(request_id).await?;
        request
            .record_rejected(acting_user_id.to_string(), comment.to_string())
            .map_err(AppError::GuardViolation)?;
        self.hub.update_approval_request(&request).await?;

        tracing::info!(
            request_id = %request.request_id,
            rejector = %acting_user_id,
            "approval request rejected"
        );
        Ok(ActionResult {
            is_success: true,
            message: "rejected".to_string(),
        })
    }

    pub async fn revoke(
        &self,
        request_id: &str,
        acting_user_id: &str,
        comment: &str,
    ) -> Result<ActionResult, AppError> {
        let mut request = self.hub.get_approval_request(request_id).await?;
        let flow = self
            .hub
            .get_approval_flow(&request.catalog_id, &request.approval_flow_id)
            .await?;
        if !flow.enable_revoke {
            return Err(AppError::GuardViolation(format!(
                "approval flow '{}' does not allow revocation",
                flow.approval_flow_id
            )));
        }
        request
            .record_revoked(acting_user_id.to_string(), comment.to_string())
            .map_err(AppError::GuardViolation)?;

        let result = self.hub.run_revoked_handler(&request).await?;
        let handler_ok = result.is_success;
        let handler_msg = result.message.clone();
        request.record_revoked_outcome(result);
        self.hub.update_approval_request(&request).await?;

        tracing::info!(
            request_id = %request.request_id,
            revoker = %acting_user_id,
            handler_ok,
            "approval request revoked"
        );
        Ok(ActionResult {
            is_success: true,
            message: if handler_ok {
                "revoked".to_string()
            } else {
                format!("revoked, but the revoke action failed: {}", handler_msg)
            },
        })
    }
}
