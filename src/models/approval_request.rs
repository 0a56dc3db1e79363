//! The approval request entity and its lifecycle state machine.
//!
//! Legal transitions:
//!
//! ```text
//! submitted ─► validationFailed                  (terminal)
//! submitted ─► pending ─► rejected               (terminal)
//! pending ─► approved ─► approvedActionSucceeded | approvedActionFailed
//! approved | approvedActionSucceeded ─► revoked | revokedActionFailed
//! ```
//!
//! Transitions are monotonic: stage fields are populated once their stage is
//! reached and never cleared, and a request never returns to `pending`.

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use super::param::InputParam;

/// Who reviews a request: a named approver group, or the owners of the
/// requested resource itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApproverType {
    Group,
    Resource,
}

/// Outcome of a flow-defined handler (validation / approved / revoked).
///
/// A failing handler is data, not an error: it is captured here and folded
/// into the request status, while transport failures reaching the handler
/// propagate as operation errors instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResult {
    pub is_success: bool,
    pub message: String,
}

impl HandlerResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            is_success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            is_success: false,
            message: message.into(),
        }
    }
}

/// Lifecycle stage of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Submitted,
    ValidationFailed,
    Pending,
    Approved,
    Rejected,
    Revoked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Succeeded,
    Failed,
}

/// Request status: the stage reached plus, for side-effecting stages, how
/// the downstream action went. Serialized as the flat compatibility strings
/// (`approvedActionFailed` etc.) the hub and UI already speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub stage: Stage,
    pub action_outcome: Option<ActionOutcome>,
}

impl Status {
    pub const fn submitted() -> Self {
        Self {
            stage: Stage::Submitted,
            action_outcome: None,
        }
    }

    pub const fn validation_failed() -> Self {
        Self {
            stage: Stage::ValidationFailed,
            action_outcome: None,
        }
    }

    pub const fn pending() -> Self {
        Self {
            stage: Stage::Pending,
            action_outcome: None,
        }
    }

    pub const fn approved(outcome: Option<ActionOutcome>) -> Self {
        Self {
            stage: Stage::Approved,
            action_outcome: outcome,
        }
    }

    pub const fn rejected() -> Self {
        Self {
            stage: Stage::Rejected,
            action_outcome: None,
        }
    }

    pub const fn revoked(outcome: Option<ActionOutcome>) -> Self {
        Self {
            stage: Stage::Revoked,
            action_outcome: outcome,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.stage == Stage::Pending
    }

    /// Revocation is reachable from `approved` and `approvedActionSucceeded`
    /// only — never from a failed approval action or any other stage.
    pub fn is_revocable(&self) -> bool {
        self.stage == Stage::Approved && self.action_outcome != Some(ActionOutcome::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match (self.stage, self.action_outcome) {
            (Stage::Submitted, _) => "submitted",
            (Stage::ValidationFailed, _) => "validationFailed",
            (Stage::Pending, _) => "pending",
            (Stage::Approved, None) => "approved",
            (Stage::Approved, Some(ActionOutcome::Succeeded)) => "approvedActionSucceeded",
            (Stage::Approved, Some(ActionOutcome::Failed)) => "approvedActionFailed",
            (Stage::Rejected, _) => "rejected",
            // The wire never had a revokedActionSucceeded variant.
            (Stage::Revoked, Some(ActionOutcome::Failed)) => "revokedActionFailed",
            (Stage::Revoked, _) => "revoked",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "submitted" => Self::submitted(),
            "validationFailed" => Self::validation_failed(),
            "pending" => Self::pending(),
            "approved" => Self::approved(None),
            "approvedActionSucceeded" => Self::approved(Some(ActionOutcome::Succeeded)),
            "approvedActionFailed" => Self::approved(Some(ActionOutcome::Failed)),
            "rejected" => Self::rejected(),
            "revoked" => Self::revoked(None),
            "revokedActionFailed" => Self::revoked(Some(ActionOutcome::Failed)),
            _ => return None,
        })
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Status::parse(&s).ok_or_else(|| D::Error::custom(format!("unknown status '{}'", s)))
    }
}

/// A resource the request acts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputResource {
    pub resource_type_id: String,
    pub resource_id: String,
}

/// The central entity: one user's request for one action on a catalog item,
/// retained as an audit trail (never deleted by this layer).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequest {
    pub request_id: String,
    pub catalog_id: String,
    pub approval_flow_id: String,
    pub request_user_id: String,
    pub approver_id: String,
    pub approver_type: ApproverType,
    pub input_params: Vec<InputParam>,
    pub input_resources: Vec<InputResource>,
    pub request_comment: String,
    pub request_date: DateTime<Utc>,
    pub status: Status,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub validated_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_handler_result: Option<HandlerResult>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id_who_approved: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_handler_result: Option<HandlerResult>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id_who_rejected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reject_comment: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id_who_revoked: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked_comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked_handler_result: Option<HandlerResult>,
}

impl ApprovalRequest {
    /// Build a freshly submitted request.
    #[allow(clippy::too_many_arguments)]
    pub fn submitted(
        catalog_id: String,
        approval_flow_id: String,
        request_user_id: String,
        approver_id: String,
        approver_type: ApproverType,
        input_params: Vec<InputParam>,
        input_resources: Vec<InputResource>,
        request_comment: String,
    ) -> Self {
        Self {
            request_id: format!("req_{}", Uuid::new_v4().simple()),
            catalog_id,
            approval_flow_id,
            request_user_id,
            approver_id,
            approver_type,
            input_params,
            input_resources,
            request_comment,
            request_date: Utc::now(),
            status: Status::submitted(),
            validated_date: None,
            validation_handler_result: None,
            approved_date: None,
            user_id_who_approved: None,
            approved_comment: None,
            approved_handler_result: None,
            rejected_date: None,
            user_id_who_rejected: None,
            reject_comment: None,
            revoked_date: None,
            user_id_who_revoked: None,
            revoked_comment: None,
            revoked_handler_result: None,
        }
    }

    /// Fold the validation handler's verdict in: `pending` on success,
    /// `validationFailed` (terminal) otherwise.
    pub fn record_validation(&mut self, result: HandlerResult) -> Result<(), String> {
        if self.status.stage != Stage::Submitted {
            return Err(format!(
                "cannot validate a request in status '{}'",
                self.status.as_str()
            ));
        }
        self.validated_date = Some(Utc::now());
        self.status = if result.is_success {
            Status::pending()
        } else {
            Status::validation_failed()
        };
        self.validation_handler_result = Some(result);
        Ok(())
    }

    /// Record the approval decision. The approved handler has not run yet at
    /// this point; its outcome arrives via [`Self::record_approved_outcome`]
    /// so a handler crash never loses the approval itself.
    pub fn record_approved(&mut self, user_id: String, comment: String) -> Result<(), String> {
        if !self.status.is_pending() {
            return Err(format!(
                "cannot approve a request in status '{}'",
                self.status.as_str()
            ));
        }
        self.approved_date = Some(Utc::now());
        self.user_id_who_approved = Some(user_id);
        self.approved_comment = Some(comment);
        self.status = Status::approved(None);
        Ok(())
    }

    /// Fold the approved handler's outcome into the status.
    pub fn record_approved_outcome(&mut self, result: HandlerResult) {
        let outcome = if result.is_success {
            ActionOutcome::Succeeded
        } else {
            ActionOutcome::Failed
        };
        self.status = Status::approved(Some(outcome));
        self.approved_handler_result = Some(result);
    }

    pub fn record_rejected(&mut self, user_id: String, comment: String) -> Result<(), String> {
        if !self.status.is_pending() {
            return Err(format!(
                "cannot reject a request in status '{}'",
                self.status.as_str()
            ));
        }
        self.rejected_date = Some(Utc::now());
        self.user_id_who_rejected = Some(user_id);
        self.reject_comment = Some(comment);
        self.status = Status::rejected();
        Ok(())
    }

    /// Record the revocation decision; outcome follows via
    /// [`Self::record_revoked_outcome`]. The `enableRevoke` flag on the flow
    /// is checked by the caller — this guard only covers the status set.
    pub fn record_revoked(&mut self, user_id: String, comment: String) -> Result<(), String> {
        if !self.status.is_revocable() {
            return Err(format!(
                "cannot revoke a request in status '{}'",
                self.status.as_str()
            ));
        }
        self.revoked_date = Some(Utc::now());
        self.user_id_who_revoked = Some(user_id);
        self.revoked_comment = Some(comment);
        self.status = Status::revoked(None);
        Ok(())
    }

    pub fn record_revoked_outcome(&mut self, result: HandlerResult) {
        if !result.is_success {
            self.status = Status::revoked(Some(ActionOutcome::Failed));
        }
        self.revoked_handler_result = Some(result);
    }
}
