//! Stamp — approval request lifecycle core.
//!
//! Users request actions on catalog resources; approver groups approve,
//! reject, or revoke those requests. State and catalog handlers live in the
//! remote stamp-hub service, reached through the capability traits in
//! [`hub`].

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod hub;
pub mod models;
pub mod pagination;
pub mod services;

use services::approval_requests::ApprovalRequestService;
use services::groups::GroupService;

/// Shared application state passed to handlers.
pub struct AppState {
    pub approvals: ApprovalRequestService,
    pub groups: GroupService,
    pub config: config::Config,
}
