use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub mod handlers;

/// Build the management API router.
/// All routes are relative — the caller mounts this under `/api/v1`.
pub fn api_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/approval-requests",
            get(handlers::list_approval_requests_by_user).post(handlers::submit_approval_request),
        )
        .route("/approval-requests/:id", get(handlers::get_approval_request))
        .route(
            "/approval-requests/:id/approve",
            post(handlers::approve_approval_request),
        )
        .route(
            "/approval-requests/:id/reject",
            post(handlers::reject_approval_request),
        )
        .route(
            "/approval-requests/:id/revoke",
            post(handlers::revoke_approval_request),
        )
        .route(
            "/catalogs/:catalog_id/approval-flows/:flow_id/approval-requests",
            get(handlers::list_approval_requests_by_catalog),
        )
        .route("/groups", get(handlers::list_groups))
        .route("/groups/:id", get(handlers::get_group))
        .route(
            "/groups/:id/members",
            get(handlers::list_group_members).post(handlers::add_group_member),
        )
        .route(
            "/groups/:id/members/:user_id",
            delete(handlers::remove_group_member),
        )
        .route(
            "/groups/:id/member-notification",
            put(handlers::upsert_group_member_notification),
        )
        .route(
            "/groups/:id/member-notification/:notification_id",
            delete(handlers::delete_group_member_notification),
        )
        .route(
            "/groups/:id/approval-request-notification",
            put(handlers::upsert_approval_request_notification),
        )
        .route(
            "/groups/:id/approval-request-notification/:notification_id",
            delete(handlers::delete_approval_request_notification),
        )
        .layer(middleware::from_fn_with_state(state, admin_auth))
        .layer(TraceLayer::new_for_http())
        .fallback(fallback_404)
}

async fn fallback_404() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Middleware: validates `X-Admin-Key` against the configured admin key.
/// When no key is configured (local dev) the API is open.
async fn admin_auth(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let expected = match state.config.admin_key.as_deref() {
        Some(v) => v,
        None => return Ok(next.run(req).await),
    };

    let provided_key = req
        .headers()
        .get("x-admin-key")
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            req.headers()
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(|t| t.trim())
        });

    match provided_key {
        Some(k) if k == expected => Ok(next.run(req).await),
        Some(_) => {
            tracing::warn!("management API: invalid admin key");
            Err(StatusCode::UNAUTHORIZED)
        }
        None => {
            tracing::warn!("management API: missing X-Admin-Key header");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
