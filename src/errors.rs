use std::collections::HashMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::hub::HubError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed")]
    Validation { fields: HashMap<String, String> },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("illegal transition: {0}")]
    GuardViolation(String),

    #[error("stamp-hub error: {0}")]
    Transport(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(field: &str, message: &str) -> Self {
        let mut fields = HashMap::new();
        fields.insert(field.to_string(), message.to_string());
        AppError::Validation { fields }
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        AppError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl From<HubError> for AppError {
    fn from(e: HubError) -> Self {
        match e {
            HubError::NotFound { entity, id } => AppError::NotFound { entity, id },
            HubError::Remote { status, body } => {
                AppError::Transport(format!("hub returned status={status}: {body}"))
            }
            HubError::Transport(msg) => AppError::Transport(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, code, msg) = match &self {
            AppError::Validation { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "invalid_request_error",
                "validation_failed",
                "one or more fields failed validation".to_string(),
            ),
            AppError::NotFound { entity, id } => (
                StatusCode::NOT_FOUND,
                "invalid_request_error",
                "not_found",
                format!("{} not found: {}", entity, id),
            ),
            AppError::GuardViolation(reason) => (
                StatusCode::CONFLICT,
                "invalid_state_error",
                "guard_violation",
                reason.clone(),
            ),
            AppError::Transport(e) => {
                tracing::error!("stamp-hub error: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "upstream_error",
                    "hub_unavailable",
                    "stamp-hub request failed".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal_server_error",
                    "internal server error".to_string(),
                )
            }
        };

        let mut error = json!({
            "message": msg,
            "type": error_type,
            "code": code,
        });

        // Field-keyed detail map so forms can highlight the offending inputs.
        if let AppError::Validation { fields } = &self {
            error["fields"] = json!(fields);
        }

        let body = Json(json!({ "error": error }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hub_not_found_maps_to_typed_not_found() {
        let e = AppError::from(HubError::NotFound {
            entity: "group",
            id: "grp-1".into(),
        });
        assert!(matches!(e, AppError::NotFound { entity: "group", .. }));
    }

    #[test]
    fn hub_remote_maps_to_transport() {
        let e = AppError::from(HubError::Remote {
            status: 500,
            body: "boom".into(),
        });
        assert!(matches!(e, AppError::Transport(_)));
    }
}
