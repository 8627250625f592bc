use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::backend::error::{BackendError, GENERIC_FAILURE};
use crate::lifecycle::transitions::TransitionError;
use crate::session::authorizer::{AuthzError, LOGIN_PATH};
use crate::session::store::StoreError;
use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("access denied: {0}")]
    Denied(#[from] AuthzError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            // Denials and expired sessions become navigation, never error text.
            AppError::Denied(_) | AppError::Backend(BackendError::Unauthorized) => {
                return Redirect::to(LOGIN_PATH).into_response();
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Validation(err) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
            AppError::Transition(err @ TransitionError::AlreadyTerminal) => {
                (StatusCode::CONFLICT, err.to_string())
            }
            AppError::Transition(err @ TransitionError::UnknownState(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            AppError::Backend(BackendError::Status { status, message }) => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                message.clone(),
            ),
            AppError::Backend(BackendError::Transport(_)) => (
                StatusCode::BAD_GATEWAY,
                format!("backend unavailable: {GENERIC_FAILURE}"),
            ),
            AppError::Backend(BackendError::InvalidUrl(msg)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::Store(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
