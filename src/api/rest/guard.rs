use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::info;

use crate::error::AppError;
use crate::models::role::Role;
use crate::observability::metrics::Metrics;
use crate::session::authorizer::{authorize, AuthzError};
use crate::state::AppState;

pub async fn require_staff(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    gate(&state, Role::Staff, request, next).await
}

pub async fn require_customer(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    gate(&state, Role::Customer, request, next).await
}

pub async fn require_rider(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    gate(&state, Role::Rider, request, next).await
}

async fn gate(state: &AppState, required: Role, mut request: Request, next: Next) -> Response {
    let decision = authorize(state.store.as_ref(), Some(required));
    record(&state.metrics, &decision);

    match decision {
        Ok(role) => {
            request.extensions_mut().insert(role);
            next.run(request).await
        }
        Err(err) => {
            info!(path = %request.uri().path(), required = %required, reason = err.label(), "view denied");
            AppError::Denied(err).into_response()
        }
    }
}

pub fn record(metrics: &Metrics, decision: &Result<Role, AuthzError>) {
    let outcome = match decision {
        Ok(_) => "allow",
        Err(err) => err.label(),
    };
    metrics
        .authorizations_total
        .with_label_values(&[outcome])
        .inc();
}
