use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Serialize;
use tracing::{info, warn};

use crate::api::rest::guard::record;
use crate::error::AppError;
use crate::models::account::{Credentials, Registration};
use crate::models::role::Role;
use crate::session::authorizer::{authorize, route_for, LOGIN_PATH};
use crate::session::Session;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/logout", post(logout))
        .route("/session", get(current_session))
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub role: Role,
    pub redirect: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub redirect: &'static str,
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Credentials>,
) -> Result<Json<LoginResponse>, AppError> {
    payload.validate()?;
    let role = sign_in(&state, &payload).await?;
    Ok(Json(LoginResponse {
        role,
        redirect: route_for(role),
    }))
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Registration>,
) -> Result<Json<LoginResponse>, AppError> {
    payload.validate()?;
    state.backend.register(&payload).await?;
    info!(role = %payload.role, "account registered");

    let credentials = Credentials {
        email: payload.email,
        password: payload.password,
        role: Some(payload.role),
    };
    let role = sign_in(&state, &credentials).await?;
    Ok(Json(LoginResponse {
        role,
        redirect: route_for(role),
    }))
}

async fn logout(State(state): State<Arc<AppState>>) -> Result<Json<LogoutResponse>, AppError> {
    state.store.clear()?;
    info!("logged out");
    Ok(Json(LogoutResponse {
        redirect: LOGIN_PATH,
    }))
}

async fn current_session(State(state): State<Arc<AppState>>) -> Json<Session> {
    Json(state.watcher.current())
}

/// Exchange credentials for a token, store it, and read the role back from it.
/// Landing is chosen by the token's role, not the role the form asked for.
async fn sign_in(state: &AppState, credentials: &Credentials) -> Result<Role, AppError> {
    let token = state.backend.login(credentials).await?;
    state.store.set(token.access_token)?;

    let decision = authorize(state.store.as_ref(), None);
    record(&state.metrics, &decision);
    let role = decision?;

    if let Some(requested) = credentials.role.filter(|requested| *requested != role) {
        warn!(requested = %requested, actual = %role, "login role differs from token role");
    }
    info!(role = %role, "logged in");
    Ok(role)
}
