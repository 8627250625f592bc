pub mod auth;
pub mod customer;
pub mod guard;
pub mod rider;
pub mod staff;
pub mod ws;

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::lifecycle::buckets::DashboardCounts;
use crate::lifecycle::charges::{estimate, RATE_PER_KG};
use crate::models::parcel::Parcel;
use crate::models::role::Role;
use crate::session::authorizer::{authorize, route_for, LOGIN_PATH};
use crate::session::Session;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(staff::router(state.clone()))
        .merge(customer::router(state.clone()))
        .merge(rider::router(state.clone()))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/login", get(login_view))
        .route("/estimate", get(charge_estimate))
        .route("/track/:tracking_number", get(track))
        .route("/session/ws", get(ws::session_ws))
        .fallback(navigate_home)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub role: Role,
    pub counts: DashboardCounts,
    pub parcels: Vec<Parcel>,
}

impl DashboardView {
    pub fn new(role: Role, parcels: Vec<Parcel>) -> Self {
        Self {
            role,
            counts: DashboardCounts::tally(&parcels),
            parcels,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub q: String,
}

impl ListQuery {
    pub fn apply(&self, parcels: Vec<Parcel>) -> Vec<Parcel> {
        parcels.into_iter().filter(|p| p.matches(&self.q)).collect()
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    backend: String,
    session: Session,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        backend: state.backend.base_url().to_string(),
        session: state.watcher.current(),
    })
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err).into_response(),
    }
}

async fn login_view(State(state): State<Arc<AppState>>) -> Response {
    let decision = authorize(state.store.as_ref(), None);
    guard::record(&state.metrics, &decision);

    match decision {
        Ok(role) => Redirect::to(route_for(role)).into_response(),
        Err(_) => Json(json!({ "view": "login" })).into_response(),
    }
}

async fn navigate_home(State(state): State<Arc<AppState>>) -> Redirect {
    let decision = authorize(state.store.as_ref(), None);
    guard::record(&state.metrics, &decision);

    match decision {
        Ok(role) => Redirect::to(route_for(role)),
        Err(_) => Redirect::to(LOGIN_PATH),
    }
}

#[derive(Debug, Deserialize)]
struct EstimateQuery {
    #[serde(default)]
    weight_kg: String,
}

#[derive(Debug, Serialize)]
struct EstimateResponse {
    charges: f64,
    rate_per_kg: f64,
}

async fn charge_estimate(Query(query): Query<EstimateQuery>) -> Json<EstimateResponse> {
    Json(EstimateResponse {
        charges: estimate(&query.weight_kg),
        rate_per_kg: RATE_PER_KG,
    })
}

async fn track(
    State(state): State<Arc<AppState>>,
    Path(tracking_number): Path<String>,
) -> Result<Json<Parcel>, AppError> {
    let parcel = state.backend.track(tracking_number.trim()).await?;
    Ok(Json(parcel))
}
