use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::middleware;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::rest::guard::require_rider;
use crate::api::rest::{DashboardView, ListQuery};
use crate::error::AppError;
use crate::lifecycle::transitions::advance;
use crate::models::parcel::Parcel;
use crate::models::role::Role;
use crate::models::status::Status;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/rider/dashboard", get(dashboard))
        .route("/rider/parcels", get(list_parcels))
        .route("/rider/parcels/:id/advance", post(advance_parcel))
        .route_layer(middleware::from_fn_with_state(state, require_rider))
}

#[derive(Debug, Deserialize)]
pub struct AdvanceRequest {
    pub current_status: String,
}

#[derive(Debug, Serialize)]
pub struct StatusChange {
    pub parcel_id: i64,
    pub previous: Option<String>,
    pub status: Status,
}

async fn dashboard(State(state): State<Arc<AppState>>) -> Result<Json<DashboardView>, AppError> {
    let parcels = state.backend.rider_parcels().await?;
    Ok(Json(DashboardView::new(Role::Rider, parcels)))
}

async fn list_parcels(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Parcel>>, AppError> {
    let parcels = state.backend.rider_parcels().await?;
    Ok(Json(query.apply(parcels)))
}

/// One-click advance. The transition is checked before anything is sent, so a
/// delivered or unrecognised parcel never reaches the backend.
async fn advance_parcel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<AdvanceRequest>,
) -> Result<Json<StatusChange>, AppError> {
    let next = advance(&payload.current_status)?;

    state.backend.update_status(id, next).await?;
    info!(parcel_id = id, from = %payload.current_status, to = %next, "parcel advanced");

    Ok(Json(StatusChange {
        parcel_id: id,
        previous: Some(payload.current_status),
        status: next,
    }))
}
