use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::middleware;
use axum::routing::{get, post, put};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::rest::guard::require_staff;
use crate::api::rest::rider::StatusChange;
use crate::api::rest::{DashboardView, ListQuery};
use crate::error::AppError;
use crate::lifecycle::charges::charges_after_edit;
use crate::lifecycle::transitions::set_status_unconstrained;
use crate::models::parcel::{CreatedParcel, NewParcel, Parcel, ParcelUpdate};
use crate::models::role::Role;
use crate::state::AppState;
use crate::validation::require;

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/staff/dashboard", get(dashboard))
        .route("/staff/parcels", get(list_parcels).post(create_parcel))
        .route("/staff/parcels/:id", get(get_parcel).put(edit_parcel))
        .route("/staff/parcels/:id/rider", post(assign_rider))
        .route("/staff/parcels/:id/status", put(set_status))
        .route_layer(middleware::from_fn_with_state(state, require_staff))
}

#[derive(Debug, Deserialize)]
pub struct OnBehalfQuery {
    #[serde(default)]
    pub customer_email: String,
}

#[derive(Debug, Deserialize)]
pub struct AssignRiderRequest {
    pub rider_id: i64,
}

#[derive(Debug, Serialize)]
pub struct AssignmentView {
    pub parcel_id: i64,
    pub rider_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct EditView {
    pub parcel_id: i64,
    pub estimated_charges: f64,
}

async fn dashboard(State(state): State<Arc<AppState>>) -> Result<Json<DashboardView>, AppError> {
    let parcels = state.backend.staff_parcels().await?;
    Ok(Json(DashboardView::new(Role::Staff, parcels)))
}

async fn list_parcels(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Parcel>>, AppError> {
    let parcels = state.backend.staff_parcels().await?;
    Ok(Json(query.apply(parcels)))
}

async fn create_parcel(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OnBehalfQuery>,
    Json(payload): Json<NewParcel>,
) -> Result<Json<CreatedParcel>, AppError> {
    require("customer_email", &query.customer_email)?;
    payload.validate()?;

    let created = state
        .backend
        .create_staff_parcel(query.customer_email.trim(), &payload)
        .await?;
    info!(tracking_number = %created.tracking_number, "parcel created for customer");
    Ok(Json(created))
}

async fn get_parcel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Parcel>, AppError> {
    Ok(Json(state.backend.staff_parcel(id).await?))
}

async fn edit_parcel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<ParcelUpdate>,
) -> Result<Json<EditView>, AppError> {
    payload.validate()?;

    let previous = state.backend.staff_parcel(id).await?;
    let estimated_charges = charges_after_edit(&previous, payload.weight_kg)?;
    state.backend.update_parcel(id, &payload).await?;

    info!(parcel_id = id, "parcel edited");
    Ok(Json(EditView {
        parcel_id: id,
        estimated_charges,
    }))
}

async fn assign_rider(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<AssignRiderRequest>,
) -> Result<Json<AssignmentView>, AppError> {
    state.backend.assign_rider(id, payload.rider_id).await?;
    info!(parcel_id = id, rider_id = payload.rider_id, "rider assigned");

    Ok(Json(AssignmentView {
        parcel_id: id,
        rider_id: payload.rider_id,
    }))
}

/// Free-choice status override. Regressions are allowed here; the backend
/// decides whether staff may apply them.
async fn set_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<SetStatusRequest>,
) -> Result<Json<StatusChange>, AppError> {
    let status = set_status_unconstrained(&payload.status)?;

    state.backend.update_status(id, status).await?;
    info!(parcel_id = id, status = %status, "status overridden by staff");

    Ok(Json(StatusChange {
        parcel_id: id,
        previous: None,
        status,
    }))
}
