use std::sync::Arc;

use axum::extract::{Query, State};
use axum::middleware;
use axum::routing::get;
use axum::Json;
use axum::Router;
use tracing::info;

use crate::api::rest::guard::require_customer;
use crate::api::rest::{DashboardView, ListQuery};
use crate::error::AppError;
use crate::models::parcel::{CreatedParcel, NewParcel, Parcel};
use crate::models::role::Role;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/customer/dashboard", get(dashboard))
        .route("/customer/parcels", get(list_parcels).post(send_parcel))
        .route_layer(middleware::from_fn_with_state(state, require_customer))
}

async fn dashboard(State(state): State<Arc<AppState>>) -> Result<Json<DashboardView>, AppError> {
    let parcels = state.backend.customer_parcels().await?;
    Ok(Json(DashboardView::new(Role::Customer, parcels)))
}

async fn list_parcels(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Parcel>>, AppError> {
    let parcels = state.backend.customer_parcels().await?;
    Ok(Json(query.apply(parcels)))
}

async fn send_parcel(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewParcel>,
) -> Result<Json<CreatedParcel>, AppError> {
    payload.validate()?;

    let created = state.backend.create_customer_parcel(&payload).await?;
    info!(tracking_number = %created.tracking_number, charges = created.charges, "parcel booked");
    Ok(Json(created))
}
