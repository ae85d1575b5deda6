use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tripdesk_catalog::{PriceBreakdown, Trip};
use tripdesk_core::search::{search_trips, SearchPage, TripSearchQuery};

use crate::error::AppError;
use crate::state::AppState;

/// A trip with the price the review step will show
#[derive(Debug, Serialize)]
pub struct TripView {
    #[serde(flatten)]
    pub trip: Trip,
    pub price: PriceBreakdown,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/trips", get(list_trips))
        .route("/v1/trips/{id}", get(get_trip))
}

async fn list_trips(
    State(state): State<AppState>,
    Query(query): Query<TripSearchQuery>,
) -> Result<Json<SearchPage<Trip>>, AppError> {
    let trips = state.trips.list_trips().await.map_err(AppError::repo)?;
    let page = search_trips(trips, &query, &state.pricing);
    tracing::debug!("Trip search matched {} (page {})", page.total, page.page);
    Ok(Json(page))
}

async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TripView>, AppError> {
    let trip = state.trips.get_trip(&id).await
        .map_err(AppError::repo)?
        .filter(|t| t.is_active)
        .ok_or_else(|| AppError::NotFoundError(format!("Trip not found: {}", id)))?;

    let price = state.pricing.breakdown(&trip);
    Ok(Json(TripView { trip, price }))
}
