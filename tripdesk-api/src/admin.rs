use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, patch, post, put},
    Extension, Json, Router,
};
use chrono::Utc;
use futures_util::stream::{Stream, StreamExt};
use serde::Deserialize;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{error, info, warn};
use tripdesk_booking::{Booking, BookingStatus};
use tripdesk_catalog::{Product, ProductDraft, Trip, TripDraft};
use tripdesk_core::repository::BookingFilter;
use tripdesk_shared::models::{BookingEvent, BookingEventKind};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::{
    admin_auth_middleware, require_permission, AdminClaims, PERM_BOOKINGS_READ, PERM_BOOKINGS_WRITE,
    PERM_CATALOG_WRITE,
};
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/admin/bookings", get(list_bookings))
        .route("/v1/admin/bookings/stream", get(booking_stream))
        .route("/v1/admin/bookings/{id}/status", patch(update_booking_status))
        .route("/v1/admin/trips", post(create_trip))
        .route("/v1/admin/trips/{id}", put(update_trip).delete(delete_trip))
        .route("/v1/admin/products", post(create_product))
        .route_layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}

// ============================================================================
// Booking Management Handlers
// ============================================================================

/// GET /v1/admin/bookings?trip_id=&status=
async fn list_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Query(filter): Query<BookingFilter>,
) -> Result<Json<Vec<Booking>>, AppError> {
    require_permission(&claims, PERM_BOOKINGS_READ)?;
    let bookings = state.bookings.list_bookings(&filter).await.map_err(AppError::repo)?;
    Ok(Json(bookings))
}

/// PATCH /v1/admin/bookings/{id}/status
async fn update_booking_status(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Booking>, AppError> {
    require_permission(&claims, PERM_BOOKINGS_WRITE)?;

    let mut booking = state.bookings.get_booking(id).await
        .map_err(AppError::repo)?
        .ok_or_else(|| AppError::NotFoundError(format!("Booking not found: {}", id)))?;

    let previous = booking.status;
    booking.transition(req.status).map_err(AppError::booking)?;

    let applied = state.bookings
        .transition_status(id, previous, booking.status)
        .await
        .map_err(AppError::repo)?;
    if !applied {
        return Err(AppError::ConflictError(format!(
            "Booking {} is no longer {}",
            id, previous
        )));
    }

    if booking.status.releases_slots() {
        if let Err(e) = state.trips
            .release_slots(&booking.trip_id, &booking.selected_date, booking.number_of_people)
            .await
        {
            // The departure may have been deleted since; the booking change stands.
            warn!("Could not release slots for cancelled booking {}: {}", id, e);
        }
    }

    info!("Booking {} moved {} -> {} by {}", id, previous, booking.status, claims.sub);
    state.metrics.booking_status_changes
        .with_label_values(&[booking.status.as_str()])
        .inc();

    let _ = state.events.send(BookingEvent::new(
        BookingEventKind::StatusChanged,
        booking.id,
        booking.trip_id.clone(),
        booking.selected_date.clone(),
        booking.status.as_str(),
        booking.total_price,
    ));

    Ok(Json(booking))
}

/// GET /v1/admin/bookings/stream
///
/// Server-sent events, one `booking` event per [`BookingEvent`]. Slow
/// consumers skip what they missed.
async fn booking_stream(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    require_permission(&claims, PERM_BOOKINGS_READ)?;

    let rx = state.events.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| async move {
        match msg {
            Ok(event) => match Event::default().event("booking").json_data(&event) {
                Ok(sse_event) => Some(Ok(sse_event)),
                Err(e) => {
                    error!("Failed to encode booking event: {}", e);
                    None
                }
            },
            Err(lagged) => {
                warn!("Booking stream subscriber lagged: {}", lagged);
                None
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

// ============================================================================
// Catalog Management Handlers
// ============================================================================

/// POST /v1/admin/trips
async fn create_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Json(draft): Json<TripDraft>,
) -> Result<(StatusCode, Json<Trip>), AppError> {
    require_permission(&claims, PERM_CATALOG_WRITE)?;

    let trip = draft
        .into_trip(Uuid::new_v4().simple().to_string(), Utc::now())
        .map_err(AppError::trip)?;
    state.trips.save_trip(&trip).await.map_err(AppError::repo)?;

    info!("Trip {} created: {}", trip.id, trip.title);
    Ok((StatusCode::CREATED, Json(trip)))
}

/// PUT /v1/admin/trips/{id}
async fn update_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Path(id): Path<String>,
    Json(draft): Json<TripDraft>,
) -> Result<Json<Trip>, AppError> {
    require_permission(&claims, PERM_CATALOG_WRITE)?;

    let existing = state.trips.get_trip(&id).await
        .map_err(AppError::repo)?
        .ok_or_else(|| AppError::NotFoundError(format!("Trip not found: {}", id)))?;

    let trip = draft.into_trip(existing.id, existing.created_at).map_err(AppError::trip)?;
    state.trips.save_trip(&trip).await.map_err(AppError::repo)?;

    Ok(Json(trip))
}

/// DELETE /v1/admin/trips/{id}
async fn delete_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    require_permission(&claims, PERM_CATALOG_WRITE)?;

    if state.trips.delete_trip(&id).await.map_err(AppError::repo)? {
        info!("Trip {} deleted by {}", id, claims.sub);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFoundError(format!("Trip not found: {}", id)))
    }
}

/// POST /v1/admin/products
async fn create_product(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Json(draft): Json<ProductDraft>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    require_permission(&claims, PERM_CATALOG_WRITE)?;

    let product = draft.into_product().map_err(AppError::product)?;
    state.products.create_product(&product).await.map_err(AppError::repo)?;

    Ok((StatusCode::CREATED, Json(product)))
}
