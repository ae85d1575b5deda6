use axum::{
    extract::{Path, State},
    http::{HeaderName, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use axum_extra::headers::{self, Header};
use axum_extra::TypedHeader;
use tracing::{error, info, warn};
use tripdesk_booking::{Booking, BookingError, CreateBookingRequest};
use tripdesk_core::cache::idempotency_cache_key;
use tripdesk_shared::models::{BookingEvent, BookingEventKind};
use tripdesk_shared::Masked;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

static IDEMPOTENCY_KEY: HeaderName = HeaderName::from_static("idempotency-key");

/// `Idempotency-Key: <uuid>` sent by the booking wizard, one per session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdempotencyKey(pub Uuid);

impl Header for IdempotencyKey {
    fn name() -> &'static HeaderName {
        &IDEMPOTENCY_KEY
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(headers::Error::invalid)?;
        let text = value.to_str().map_err(|_| headers::Error::invalid())?;
        Uuid::parse_str(text.trim())
            .map(IdempotencyKey)
            .map_err(|_| headers::Error::invalid())
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        if let Ok(value) = HeaderValue::from_str(&self.0.to_string()) {
            values.extend(std::iter::once(value));
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking))
        .route("/v1/bookings/{id}", get(get_booking))
}

/// 201 with the new booking, or 200 with the booking an earlier request
/// under the same key created.
async fn create_booking(
    State(state): State<AppState>,
    idempotency: Option<TypedHeader<IdempotencyKey>>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let Some(TypedHeader(IdempotencyKey(key))) = idempotency else {
        let booking = place_booking(&state, req, None).await?;
        return Ok((StatusCode::CREATED, Json(booking)));
    };

    // 1. Replay a finished request
    if let Some(existing) = state.bookings.find_by_idempotency_key(key).await.map_err(AppError::repo)? {
        info!("Replaying booking {} for idempotency key {}", existing.id, key);
        state.metrics.bookings_replayed.inc();
        return Ok((StatusCode::OK, Json(existing)));
    }

    // 2. Claim the key so a concurrent duplicate cannot slip past step 1
    let cache_key = idempotency_cache_key(&key);
    let ttl = state.business_rules.idempotency_ttl_seconds;
    if let Some(holder) = state.cache.claim_key(&cache_key, "processing", ttl).await.map_err(AppError::repo)? {
        warn!("Idempotency key {} already claimed ({})", key, holder);
        return Err(AppError::ConflictError(format!("Booking request {} is already being processed", key)));
    }

    // 3. Place it; a failed attempt frees the key for a retry
    match place_booking(&state, req, Some(key)).await {
        Ok(booking) => Ok((StatusCode::CREATED, Json(booking))),
        Err(err) => {
            if let Err(e) = state.cache.release_key(&cache_key).await {
                error!("Failed to release idempotency key {}: {}", key, e);
            }
            Err(err)
        }
    }
}

async fn place_booking(
    state: &AppState,
    req: CreateBookingRequest,
    idempotency_key: Option<Uuid>,
) -> Result<Booking, AppError> {
    let req = req.validated().map_err(AppError::booking)?;

    let trip = state.trips.get_trip(&req.trip_id).await
        .map_err(AppError::repo)?
        .filter(|t| t.is_active)
        .ok_or_else(|| AppError::NotFoundError(format!("Trip not found: {}", req.trip_id)))?;

    let date = trip.find_date(&req.selected_date).ok_or_else(|| {
        AppError::booking(BookingError::DateNotFound {
            trip_id: trip.id.clone(),
            date_id: req.selected_date.clone(),
        })
    })?;

    if !trip.accepts_party(req.number_of_people) {
        return Err(AppError::ValidationError(format!(
            "number_of_people must be between 1 and {}",
            trip.max_group_size
        )));
    }
    if !date.is_bookable_for(req.number_of_people) {
        return Err(AppError::ConflictError(format!(
            "Departure {} cannot take {} more traveller(s)",
            date.id, req.number_of_people
        )));
    }

    let total = state.pricing.booking_total(&trip, req.number_of_people);
    let (trip_id, date_id, people) = (trip.id.clone(), date.id.clone(), req.number_of_people);

    state.trips.reserve_slots(&trip_id, &date_id, people).await.map_err(AppError::repo)?;

    let booking = Booking::new(req, total, idempotency_key);
    if let Err(e) = state.bookings.create_booking(&booking).await {
        if let Err(release_err) = state.trips.release_slots(&trip_id, &date_id, people).await {
            error!("Failed to release {} slot(s) on {}/{}: {}", people, trip_id, date_id, release_err);
        }
        return Err(AppError::repo(e));
    }

    info!(
        "Booking {} created: trip {} departure {} total {} contact {}",
        booking.id, booking.trip_id, booking.selected_date, booking.total_price,
        Masked(&booking.personal_info.email)
    );
    state.metrics.bookings_created.inc();

    // No subscribers is fine
    let _ = state.events.send(BookingEvent::new(
        BookingEventKind::Created,
        booking.id,
        booking.trip_id.clone(),
        booking.selected_date.clone(),
        booking.status.as_str(),
        booking.total_price,
    ));

    Ok(booking)
}

async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    state.bookings.get_booking(id).await
        .map_err(AppError::repo)?
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("Booking not found: {}", id)))
}
