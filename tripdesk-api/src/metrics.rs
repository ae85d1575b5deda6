use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::error::AppError;
use crate::state::AppState;

/// Process-local counters, exported at `GET /metrics`.
pub struct Metrics {
    registry: Registry,
    pub bookings_created: IntCounter,
    pub bookings_replayed: IntCounter,
    pub booking_status_changes: IntCounterVec,
    pub membership_lookups: IntCounterVec,
    pub rate_limited: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("tripdesk".to_string()), None)?;

        let bookings_created = IntCounter::new("bookings_created_total", "Bookings persisted")?;
        let bookings_replayed = IntCounter::new(
            "bookings_replayed_total",
            "Create-booking requests answered from an earlier idempotency key",
        )?;
        let booking_status_changes = IntCounterVec::new(
            Opts::new("booking_status_changes_total", "Admin status transitions"),
            &["status"],
        )?;
        let membership_lookups = IntCounterVec::new(
            Opts::new("membership_lookups_total", "Membership confirmations by outcome"),
            &["status"],
        )?;
        let rate_limited = IntCounter::new("rate_limited_requests_total", "Requests refused with 429")?;

        registry.register(Box::new(bookings_created.clone()))?;
        registry.register(Box::new(bookings_replayed.clone()))?;
        registry.register(Box::new(booking_status_changes.clone()))?;
        registry.register(Box::new(membership_lookups.clone()))?;
        registry.register(Box::new(rate_limited.clone()))?;

        Ok(Self {
            registry,
            bookings_created,
            bookings_replayed,
            booking_status_changes,
            membership_lookups,
            rate_limited,
        })
    }

    /// Prometheus text exposition format
    pub fn render(&self) -> Result<String, AppError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = state.metrics.render()?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}
