use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;
use tripdesk_booking::{Booking, BookingStatus};
use tripdesk_catalog::{Product, Trip};
use crate::membership::MemberRecord;

/// Error type shared by every repository. Callers may downcast to
/// `tripdesk_catalog::InventoryError` for slot failures.
pub type RepoError = Box<dyn std::error::Error + Send + Sync>;

/// Repository trait for trip catalog access
#[async_trait]
pub trait TripRepository: Send + Sync {
    async fn get_trip(&self, id: &str) -> Result<Option<Trip>, RepoError>;

    async fn list_trips(&self) -> Result<Vec<Trip>, RepoError>;

    /// Insert or replace, dates included.
    async fn save_trip(&self, trip: &Trip) -> Result<(), RepoError>;

    /// `false` when no such trip existed.
    async fn delete_trip(&self, id: &str) -> Result<bool, RepoError>;

    async fn reserve_slots(&self, trip_id: &str, date_id: &str, quantity: u32) -> Result<(), RepoError>;

    async fn release_slots(&self, trip_id: &str, date_id: &str, quantity: u32) -> Result<(), RepoError>;
}

/// Admin listing filter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingFilter {
    pub trip_id: Option<String>,
    pub status: Option<BookingStatus>,
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        self.trip_id.as_ref().map_or(true, |t| *t == booking.trip_id)
            && self.status.map_or(true, |s| s == booking.status)
    }
}

/// Repository trait for booking data access
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create_booking(&self, booking: &Booking) -> Result<(), RepoError>;

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, RepoError>;

    async fn find_by_idempotency_key(&self, key: Uuid) -> Result<Option<Booking>, RepoError>;

    /// Newest first
    async fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, RepoError>;

    /// Moves the booking to `to` only while it is still in `from`.
    /// Returns `false` when another writer changed it first.
    async fn transition_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<bool, RepoError>;
}

/// Repository trait for storefront products
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create_product(&self, product: &Product) -> Result<Uuid, RepoError>;

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, RepoError>;

    async fn list_products(&self) -> Result<Vec<Product>, RepoError>;
}

/// Membership directory lookups
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Match on email, case-insensitively.
    async fn find_by_email(&self, email: &str) -> Result<Option<MemberRecord>, RepoError>;
}
