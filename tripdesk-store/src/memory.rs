//! In-memory backends for tests and `server.in_memory` dev mode.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;
use tripdesk_booking::{Booking, BookingStatus};
use tripdesk_catalog::{InventoryError, Product, Trip};
use tripdesk_core::cache::HotCache;
use tripdesk_core::membership::MemberRecord;
use tripdesk_core::repository::{
    BookingFilter, BookingRepository, MemberRepository, ProductRepository, RepoError, TripRepository,
};

#[derive(Default)]
pub struct MemoryTripRepository {
    trips: RwLock<HashMap<String, Trip>>,
}

impl MemoryTripRepository {
    pub fn with_trips(trips: Vec<Trip>) -> Self {
        Self {
            trips: RwLock::new(trips.into_iter().map(|t| (t.id.clone(), t)).collect()),
        }
    }
}

#[async_trait]
impl TripRepository for MemoryTripRepository {
    async fn get_trip(&self, id: &str) -> Result<Option<Trip>, RepoError> {
        Ok(self.trips.read().await.get(id).cloned())
    }

    async fn list_trips(&self) -> Result<Vec<Trip>, RepoError> {
        let mut trips: Vec<Trip> = self.trips.read().await.values().cloned().collect();
        trips.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(trips)
    }

    async fn save_trip(&self, trip: &Trip) -> Result<(), RepoError> {
        self.trips.write().await.insert(trip.id.clone(), trip.clone());
        Ok(())
    }

    async fn delete_trip(&self, id: &str) -> Result<bool, RepoError> {
        Ok(self.trips.write().await.remove(id).is_some())
    }

    async fn reserve_slots(&self, trip_id: &str, date_id: &str, quantity: u32) -> Result<(), RepoError> {
        let mut trips = self.trips.write().await;
        let trip = trips.get_mut(trip_id)
            .ok_or_else(|| InventoryError::NotFound(date_id.to_string()))?;
        trip.reserve_slots(date_id, quantity)?;
        Ok(())
    }

    async fn release_slots(&self, trip_id: &str, date_id: &str, quantity: u32) -> Result<(), RepoError> {
        let mut trips = self.trips.write().await;
        let trip = trips.get_mut(trip_id)
            .ok_or_else(|| InventoryError::NotFound(date_id.to_string()))?;
        trip.release_slots(date_id, quantity)?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryBookingRepository {
    bookings: RwLock<HashMap<Uuid, Booking>>,
}

#[async_trait]
impl BookingRepository for MemoryBookingRepository {
    async fn create_booking(&self, booking: &Booking) -> Result<(), RepoError> {
        let mut bookings = self.bookings.write().await;
        if let Some(key) = booking.idempotency_key {
            if bookings.values().any(|b| b.idempotency_key == Some(key)) {
                return Err(format!("duplicate idempotency key {}", key).into());
            }
        }
        bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, RepoError> {
        Ok(self.bookings.read().await.get(&id).cloned())
    }

    async fn find_by_idempotency_key(&self, key: Uuid) -> Result<Option<Booking>, RepoError> {
        Ok(self.bookings.read().await
            .values()
            .find(|b| b.idempotency_key == Some(key))
            .cloned())
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, RepoError> {
        let mut found: Vec<Booking> = self.bookings.read().await
            .values()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<bool, RepoError> {
        let mut bookings = self.bookings.write().await;
        match bookings.get_mut(&id) {
            Some(booking) if booking.status == from => {
                booking.update_status(to);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct MemoryProductRepository {
    products: RwLock<HashMap<Uuid, Product>>,
}

impl MemoryProductRepository {
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: RwLock::new(products.into_iter().map(|p| (p.id, p)).collect()),
        }
    }
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn create_product(&self, product: &Product) -> Result<Uuid, RepoError> {
        self.products.write().await.insert(product.id, product.clone());
        Ok(product.id)
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, RepoError> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepoError> {
        Ok(self.products.read().await.values().cloned().collect())
    }
}

#[derive(Default)]
pub struct MemoryMemberRepository {
    members: Vec<MemberRecord>,
}

impl MemoryMemberRepository {
    pub fn with_members(members: Vec<MemberRecord>) -> Self {
        Self { members }
    }
}

#[async_trait]
impl MemberRepository for MemoryMemberRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<MemberRecord>, RepoError> {
        Ok(self.members.iter().find(|m| m.email.eq_ignore_ascii_case(email)).cloned())
    }
}

/// Single-process stand-in for Redis
#[derive(Default)]
pub struct MemoryCache {
    keys: RwLock<HashMap<String, (String, Instant)>>,
    counters: RwLock<HashMap<String, (i64, Instant)>>,
}

#[async_trait]
impl HotCache for MemoryCache {
    async fn check_rate_limit(&self, key: &str, limit: i64, window_seconds: i64) -> Result<bool, RepoError> {
        let mut counters = self.counters.write().await;
        let now = Instant::now();
        let window = Duration::from_secs(window_seconds.max(0) as u64);

        let entry = counters.entry(key.to_string()).or_insert((0, now + window));
        if entry.1 <= now {
            *entry = (0, now + window);
        }
        entry.0 += 1;
        Ok(entry.0 <= limit)
    }

    async fn claim_key(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<Option<String>, RepoError> {
        let mut keys = self.keys.write().await;
        let now = Instant::now();

        if let Some((holder, expires)) = keys.get(key) {
            if *expires > now {
                return Ok(Some(holder.clone()));
            }
        }

        keys.insert(key.to_string(), (value.to_string(), now + Duration::from_secs(ttl_seconds)));
        Ok(None)
    }

    async fn release_key(&self, key: &str) -> Result<(), RepoError> {
        self.keys.write().await.remove(key);
        Ok(())
    }
}
