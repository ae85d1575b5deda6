use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One departure window of a trip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TripDate {
    pub id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_available: bool,
    pub available_slots: u32,
}

impl TripDate {
    /// Open for `people` travellers right now.
    pub fn is_bookable_for(&self, people: u32) -> bool {
        self.is_available && self.available_slots >= people
    }

    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }
}

/// A bookable travel package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: String,
    pub title: String,
    pub destination: String,
    pub category: String,
    pub description: Option<String>,
    pub itinerary: Option<String>,
    pub base_price: i64,
    pub discount: i64,
    pub min_group_size: u32,
    pub max_group_size: u32,
    pub dates: Vec<TripDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    pub fn find_date(&self, date_id: &str) -> Option<&TripDate> {
        self.dates.iter().find(|d| d.id == date_id)
    }

    pub fn find_date_mut(&mut self, date_id: &str) -> Option<&mut TripDate> {
        self.dates.iter_mut().find(|d| d.id == date_id)
    }

    /// At least one departure still takes a single traveller.
    pub fn has_bookable_date(&self) -> bool {
        self.dates.iter().any(|d| d.is_bookable_for(1))
    }

    /// A single booking may not exceed the group cap. `min_group_size` is the
    /// departure threshold and is not checked per booking.
    pub fn accepts_party(&self, people: u32) -> bool {
        people >= 1 && people <= self.max_group_size
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TripError {
    #[error("Invalid trip: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripDateDraft {
    pub id: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_available: bool,
    pub available_slots: u32,
}

/// Admin payload for creating or replacing a trip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripDraft {
    pub title: String,
    pub destination: String,
    pub category: String,
    pub description: Option<String>,
    pub itinerary: Option<String>,
    pub base_price: i64,
    #[serde(default)]
    pub discount: i64,
    #[serde(default = "default_min_group")]
    pub min_group_size: u32,
    pub max_group_size: u32,
    #[serde(default)]
    pub dates: Vec<TripDateDraft>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Upper bound for `base_price` and `discount`
pub const MAX_PRICE: i64 = 1_000_000_000;

/// Upper bound for group sizes and departure slots
pub const MAX_CAPACITY: u32 = 100_000;

fn default_true() -> bool { true }
fn default_min_group() -> u32 { 1 }

impl TripDraft {
    pub fn validate(&self) -> Result<(), TripError> {
        if self.title.trim().is_empty() {
            return Err(TripError::Invalid("title is required".to_string()));
        }
        if self.base_price < 0 || self.discount < 0 {
            return Err(TripError::Invalid("prices must not be negative".to_string()));
        }
        if self.base_price > MAX_PRICE || self.discount > MAX_PRICE {
            return Err(TripError::Invalid(format!("prices must not exceed {}", MAX_PRICE)));
        }
        if self.max_group_size > MAX_CAPACITY || self.dates.iter().any(|d| d.available_slots > MAX_CAPACITY) {
            return Err(TripError::Invalid(format!("group sizes and slots must not exceed {}", MAX_CAPACITY)));
        }
        if self.min_group_size > self.max_group_size {
            return Err(TripError::Invalid(format!(
                "min_group_size {} exceeds max_group_size {}",
                self.min_group_size, self.max_group_size
            )));
        }
        if let Some(d) = self.dates.iter().find(|d| d.end_date < d.start_date) {
            return Err(TripError::Invalid(format!("date window ends before it starts ({})", d.start_date)));
        }
        Ok(())
    }

    /// Build the stored trip. Dates without an id get a fresh one.
    pub fn into_trip(self, id: String, created_at: DateTime<Utc>) -> Result<Trip, TripError> {
        self.validate()?;
        let dates = self.dates.into_iter()
            .map(|d| TripDate {
                id: d.id.unwrap_or_else(|| Uuid::new_v4().simple().to_string()),
                start_date: d.start_date,
                end_date: d.end_date,
                is_available: d.is_available,
                available_slots: d.available_slots,
            })
            .collect();

        Ok(Trip {
            id,
            title: self.title,
            destination: self.destination,
            category: self.category,
            description: self.description,
            itinerary: self.itinerary,
            base_price: self.base_price,
            discount: self.discount,
            min_group_size: self.min_group_size,
            max_group_size: self.max_group_size,
            dates,
            is_active: self.is_active,
            created_at,
            updated_at: Utc::now(),
        })
    }
}
