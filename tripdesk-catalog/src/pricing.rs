use serde::{Deserialize, Serialize};
use crate::trip::Trip;

/// Price summary shown on the review step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceBreakdown {
    pub base_price: i64,

    /// Member discount line. Always zero: the membership flag does not
    /// change the price yet.
    pub discount: i64,

    /// `base_price + trip.discount`. The trip-level `discount` field is
    /// added, not subtracted; booking totals depend on this.
    pub total: i64,

    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// ISO currency code printed next to every amount
    pub currency: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: "GHS".to_string(),
        }
    }
}

pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn breakdown(&self, trip: &Trip) -> PriceBreakdown {
        PriceBreakdown {
            base_price: trip.base_price,
            discount: 0,
            total: trip.base_price.saturating_add(trip.discount),
            currency: self.config.currency.clone(),
        }
    }

    /// Amount charged for a booking of `people` travellers. Saturates
    /// rather than wrapping for rows stored before price bounds existed.
    pub fn booking_total(&self, trip: &Trip, people: u32) -> i64 {
        self.breakdown(trip).total.saturating_mul(i64::from(people))
    }

    /// Per-person price used by catalog listings and price filters
    pub fn listed_price(&self, trip: &Trip) -> i64 {
        self.breakdown(trip).total
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new(PricingConfig::default())
    }
}
