use std::sync::Arc;
use tokio::sync::broadcast;
use tripdesk_catalog::PricingEngine;
use tripdesk_core::cache::HotCache;
use tripdesk_core::repository::{BookingRepository, MemberRepository, ProductRepository, TripRepository};
use tripdesk_shared::models::BookingEvent;
use tripdesk_store::app_config::BusinessRules;

use crate::metrics::Metrics;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub trips: Arc<dyn TripRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub members: Arc<dyn MemberRepository>,
    pub cache: Arc<dyn HotCache>,
    pub events: broadcast::Sender<BookingEvent>,
    pub pricing: Arc<PricingEngine>,
    pub auth: AuthConfig,
    pub business_rules: BusinessRules,
    pub metrics: Arc<Metrics>,
}
