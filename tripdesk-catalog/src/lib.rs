pub mod trip;
pub mod product;
pub mod pricing;
pub mod inventory;

pub use trip::{Trip, TripDate, TripDateDraft, TripDraft, TripError, MAX_CAPACITY, MAX_PRICE};
pub use product::{Product, ProductDraft, ProductError};
pub use pricing::{PriceBreakdown, PricingConfig, PricingEngine};
pub use inventory::InventoryError;
