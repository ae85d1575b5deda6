use crate::trip::{Trip, TripDate};

/// Slot accounting for departure windows.
impl TripDate {
    /// Take `quantity` slots. The window closes when it runs out.
    pub fn reserve(&mut self, quantity: u32) -> Result<(), InventoryError> {
        if !self.is_available {
            return Err(InventoryError::Closed(self.id.clone()));
        }

        if self.available_slots < quantity {
            return Err(InventoryError::InsufficientSlots {
                requested: quantity,
                available: self.available_slots,
            });
        }

        self.available_slots -= quantity;
        if self.available_slots == 0 {
            self.is_available = false;
        }

        Ok(())
    }

    /// Give slots back (cancelled booking). Reopens a sold-out window.
    pub fn release(&mut self, quantity: u32) {
        let was_sold_out = self.available_slots == 0;
        self.available_slots = self.available_slots.saturating_add(quantity);
        if was_sold_out && quantity > 0 {
            self.is_available = true;
        }
    }
}

impl Trip {
    pub fn reserve_slots(&mut self, date_id: &str, quantity: u32) -> Result<(), InventoryError> {
        let date = self.find_date_mut(date_id)
            .ok_or_else(|| InventoryError::NotFound(date_id.to_string()))?;
        date.reserve(quantity)
    }

    pub fn release_slots(&mut self, date_id: &str, quantity: u32) -> Result<(), InventoryError> {
        let date = self.find_date_mut(date_id)
            .ok_or_else(|| InventoryError::NotFound(date_id.to_string()))?;
        date.release(quantity);
        Ok(())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("Trip date not found: {0}")]
    NotFound(String),

    #[error("Trip date is closed for booking: {0}")]
    Closed(String),

    #[error("Insufficient slots: requested {requested}, available {available}")]
    InsufficientSlots {
        requested: u32,
        available: u32,
    },
}
