use tracing::{info, warn};
use uuid::Uuid;

use crate::error::BookingError;
use crate::models::Booking;

#[derive(Debug, Clone)]
enum SubmitState {
    Idle,
    InFlight,
    Submitted(Booking),
}

/// What the confirm button should do next.
#[derive(Debug, Clone)]
pub enum SubmitStart {
    /// Send the create-booking request with this key.
    Send { idempotency_key: Uuid },
    /// Already booked; hand back the stored booking.
    Done(Booking),
}

/// Submission guard for the review step.
///
/// One idempotency key is minted per wizard session and reused on retries,
/// so the server collapses repeats into a single booking. Locally, a second
/// confirm while a request is in flight is refused.
#[derive(Debug, Clone)]
pub struct ReviewSubmit {
    idempotency_key: Uuid,
    state: SubmitState,
}

impl ReviewSubmit {
    pub fn new() -> Self {
        Self {
            idempotency_key: Uuid::new_v4(),
            state: SubmitState::Idle,
        }
    }

    pub fn idempotency_key(&self) -> Uuid {
        self.idempotency_key
    }

    /// Drives the disabled state of the confirm button.
    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, SubmitState::InFlight)
    }

    pub fn submitted(&self) -> Option<&Booking> {
        match &self.state {
            SubmitState::Submitted(b) => Some(b),
            _ => None,
        }
    }

    pub fn begin(&mut self) -> Result<SubmitStart, BookingError> {
        match &self.state {
            SubmitState::InFlight => {
                warn!("Confirm pressed while booking {} is in flight", self.idempotency_key);
                Err(BookingError::SubmissionInFlight(self.idempotency_key))
            }
            SubmitState::Submitted(b) => Ok(SubmitStart::Done(b.clone())),
            SubmitState::Idle => {
                self.state = SubmitState::InFlight;
                Ok(SubmitStart::Send { idempotency_key: self.idempotency_key })
            }
        }
    }

    /// Settle the in-flight request. A failure re-enables the button; the key
    /// is kept so a retry cannot create a second booking.
    pub fn finish(&mut self, result: Result<Booking, BookingError>) -> Result<Booking, BookingError> {
        match result {
            Ok(booking) => {
                info!("Booking {} created for trip {}", booking.id, booking.trip_id);
                self.state = SubmitState::Submitted(booking.clone());
                Ok(booking)
            }
            Err(e) => {
                self.state = SubmitState::Idle;
                Err(e)
            }
        }
    }
}

impl Default for ReviewSubmit {
    fn default() -> Self {
        Self::new()
    }
}
