use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::steps::Step;

/// Field name -> message, shown inline next to the offending input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(pub BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        // First message per field wins.
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), BookingError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(BookingError::Validation(self))
        }
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            if let Some(e) = errs.first() {
                let message = e.message.as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                fields.add(field.to_string(), message);
            }
        }
        fields
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter()
            .map(|(field, msg)| format!("{}: {}", field, msg))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Trip {trip_id} has no departure {date_id}")]
    DateNotFound {
        trip_id: String,
        date_id: String,
    },

    #[error("Booking form incomplete: missing {0}")]
    Incomplete(&'static str),

    #[error("Action not allowed on step {actual:?}, expected {expected:?}")]
    StepMismatch {
        expected: Step,
        actual: Step,
    },

    #[error("Membership confirmation has not settled")]
    GateNotSettled,

    #[error("Membership action not offered for this outcome")]
    ActionNotOffered,

    #[error("A booking request is already in flight (key {0})")]
    SubmissionInFlight(Uuid),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition {
        from: String,
        to: String,
    },

    #[error("Booking API request failed: {0}")]
    Api(String),
}

impl From<validator::ValidationErrors> for BookingError {
    fn from(errors: validator::ValidationErrors) -> Self {
        BookingError::Validation(errors.into())
    }
}

impl From<reqwest::Error> for BookingError {
    fn from(err: reqwest::Error) -> Self {
        BookingError::Api(err.to_string())
    }
}
