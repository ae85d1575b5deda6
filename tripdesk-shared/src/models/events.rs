use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingEventKind {
    Created,
    StatusChanged,
}

/// Emitted on every booking write; the admin dashboard streams these.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BookingEvent {
    pub booking_id: Uuid,
    pub trip_id: String,
    pub selected_date: String,
    pub kind: BookingEventKind,
    pub status: String,
    pub total_price: i64,
    pub timestamp: i64,
}

impl BookingEvent {
    pub fn new(
        kind: BookingEventKind,
        booking_id: Uuid,
        trip_id: impl Into<String>,
        selected_date: impl Into<String>,
        status: impl Into<String>,
        total_price: i64,
    ) -> Self {
        Self {
            booking_id,
            trip_id: trip_id.into(),
            selected_date: selected_date.into(),
            kind,
            status: status.into(),
            total_price,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}
