use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use crate::error::{BookingError, FieldErrors};
use crate::form::{PersonalInfo, PersonalInfoDraft, TravelDetails, TravelDetailsDraft};

/// Booking status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(BookingStatus::Pending),
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            "COMPLETED" => Ok(BookingStatus::Completed),
            other => Err(format!("unknown booking status: {}", other)),
        }
    }
}

/// Payload of `POST /v1/bookings`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateBookingRequest {
    pub personal_info: PersonalInfo,
    pub travel_details: TravelDetails,
    pub trip_id: String,
    pub selected_date: String,
    pub number_of_people: u32,
}

impl CreateBookingRequest {
    /// Re-run section validation on a payload received over the wire.
    pub fn validated(self) -> Result<Self, BookingError> {
        if self.number_of_people == 0 {
            let mut errors = FieldErrors::new();
            errors.add("number_of_people", "at least one traveller is required");
            return Err(BookingError::Validation(errors));
        }

        let personal_info = PersonalInfoDraft::from(self.personal_info).validate()?;
        let travel_details = TravelDetailsDraft::from(self.travel_details).validate()?;

        Ok(Self {
            personal_info,
            travel_details,
            ..self
        })
    }
}

/// A reservation against one trip departure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub trip_id: String,
    pub selected_date: String,
    pub personal_info: PersonalInfo,
    pub travel_details: TravelDetails,
    pub number_of_people: u32,
    pub total_price: i64,
    pub status: BookingStatus,
    pub idempotency_key: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(req: CreateBookingRequest, total_price: i64, idempotency_key: Option<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            trip_id: req.trip_id,
            selected_date: req.selected_date,
            personal_info: req.personal_info,
            travel_details: req.travel_details,
            number_of_people: req.number_of_people,
            total_price,
            status: BookingStatus::Pending,
            idempotency_key,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn update_status(&mut self, new_status: BookingStatus) {
        self.status = new_status;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Gender;
    use chrono::NaiveDate;

    fn request() -> CreateBookingRequest {
        CreateBookingRequest {
            personal_info: PersonalInfo {
                first_name: "Ama".to_string(),
                last_name: "Boateng".to_string(),
                id_card: None,
                email: "ama@x.com".to_string(),
                phone: "0551234567".to_string(),
                not_participating: false,
            },
            travel_details: TravelDetails {
                date_of_birth: NaiveDate::from_ymd_opt(1994, 3, 12).unwrap(),
                gender: Gender::Female,
                street_address: "12 Oxford Street".to_string(),
                address_line2: Some("  ".to_string()),
                city: "Accra".to_string(),
                zip_code: "GA-123".to_string(),
            },
            trip_id: "T1".to_string(),
            selected_date: "D1".to_string(),
            number_of_people: 1,
        }
    }

    #[test]
    fn test_validated_normalizes_blank_optionals() {
        let req = request().validated().unwrap();
        assert_eq!(req.travel_details.address_line2, None);
        assert_eq!(req.trip_id, "T1");
    }

    #[test]
    fn test_validated_rejects_bad_email() {
        let mut req = request();
        req.personal_info.email = "not-an-email".to_string();
        match req.validated() {
            Err(BookingError::Validation(errors)) => assert!(errors.get("email").is_some()),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validated_rejects_empty_party() {
        let mut req = request();
        req.number_of_people = 0;
        assert!(matches!(req.validated(), Err(BookingError::Validation(_))));
    }

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!("confirmed".parse::<BookingStatus>().unwrap(), BookingStatus::Confirmed);
        assert!("SHIPPED".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn test_new_booking_is_pending() {
        let booking = Booking::new(request(), 550, None);
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.total_price, 550);
    }
}
