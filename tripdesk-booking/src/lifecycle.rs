use crate::error::BookingError;
use crate::models::{Booking, BookingStatus};

impl BookingStatus {
    /// Allowed moves: PENDING → CONFIRMED → COMPLETED, and
    /// PENDING | CONFIRMED → CANCELLED.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
        )
    }

    /// Whether seats held by a booking go back to the departure.
    pub fn releases_slots(&self) -> bool {
        *self == BookingStatus::Cancelled
    }
}

impl Booking {
    pub fn transition(&mut self, next: BookingStatus) -> Result<(), BookingError> {
        if !self.status.can_transition_to(next) {
            return Err(BookingError::InvalidTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }

        self.update_status(next);
        Ok(())
    }

    pub fn confirm(&mut self) -> Result<(), BookingError> {
        self.transition(BookingStatus::Confirmed)
    }

    pub fn cancel(&mut self) -> Result<(), BookingError> {
        self.transition(BookingStatus::Cancelled)
    }

    pub fn complete(&mut self) -> Result<(), BookingError> {
        self.transition(BookingStatus::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{Gender, PersonalInfo, TravelDetails};
    use crate::models::CreateBookingRequest;
    use chrono::NaiveDate;

    fn booking() -> Booking {
        let req = CreateBookingRequest {
            personal_info: PersonalInfo {
                first_name: "Kofi".to_string(),
                last_name: "Mensah".to_string(),
                id_card: None,
                email: "kofi@example.com".to_string(),
                phone: "0241112222".to_string(),
                not_participating: false,
            },
            travel_details: TravelDetails {
                date_of_birth: NaiveDate::from_ymd_opt(1988, 1, 2).unwrap(),
                gender: Gender::Male,
                street_address: "4 Ring Road".to_string(),
                address_line2: None,
                city: "Kumasi".to_string(),
                zip_code: "AK-039".to_string(),
            },
            trip_id: "T1".to_string(),
            selected_date: "D1".to_string(),
            number_of_people: 1,
        };
        Booking::new(req, 550, None)
    }

    #[test]
    fn test_booking_lifecycle() {
        let mut b = booking();
        assert_eq!(b.status, BookingStatus::Pending);

        b.confirm().unwrap();
        assert_eq!(b.status, BookingStatus::Confirmed);

        b.complete().unwrap();
        assert_eq!(b.status, BookingStatus::Completed);
    }

    #[test]
    fn test_invalid_transition() {
        let mut b = booking();

        // Cannot complete before confirmation
        assert!(matches!(b.complete(), Err(BookingError::InvalidTransition { .. })));

        b.cancel().unwrap();
        assert!(b.confirm().is_err());
        assert!(b.status.releases_slots());
    }
}
