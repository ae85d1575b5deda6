use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use tripdesk_catalog::{PriceBreakdown, PricingEngine, Trip, TripDate};
use tripdesk_shared::Masked;
use uuid::Uuid;

use crate::error::BookingError;
use crate::form::{BookingFormData, PersonalInfoDraft, SectionUpdate, TravelDetailsDraft};
use crate::membership::{ConfirmMembershipRequest, ConfirmMembershipResponse, GateAction, MembershipGate};
use crate::models::{Booking, CreateBookingRequest};
use crate::review::{ReviewSubmit, SubmitStart};
use crate::steps::{Step, StepSequencer};

/// Group size sent with every booking from the wizard.
pub const WIZARD_PARTY_SIZE: u32 = 1;

/// Backend calls the wizard depends on
#[async_trait]
pub trait BookingApi: Send + Sync {
    async fn fetch_trip(&self, trip_id: &str) -> Result<Trip, BookingError>;

    async fn confirm_membership(
        &self,
        req: &ConfirmMembershipRequest,
    ) -> Result<ConfirmMembershipResponse, BookingError>;

    async fn create_booking(
        &self,
        req: &CreateBookingRequest,
        idempotency_key: Uuid,
    ) -> Result<Booking, BookingError>;
}

/// Route `/booking/:id/:date`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRoute {
    pub trip_id: String,
    pub date_id: String,
}

impl BookingRoute {
    pub fn new(trip_id: impl Into<String>, date_id: impl Into<String>) -> Self {
        Self { trip_id: trip_id.into(), date_id: date_id.into() }
    }

    /// Parse `/booking/{trip}/{date}`.
    pub fn parse(path: &str) -> Option<Self> {
        let mut parts = path.trim_matches('/').split('/');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some("booking"), Some(trip), Some(date), None) if !trip.is_empty() && !date.is_empty() => {
                Some(Self::new(trip, date))
            }
            _ => None,
        }
    }
}

/// The booking page: sole owner of the form aggregate.
pub struct BookingWizard<A: BookingApi> {
    api: Arc<A>,
    trip: Trip,
    date: TripDate,
    pricing: PricingEngine,
    form: BookingFormData,
    steps: StepSequencer,
    gate: MembershipGate,
    review: ReviewSubmit,
}

impl<A: BookingApi> BookingWizard<A> {
    /// Fetch the trip once and pin the chosen departure.
    pub async fn open(api: Arc<A>, route: &BookingRoute, pricing: PricingEngine) -> Result<Self, BookingError> {
        let trip = api.fetch_trip(&route.trip_id).await?;
        let date = trip.find_date(&route.date_id)
            .cloned()
            .ok_or_else(|| BookingError::DateNotFound {
                trip_id: route.trip_id.clone(),
                date_id: route.date_id.clone(),
            })?;

        info!("Booking wizard opened for trip {} departure {}", trip.id, date.id);

        Ok(Self {
            api,
            trip,
            date,
            pricing,
            form: BookingFormData::new(),
            steps: StepSequencer::new(),
            gate: MembershipGate::new(),
            review: ReviewSubmit::new(),
        })
    }

    pub fn trip(&self) -> &Trip {
        &self.trip
    }

    pub fn selected_date(&self) -> &TripDate {
        &self.date
    }

    pub fn form(&self) -> &BookingFormData {
        &self.form
    }

    pub fn current_step(&self) -> Step {
        self.steps.current()
    }

    pub fn gate(&self) -> &MembershipGate {
        &self.gate
    }

    pub fn review(&self) -> &ReviewSubmit {
        &self.review
    }

    pub fn discount_applied(&self) -> bool {
        self.gate.discount_applied()
    }

    fn expect_step(&self, expected: Step) -> Result<(), BookingError> {
        let actual = self.steps.current();
        if actual != expected {
            return Err(BookingError::StepMismatch { expected, actual });
        }
        Ok(())
    }

    /// Step 1 submit: validate, store, then run the membership lookup.
    pub async fn submit_personal_info(&mut self, input: PersonalInfoDraft) -> Result<&MembershipGate, BookingError> {
        self.expect_step(Step::PersonalInfo)?;

        let mut candidate = self.form.personal_info.clone();
        candidate.merge(input.clone());
        let info = candidate.validate()?;
        self.form.update_section(SectionUpdate::PersonalInfo(input));

        let req = ConfirmMembershipRequest {
            name: info.full_name(),
            email: info.email.clone(),
            phone: info.phone.clone(),
        };
        info!(
            "Confirming membership for {:?} / {:?}",
            Masked(req.email.as_str()),
            Masked(req.phone.as_str())
        );

        self.gate.begin();
        let result = self.api.confirm_membership(&req).await;
        self.gate.settle(result);
        Ok(&self.gate)
    }

    /// Press the single button the gate offers.
    pub fn proceed_from_gate(&mut self, action: GateAction) -> Result<Step, BookingError> {
        self.expect_step(Step::PersonalInfo)?;
        self.gate.take_action(action, &mut self.steps)?;
        Ok(self.steps.current())
    }

    /// Step 2 submit.
    pub fn submit_travel_details(&mut self, input: TravelDetailsDraft) -> Result<Step, BookingError> {
        self.expect_step(Step::TravelDetails)?;

        let mut candidate = self.form.travel_details.clone();
        candidate.merge(input.clone());
        candidate.validate()?;
        self.form.update_section(SectionUpdate::TravelDetails(input));

        Ok(self.steps.next_step())
    }

    pub fn back(&mut self) -> Step {
        self.steps.back()
    }

    pub fn price_summary(&self) -> PriceBreakdown {
        self.pricing.breakdown(&self.trip)
    }

    /// "Confirm & Proceed". Sends at most one create-booking request per
    /// wizard; later presses return the booking already made.
    pub async fn confirm(&mut self) -> Result<Booking, BookingError> {
        self.expect_step(Step::Review)?;

        self.form.update_section(SectionUpdate::TripId(self.trip.id.clone()));
        self.form.update_section(SectionUpdate::SelectedDate(self.date.id.clone()));
        self.form.update_section(SectionUpdate::NumberOfPeople(WIZARD_PARTY_SIZE));
        let req = self.form.complete()?;

        let idempotency_key = match self.review.begin()? {
            SubmitStart::Done(booking) => return Ok(booking),
            SubmitStart::Send { idempotency_key } => idempotency_key,
        };

        let result = self.api.create_booking(&req, idempotency_key).await;
        self.review.finish(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Gender;
    use crate::membership::{GateState, MembershipOutcome, NON_MEMBER_MESSAGE};
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingApi {
        membership: Option<ConfirmMembershipResponse>,
        membership_calls: Mutex<Vec<ConfirmMembershipRequest>>,
        bookings: Mutex<Vec<(CreateBookingRequest, Uuid)>>,
    }

    fn trip() -> Trip {
        Trip {
            id: "T1".to_string(),
            title: "Mole Safari".to_string(),
            destination: "Damongo".to_string(),
            category: "wildlife".to_string(),
            description: None,
            itinerary: Some("Game drives and walking safari".to_string()),
            base_price: 500,
            discount: 50,
            min_group_size: 1,
            max_group_size: 8,
            dates: vec![TripDate {
                id: "D1".to_string(),
                start_date: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
                end_date: Utc.with_ymd_and_hms(2025, 6, 7, 0, 0, 0).unwrap(),
                is_available: true,
                available_slots: 8,
            }],
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[async_trait]
    impl BookingApi for RecordingApi {
        async fn fetch_trip(&self, trip_id: &str) -> Result<Trip, BookingError> {
            if trip_id == "T1" {
                Ok(trip())
            } else {
                Err(BookingError::Api("404 Not Found".to_string()))
            }
        }

        async fn confirm_membership(
            &self,
            req: &ConfirmMembershipRequest,
        ) -> Result<ConfirmMembershipResponse, BookingError> {
            self.membership_calls.lock().unwrap().push(req.clone());
            self.membership.clone().ok_or_else(|| BookingError::Api("timeout".to_string()))
        }

        async fn create_booking(
            &self,
            req: &CreateBookingRequest,
            idempotency_key: Uuid,
        ) -> Result<Booking, BookingError> {
            self.bookings.lock().unwrap().push((req.clone(), idempotency_key));
            Ok(Booking::new(req.clone(), 550, Some(idempotency_key)))
        }
    }

    fn ama() -> PersonalInfoDraft {
        PersonalInfoDraft {
            first_name: Some("Ama".to_string()),
            last_name: Some("Boateng".to_string()),
            id_card: None,
            email: Some("ama@x.com".to_string()),
            phone: Some("0551234567".to_string()),
            not_participating: Some(false),
        }
    }

    fn address() -> TravelDetailsDraft {
        TravelDetailsDraft {
            date_of_birth: NaiveDate::from_ymd_opt(1994, 3, 12),
            gender: Some(Gender::Female),
            street_address: Some("12 Oxford Street".to_string()),
            address_line2: Some("Osu".to_string()),
            city: Some("Accra".to_string()),
            zip_code: Some("GA-123".to_string()),
        }
    }

    async fn open(api: RecordingApi) -> (Arc<RecordingApi>, BookingWizard<RecordingApi>) {
        let api = Arc::new(api);
        let wizard = BookingWizard::open(api.clone(), &BookingRoute::new("T1", "D1"), PricingEngine::default())
            .await
            .unwrap();
        (api, wizard)
    }

    #[test]
    fn test_route_parse() {
        assert_eq!(BookingRoute::parse("/booking/T1/D1"), Some(BookingRoute::new("T1", "D1")));
        assert_eq!(BookingRoute::parse("/booking/T1"), None);
        assert_eq!(BookingRoute::parse("/trips/T1/D1"), None);
    }

    #[tokio::test]
    async fn test_unknown_departure() {
        let api = Arc::new(RecordingApi::default());
        let result = BookingWizard::open(api, &BookingRoute::new("T1", "D9"), PricingEngine::default()).await;
        assert!(matches!(result, Err(BookingError::DateNotFound { .. })));
    }

    #[tokio::test]
    async fn test_non_member_scenario_books_once() {
        let (api, mut wizard) = open(RecordingApi {
            membership: Some(ConfirmMembershipResponse::not_a_member()),
            ..Default::default()
        })
        .await;

        let gate = wizard.submit_personal_info(ama()).await.unwrap();
        assert_eq!(gate.state(), GateState::Settled(MembershipOutcome::NonMember));
        assert_eq!(gate.message(), Some(NON_MEMBER_MESSAGE));
        assert_eq!(gate.actions(), vec![GateAction::Continue]);

        let calls = api.membership_calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "Ama Boateng");
        assert_eq!(calls[0].phone, "0551234567");

        assert_eq!(wizard.proceed_from_gate(GateAction::Continue).unwrap(), Step::TravelDetails);
        assert_eq!(wizard.submit_travel_details(address()).unwrap(), Step::Review);

        let summary = wizard.price_summary();
        assert_eq!(summary.total, 550);
        assert_eq!(summary.discount, 0);

        let booking = wizard.confirm().await.unwrap();
        let again = wizard.confirm().await.unwrap();
        assert_eq!(booking.id, again.id);

        let sent = api.bookings.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        let (req, key) = &sent[0];
        assert_eq!(req.trip_id, "T1");
        assert_eq!(req.selected_date, "D1");
        assert_eq!(req.number_of_people, 1);
        assert_eq!(*key, wizard.review().idempotency_key());
        assert!(!wizard.discount_applied());
    }

    #[tokio::test]
    async fn test_group_size_always_sent_as_one() {
        let (api, mut wizard) = open(RecordingApi {
            membership: Some(ConfirmMembershipResponse::active()),
            ..Default::default()
        })
        .await;

        wizard.submit_personal_info(ama()).await.unwrap();
        wizard.proceed_from_gate(GateAction::ApplyDiscountAndContinue).unwrap();
        wizard.submit_travel_details(address()).unwrap();

        // A group size typed in elsewhere does not survive submission
        wizard.form.update_section(SectionUpdate::NumberOfPeople(5));
        wizard.confirm().await.unwrap();

        let sent = api.bookings.lock().unwrap().clone();
        assert_eq!(sent[0].0.number_of_people, 1);
        assert!(wizard.discount_applied());
        // The flag has no effect on price
        assert_eq!(wizard.price_summary().total, 550);
    }

    #[tokio::test]
    async fn test_invalid_step_one_does_not_advance_or_lookup() {
        let (api, mut wizard) = open(RecordingApi::default()).await;
        let mut input = ama();
        input.email = Some("ama-at-x".to_string());

        assert!(matches!(wizard.submit_personal_info(input).await, Err(BookingError::Validation(_))));
        assert_eq!(wizard.current_step(), Step::PersonalInfo);
        assert!(api.membership_calls.lock().unwrap().is_empty());
        assert_eq!(wizard.form().personal_info, PersonalInfoDraft::default());
    }

    #[tokio::test]
    async fn test_lookup_failure_continues_as_non_member() {
        let (_api, mut wizard) = open(RecordingApi::default()).await;
        let gate = wizard.submit_personal_info(ama()).await.unwrap();
        assert_eq!(gate.actions(), vec![GateAction::Continue]);
        assert_eq!(wizard.proceed_from_gate(GateAction::Continue).unwrap(), Step::TravelDetails);
    }

    #[tokio::test]
    async fn test_back_keeps_entered_data() {
        let (_api, mut wizard) = open(RecordingApi {
            membership: Some(ConfirmMembershipResponse::expired()),
            ..Default::default()
        })
        .await;

        wizard.submit_personal_info(ama()).await.unwrap();
        wizard.proceed_from_gate(GateAction::Continue).unwrap();
        assert_eq!(wizard.back(), Step::PersonalInfo);
        assert_eq!(wizard.back(), Step::PersonalInfo);
        assert_eq!(wizard.form().personal_info.first_name.as_deref(), Some("Ama"));

        // Confirm is only reachable from the review step
        assert!(matches!(wizard.confirm().await, Err(BookingError::StepMismatch { .. })));
    }
}
