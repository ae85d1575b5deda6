//! Booking form aggregate.
//!
//! Each wizard step edits one section. Sections are held as drafts (every
//! field optional) and only become [`PersonalInfo`] / [`TravelDetails`] once
//! the step validates them.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{BookingError, FieldErrors};
use crate::models::CreateBookingRequest;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonalInfoDraft {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub id_card: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub not_participating: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct PersonalInfo {
    #[validate(length(min = 1, max = 100, message = "first name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "last name is required"))]
    pub last_name: String,
    pub id_card: Option<String>,
    #[validate(email(message = "enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 7, max = 20, message = "enter a valid phone number"))]
    pub phone: String,
    #[serde(default)]
    pub not_participating: bool,
}

impl PersonalInfo {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TravelDetailsDraft {
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub street_address: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct TravelDetails {
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    #[validate(length(min = 1, max = 200, message = "street address is required"))]
    pub street_address: String,
    pub address_line2: Option<String>,
    #[validate(length(min = 1, max = 100, message = "city is required"))]
    pub city: String,
    #[validate(length(min = 1, max = 20, message = "zip code is required"))]
    pub zip_code: String,
}

/// Overwrite `$dst.$field` wherever `$src.$field` is present.
macro_rules! merge_present {
    ($dst:ident, $src:ident, $($field:ident),+) => {
        $( if $src.$field.is_some() { $dst.$field = $src.$field; } )+
    };
}

fn required<T: Clone>(value: &Option<T>, field: &str, errors: &mut FieldErrors) -> Option<T> {
    if value.is_none() {
        errors.add(field, "this field is required");
    }
    value.clone()
}

fn required_text(value: &Option<String>, field: &str, errors: &mut FieldErrors) -> Option<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => {
            errors.add(field, "this field is required");
            None
        }
    }
}

impl PersonalInfoDraft {
    pub fn merge(&mut self, partial: PersonalInfoDraft) {
        merge_present!(self, partial, first_name, last_name, id_card, email, phone, not_participating);
    }

    pub fn validate(&self) -> Result<PersonalInfo, BookingError> {
        let mut errors = FieldErrors::new();
        let first_name = required_text(&self.first_name, "first_name", &mut errors);
        let last_name = required_text(&self.last_name, "last_name", &mut errors);
        let email = required_text(&self.email, "email", &mut errors);
        let phone = required_text(&self.phone, "phone", &mut errors);

        let (Some(first_name), Some(last_name), Some(email), Some(phone)) = (first_name, last_name, email, phone) else {
            return Err(BookingError::Validation(errors));
        };

        let info = PersonalInfo {
            first_name,
            last_name,
            id_card: self.id_card.clone().filter(|v| !v.trim().is_empty()),
            email,
            phone,
            not_participating: self.not_participating.unwrap_or(false),
        };
        info.validate()?;
        Ok(info)
    }
}

impl TravelDetailsDraft {
    pub fn merge(&mut self, partial: TravelDetailsDraft) {
        merge_present!(self, partial, date_of_birth, gender, street_address, address_line2, city, zip_code);
    }

    pub fn validate(&self) -> Result<TravelDetails, BookingError> {
        let mut errors = FieldErrors::new();
        let date_of_birth = required(&self.date_of_birth, "date_of_birth", &mut errors);
        let gender = required(&self.gender, "gender", &mut errors);
        let street_address = required_text(&self.street_address, "street_address", &mut errors);
        let city = required_text(&self.city, "city", &mut errors);
        let zip_code = required_text(&self.zip_code, "zip_code", &mut errors);

        if let Some(dob) = date_of_birth {
            if dob >= Utc::now().date_naive() {
                errors.add("date_of_birth", "date of birth must be in the past");
            }
        }

        let (Some(date_of_birth), Some(gender), Some(street_address), Some(city), Some(zip_code)) =
            (date_of_birth, gender, street_address, city, zip_code)
        else {
            return Err(BookingError::Validation(errors));
        };
        errors.into_result()?;

        let details = TravelDetails {
            date_of_birth,
            gender,
            street_address,
            address_line2: self.address_line2.clone().filter(|v| !v.trim().is_empty()),
            city,
            zip_code,
        };
        details.validate()?;
        Ok(details)
    }
}

impl From<PersonalInfo> for PersonalInfoDraft {
    fn from(info: PersonalInfo) -> Self {
        Self {
            first_name: Some(info.first_name),
            last_name: Some(info.last_name),
            id_card: info.id_card,
            email: Some(info.email),
            phone: Some(info.phone),
            not_participating: Some(info.not_participating),
        }
    }
}

impl From<TravelDetails> for TravelDetailsDraft {
    fn from(details: TravelDetails) -> Self {
        Self {
            date_of_birth: Some(details.date_of_birth),
            gender: Some(details.gender),
            street_address: Some(details.street_address),
            address_line2: details.address_line2,
            city: Some(details.city),
            zip_code: Some(details.zip_code),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SectionKey {
    PersonalInfo,
    TravelDetails,
    TripId,
    SelectedDate,
    NumberOfPeople,
}

/// Partial data for one section of the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionUpdate {
    PersonalInfo(PersonalInfoDraft),
    TravelDetails(TravelDetailsDraft),
    TripId(String),
    SelectedDate(String),
    NumberOfPeople(u32),
}

impl SectionUpdate {
    pub fn key(&self) -> SectionKey {
        match self {
            SectionUpdate::PersonalInfo(_) => SectionKey::PersonalInfo,
            SectionUpdate::TravelDetails(_) => SectionKey::TravelDetails,
            SectionUpdate::TripId(_) => SectionKey::TripId,
            SectionUpdate::SelectedDate(_) => SectionKey::SelectedDate,
            SectionUpdate::NumberOfPeople(_) => SectionKey::NumberOfPeople,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingFormData {
    pub personal_info: PersonalInfoDraft,
    pub travel_details: TravelDetailsDraft,
    pub trip_id: Option<String>,
    pub selected_date: Option<String>,
    pub number_of_people: Option<u32>,
}

impl BookingFormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shallow-merge `update` into its section. Other sections are untouched.
    pub fn update_section(&mut self, update: SectionUpdate) {
        match update {
            SectionUpdate::PersonalInfo(partial) => self.personal_info.merge(partial),
            SectionUpdate::TravelDetails(partial) => self.travel_details.merge(partial),
            SectionUpdate::TripId(id) => self.trip_id = Some(id),
            SectionUpdate::SelectedDate(id) => self.selected_date = Some(id),
            SectionUpdate::NumberOfPeople(n) => self.number_of_people = Some(n),
        }
    }

    /// Freeze the aggregate into a create-booking payload.
    pub fn complete(&self) -> Result<CreateBookingRequest, BookingError> {
        let trip_id = self.trip_id.clone().ok_or(BookingError::Incomplete("trip_id"))?;
        let selected_date = self.selected_date.clone().ok_or(BookingError::Incomplete("selected_date"))?;
        let number_of_people = self.number_of_people.ok_or(BookingError::Incomplete("number_of_people"))?;

        Ok(CreateBookingRequest {
            personal_info: self.personal_info.validate()?,
            travel_details: self.travel_details.validate()?,
            trip_id,
            selected_date,
            number_of_people,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn ama() -> PersonalInfoDraft {
        PersonalInfoDraft {
            first_name: Some("Ama".to_string()),
            last_name: Some("Boateng".to_string()),
            id_card: None,
            email: Some("ama@x.com".to_string()),
            phone: Some("0551234567".to_string()),
            not_participating: Some(false),
        }
    }

    fn accra_address() -> TravelDetailsDraft {
        TravelDetailsDraft {
            date_of_birth: NaiveDate::from_ymd_opt(1994, 3, 12),
            gender: Some(Gender::Female),
            street_address: Some("12 Oxford Street".to_string()),
            address_line2: None,
            city: Some("Accra".to_string()),
            zip_code: Some("GA-123".to_string()),
        }
    }

    #[test]
    fn test_update_section_leaves_other_sections_alone() {
        let mut form = BookingFormData::new();
        form.update_section(SectionUpdate::PersonalInfo(ama()));
        form.update_section(SectionUpdate::SelectedDate("D1".to_string()));
        let before = form.clone();

        form.update_section(SectionUpdate::TravelDetails(accra_address()));

        assert_eq!(form.personal_info, before.personal_info);
        assert_eq!(form.selected_date, before.selected_date);
        assert_eq!(form.trip_id, None);
        assert_eq!(form.travel_details, accra_address());
    }

    #[test]
    fn test_update_section_is_shallow_merge() {
        let mut form = BookingFormData::new();
        form.update_section(SectionUpdate::PersonalInfo(ama()));
        form.update_section(SectionUpdate::PersonalInfo(PersonalInfoDraft {
            phone: Some("0209876543".to_string()),
            ..Default::default()
        }));

        assert_eq!(form.personal_info.first_name.as_deref(), Some("Ama"));
        assert_eq!(form.personal_info.email.as_deref(), Some("ama@x.com"));
        assert_eq!(form.personal_info.phone.as_deref(), Some("0209876543"));
    }

    #[test]
    fn test_isolation_over_update_sequence() {
        let updates = vec![
            SectionUpdate::TripId("T1".to_string()),
            SectionUpdate::PersonalInfo(ama()),
            SectionUpdate::NumberOfPeople(4),
            SectionUpdate::TravelDetails(accra_address()),
            SectionUpdate::SelectedDate("D1".to_string()),
            SectionUpdate::NumberOfPeople(1),
        ];

        let mut form = BookingFormData::new();
        for update in updates {
            let key = update.key();
            let before = form.clone();
            form.update_section(update);

            if key != SectionKey::PersonalInfo { assert_eq!(form.personal_info, before.personal_info); }
            if key != SectionKey::TravelDetails { assert_eq!(form.travel_details, before.travel_details); }
            if key != SectionKey::TripId { assert_eq!(form.trip_id, before.trip_id); }
            if key != SectionKey::SelectedDate { assert_eq!(form.selected_date, before.selected_date); }
            if key != SectionKey::NumberOfPeople { assert_eq!(form.number_of_people, before.number_of_people); }
        }
    }

    #[test]
    fn test_personal_info_validation_reports_fields() {
        let draft = PersonalInfoDraft {
            first_name: Some("  ".to_string()),
            email: Some("ama@x.com".to_string()),
            ..Default::default()
        };

        let Err(BookingError::Validation(errors)) = draft.validate() else {
            panic!("expected validation failure");
        };
        assert!(errors.get("first_name").is_some());
        assert!(errors.get("last_name").is_some());
        assert!(errors.get("phone").is_some());
        assert!(errors.get("email").is_none());
    }

    #[test]
    fn test_invalid_email_rejected() {
        let mut draft = ama();
        draft.email = Some("not-an-email".to_string());

        let Err(BookingError::Validation(errors)) = draft.validate() else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.get("email"), Some("enter a valid email address"));
    }

    #[test]
    fn test_travel_details_future_birth_date() {
        let mut draft = accra_address();
        draft.date_of_birth = Some(Utc::now().date_naive() + chrono::Duration::days(2));
        assert!(matches!(draft.validate(), Err(BookingError::Validation(_))));
    }

    #[test]
    fn test_complete_requires_every_section() {
        let mut form = BookingFormData::new();
        form.update_section(SectionUpdate::PersonalInfo(ama()));
        form.update_section(SectionUpdate::TravelDetails(accra_address()));
        form.update_section(SectionUpdate::TripId("T1".to_string()));
        assert!(matches!(form.complete(), Err(BookingError::Incomplete("selected_date"))));

        form.update_section(SectionUpdate::SelectedDate("D1".to_string()));
        form.update_section(SectionUpdate::NumberOfPeople(1));
        let req = form.complete().unwrap();
        assert_eq!(req.personal_info.full_name(), "Ama Boateng");
        assert_eq!(req.travel_details.city, "Accra");
    }
}
