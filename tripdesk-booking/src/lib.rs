pub mod error;
pub mod form;
pub mod models;
pub mod lifecycle;
pub mod steps;
pub mod membership;
pub mod review;
pub mod wizard;
pub mod client;

pub use error::{BookingError, FieldErrors};
pub use form::{BookingFormData, Gender, PersonalInfo, PersonalInfoDraft, SectionKey, SectionUpdate, TravelDetails, TravelDetailsDraft};
pub use models::{Booking, BookingStatus, CreateBookingRequest};
pub use steps::{Step, StepSequencer};
pub use membership::{ConfirmMembershipRequest, ConfirmMembershipResponse, GateAction, MembershipGate, MembershipOutcome, MembershipStatus};
pub use review::{ReviewSubmit, SubmitStart};
pub use wizard::{BookingApi, BookingRoute, BookingWizard};
pub use client::HttpBookingClient;
