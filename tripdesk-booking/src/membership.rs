//! Membership confirmation gate shown after the personal-info step.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::BookingError;
use crate::steps::StepSequencer;

pub const LOADING_MESSAGE: &str = "Confirming your membership...";
pub const ACTIVE_MESSAGE: &str = "Membership confirmed! Your member benefits will be applied to this booking.";
pub const EXPIRED_MESSAGE: &str = "Your membership has expired. You can continue with your booking at the standard price.";
pub const NON_MEMBER_MESSAGE: &str = "We could not find a membership for these details. You can continue with your booking as a guest.";

/// Payload of `POST /v1/memberships/confirm`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfirmMembershipRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Active,
    Expired,
    None,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Active => "active",
            MembershipStatus::Expired => "expired",
            MembershipStatus::None => "none",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfirmMembershipResponse {
    pub success: bool,
    pub status: MembershipStatus,
    pub message: String,
}

impl ConfirmMembershipResponse {
    pub fn active() -> Self {
        Self { success: true, status: MembershipStatus::Active, message: "Membership is active".to_string() }
    }

    pub fn expired() -> Self {
        Self { success: false, status: MembershipStatus::Expired, message: "Membership has expired".to_string() }
    }

    pub fn not_a_member() -> Self {
        Self { success: false, status: MembershipStatus::None, message: "No membership found".to_string() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipOutcome {
    Active,
    Expired,
    NonMember,
}

impl From<&ConfirmMembershipResponse> for MembershipOutcome {
    fn from(resp: &ConfirmMembershipResponse) -> Self {
        match (resp.success, resp.status) {
            (true, _) => MembershipOutcome::Active,
            (false, MembershipStatus::Expired) => MembershipOutcome::Expired,
            (false, _) => MembershipOutcome::NonMember,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateAction {
    ApplyDiscountAndContinue,
    Continue,
}

impl GateAction {
    pub fn label(&self) -> &'static str {
        match self {
            GateAction::ApplyDiscountAndContinue => "Apply Discount & Continue",
            GateAction::Continue => "Continue",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    Pending,
    Settled(MembershipOutcome),
}

#[derive(Debug, Clone)]
pub struct MembershipGate {
    state: GateState,
    discount_applied: bool,
}

impl MembershipGate {
    pub fn new() -> Self {
        Self { state: GateState::Idle, discount_applied: false }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// A new lookup replaces whatever an earlier pass through step 1 decided.
    pub fn begin(&mut self) {
        self.state = GateState::Pending;
        self.discount_applied = false;
    }

    /// Record the lookup result. A failed lookup counts as "not a member".
    pub fn settle(&mut self, result: Result<ConfirmMembershipResponse, BookingError>) -> MembershipOutcome {
        let outcome = match result {
            Ok(resp) => MembershipOutcome::from(&resp),
            Err(e) => {
                warn!("Membership lookup failed, continuing as non-member: {}", e);
                MembershipOutcome::NonMember
            }
        };
        info!("Membership gate settled: {:?}", outcome);
        self.state = GateState::Settled(outcome);
        outcome
    }

    pub fn message(&self) -> Option<&'static str> {
        match self.state {
            GateState::Idle => None,
            GateState::Pending => Some(LOADING_MESSAGE),
            GateState::Settled(MembershipOutcome::Active) => Some(ACTIVE_MESSAGE),
            GateState::Settled(MembershipOutcome::Expired) => Some(EXPIRED_MESSAGE),
            GateState::Settled(MembershipOutcome::NonMember) => Some(NON_MEMBER_MESSAGE),
        }
    }

    /// Buttons on offer: exactly one once settled, none before.
    pub fn actions(&self) -> Vec<GateAction> {
        match self.state {
            GateState::Settled(MembershipOutcome::Active) => vec![GateAction::ApplyDiscountAndContinue],
            GateState::Settled(_) => vec![GateAction::Continue],
            GateState::Idle | GateState::Pending => Vec::new(),
        }
    }

    /// Run the offered action, advance the wizard, drop the outcome.
    pub fn take_action(&mut self, action: GateAction, steps: &mut StepSequencer) -> Result<(), BookingError> {
        if !matches!(self.state, GateState::Settled(_)) {
            return Err(BookingError::GateNotSettled);
        }
        if !self.actions().contains(&action) {
            return Err(BookingError::ActionNotOffered);
        }

        if action == GateAction::ApplyDiscountAndContinue {
            // Flag only; pricing ignores it for now.
            self.discount_applied = true;
        }

        steps.next_step();
        self.state = GateState::Idle;
        Ok(())
    }

    pub fn discount_applied(&self) -> bool {
        self.discount_applied
    }
}

impl Default for MembershipGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::Step;

    #[test]
    fn test_active_member_single_action_advances_once() {
        let mut gate = MembershipGate::new();
        let mut steps = StepSequencer::new();

        gate.begin();
        assert_eq!(gate.message(), Some(LOADING_MESSAGE));
        assert!(gate.actions().is_empty());

        gate.settle(Ok(ConfirmMembershipResponse::active()));
        let actions = gate.actions();
        assert_eq!(actions, vec![GateAction::ApplyDiscountAndContinue]);
        assert_eq!(gate.message(), Some(ACTIVE_MESSAGE));

        gate.take_action(actions[0], &mut steps).unwrap();
        assert_eq!(steps.current(), Step::TravelDetails);
        assert!(gate.discount_applied());

        // Outcome is discarded, a second click does nothing
        assert!(matches!(gate.take_action(actions[0], &mut steps), Err(BookingError::GateNotSettled)));
        assert_eq!(steps.current(), Step::TravelDetails);
    }

    #[test]
    fn test_expired_member_continues_without_discount() {
        let mut gate = MembershipGate::new();
        let mut steps = StepSequencer::new();

        gate.begin();
        assert_eq!(gate.settle(Ok(ConfirmMembershipResponse::expired())), MembershipOutcome::Expired);
        assert_eq!(gate.actions(), vec![GateAction::Continue]);
        assert!(matches!(
            gate.take_action(GateAction::ApplyDiscountAndContinue, &mut steps),
            Err(BookingError::ActionNotOffered)
        ));

        gate.take_action(GateAction::Continue, &mut steps).unwrap();
        assert_eq!(steps.current(), Step::TravelDetails);
        assert!(!gate.discount_applied());
    }

    #[test]
    fn test_resubmitting_as_non_member_clears_discount() {
        let mut gate = MembershipGate::new();
        let mut steps = StepSequencer::new();

        gate.begin();
        gate.settle(Ok(ConfirmMembershipResponse::active()));
        gate.take_action(GateAction::ApplyDiscountAndContinue, &mut steps).unwrap();
        assert!(gate.discount_applied());

        steps.back();
        gate.begin();
        assert!(!gate.discount_applied());
        gate.settle(Ok(ConfirmMembershipResponse::not_a_member()));
        gate.take_action(GateAction::Continue, &mut steps).unwrap();

        assert_eq!(steps.current(), Step::TravelDetails);
        assert!(!gate.discount_applied());
    }

    #[test]
    fn test_failed_lookup_settles_as_non_member() {
        let mut gate = MembershipGate::new();
        gate.begin();
        let outcome = gate.settle(Err(BookingError::Api("connection refused".to_string())));

        assert_eq!(outcome, MembershipOutcome::NonMember);
        assert_eq!(gate.message(), Some(NON_MEMBER_MESSAGE));
        assert_eq!(gate.actions(), vec![GateAction::Continue]);
    }

    #[test]
    fn test_action_before_settlement_rejected() {
        let mut gate = MembershipGate::new();
        let mut steps = StepSequencer::new();
        gate.begin();
        assert!(gate.take_action(GateAction::Continue, &mut steps).is_err());
        assert_eq!(steps.current(), Step::PersonalInfo);
    }

    #[test]
    fn test_response_wire_format() {
        let resp: ConfirmMembershipResponse =
            serde_json::from_str(r#"{"success":false,"status":"expired","message":"x"}"#).unwrap();
        assert_eq!(MembershipOutcome::from(&resp), MembershipOutcome::Expired);
    }
}
