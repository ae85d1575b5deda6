use axum::{extract::State, routing::post, Json, Router};
use tripdesk_booking::{ConfirmMembershipRequest, ConfirmMembershipResponse};
use tripdesk_core::membership::confirm_membership;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/memberships/confirm", post(confirm))
}

/// Always answers 200 for a well-formed request; "not a member" is an
/// outcome, not an error.
async fn confirm(
    State(state): State<AppState>,
    Json(req): Json<ConfirmMembershipRequest>,
) -> Result<Json<ConfirmMembershipResponse>, AppError> {
    let response = confirm_membership(state.members.as_ref(), &req)
        .await
        .map_err(AppError::core)?;

    state.metrics.membership_lookups
        .with_label_values(&[response.status.as_str()])
        .inc();

    Ok(Json(response))
}
