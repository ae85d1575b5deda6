use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use tripdesk_booking::{ConfirmMembershipRequest, ConfirmMembershipResponse};
use tripdesk_shared::Masked;

use crate::repository::MemberRepository;
use crate::{CoreError, CoreResult};

/// A row of the membership directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRecord {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub expires_at: DateTime<Utc>,
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// All three keys must agree with the directory entry.
pub fn matches_request(member: &MemberRecord, req: &ConfirmMembershipRequest) -> bool {
    member.email.eq_ignore_ascii_case(req.email.trim())
        && normalize_phone(&member.phone) == normalize_phone(&req.phone)
        && normalize_name(&member.full_name) == normalize_name(&req.name)
}

pub fn classify(
    req: &ConfirmMembershipRequest,
    member: Option<&MemberRecord>,
    now: DateTime<Utc>,
) -> ConfirmMembershipResponse {
    match member {
        Some(m) if matches_request(m, req) => {
            if m.expires_at > now {
                ConfirmMembershipResponse::active()
            } else {
                ConfirmMembershipResponse::expired()
            }
        }
        _ => ConfirmMembershipResponse::not_a_member(),
    }
}

pub async fn confirm_membership(
    members: &dyn MemberRepository,
    req: &ConfirmMembershipRequest,
) -> CoreResult<ConfirmMembershipResponse> {
    if req.email.trim().is_empty() {
        return Err(CoreError::ValidationError("email is required".to_string()));
    }

    let member = members.find_by_email(req.email.trim()).await
        .map_err(|e| CoreError::InternalError(e.to_string()))?;

    let response = classify(req, member.as_ref(), Utc::now());
    info!("Membership lookup for {}: {:?}", Masked(&req.email), response.status);
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use tripdesk_booking::MembershipStatus;
    use crate::repository::RepoError;

    fn member(expires_in_days: i64) -> MemberRecord {
        MemberRecord {
            id: Uuid::new_v4(),
            full_name: "Ama  Boateng".to_string(),
            email: "Ama@X.com".to_string(),
            phone: "055 123 4567".to_string(),
            expires_at: Utc::now() + Duration::days(expires_in_days),
        }
    }

    fn request() -> ConfirmMembershipRequest {
        ConfirmMembershipRequest {
            name: "ama boateng".to_string(),
            email: "ama@x.com".to_string(),
            phone: "0551234567".to_string(),
        }
    }

    #[test]
    fn test_classify_outcomes() {
        let now = Utc::now();
        assert_eq!(classify(&request(), Some(&member(30)), now).status, MembershipStatus::Active);
        assert!(classify(&request(), Some(&member(30)), now).success);
        assert_eq!(classify(&request(), Some(&member(-1)), now).status, MembershipStatus::Expired);
        assert_eq!(classify(&request(), None, now).status, MembershipStatus::None);
    }

    #[test]
    fn test_phone_mismatch_is_not_a_member() {
        let mut req = request();
        req.phone = "0209999999".to_string();
        let resp = classify(&req, Some(&member(30)), Utc::now());
        assert_eq!(resp.status, MembershipStatus::None);
        assert!(!resp.success);
    }

    struct OneMember(MemberRecord);

    #[async_trait]
    impl MemberRepository for OneMember {
        async fn find_by_email(&self, email: &str) -> Result<Option<MemberRecord>, RepoError> {
            Ok(Some(self.0.clone()).filter(|m| m.email.eq_ignore_ascii_case(email)))
        }
    }

    #[tokio::test]
    async fn test_confirm_membership_through_repository() {
        let repo = OneMember(member(10));
        let resp = confirm_membership(&repo, &request()).await.unwrap();
        assert_eq!(resp.status, MembershipStatus::Active);

        let mut blank = request();
        blank.email = " ".to_string();
        assert!(matches!(confirm_membership(&repo, &blank).await, Err(CoreError::ValidationError(_))));
    }
}
