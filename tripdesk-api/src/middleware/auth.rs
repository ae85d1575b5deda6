use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    http::StatusCode,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

pub const PERM_BOOKINGS_READ: &str = "bookings:read";
pub const PERM_BOOKINGS_WRITE: &str = "bookings:write";
pub const PERM_CATALOG_WRITE: &str = "catalog:write";

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub exp: usize,
}

// ============================================================================
// Admin Authentication Middleware
// ============================================================================

pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // 1. Extract token
    let auth_header = req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // 2. Decode JWT
    let token_data = decode::<AdminClaims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    ).map_err(|_| StatusCode::UNAUTHORIZED)?;

    // 3. Check role is ADMIN or SUPER_ADMIN
    if token_data.claims.role != "ADMIN" && token_data.claims.role != "SUPER_ADMIN" {
        tracing::warn!("Admin route refused for {} ({})", token_data.claims.sub, token_data.claims.role);
        return Err(StatusCode::FORBIDDEN);
    }

    // 4. Inject claims
    req.extensions_mut().insert(token_data.claims);

    Ok(next.run(req).await)
}

// ============================================================================
// Permission Check Helper
// ============================================================================

/// SUPER_ADMIN holds every permission.
pub fn has_permission(claims: &AdminClaims, permission: &str) -> bool {
    claims.role == "SUPER_ADMIN" || claims.permissions.iter().any(|p| p == permission)
}

pub fn require_permission(claims: &AdminClaims, permission: &str) -> Result<(), AppError> {
    if has_permission(claims, permission) {
        Ok(())
    } else {
        Err(AppError::AuthorizationError(format!("Missing permission: {}", permission)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: &str, permissions: &[&str]) -> AdminClaims {
        AdminClaims {
            sub: "staff-1".to_string(),
            email: None,
            role: role.to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            exp: 0,
        }
    }

    #[test]
    fn test_admin_needs_explicit_permission() {
        let admin = claims("ADMIN", &[PERM_BOOKINGS_READ]);
        assert!(has_permission(&admin, PERM_BOOKINGS_READ));
        assert!(!has_permission(&admin, PERM_CATALOG_WRITE));
        assert!(require_permission(&admin, PERM_BOOKINGS_WRITE).is_err());
    }

    #[test]
    fn test_super_admin_has_everything() {
        let root = claims("SUPER_ADMIN", &[]);
        assert!(has_permission(&root, PERM_CATALOG_WRITE));
    }
}
