use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tripdesk_booking::BookingError;
use tripdesk_catalog::{InventoryError, ProductError, TripError};
use tripdesk_core::repository::RepoError;
use tripdesk_core::CoreError;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    /// Field name -> message, returned as `{"error", "fields"}`
    FieldValidationError(tripdesk_booking::FieldErrors),
    NotFoundError(String),
    ConflictError(String),
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl AppError {
    /// Repository failures, with slot errors surfaced as conflicts.
    pub fn repo(err: RepoError) -> Self {
        match err.downcast::<InventoryError>() {
            Ok(inventory) => AppError::from_inventory(*inventory),
            Err(other) => AppError::InternalServerError(other.to_string()),
        }
    }

    pub fn from_inventory(err: InventoryError) -> Self {
        match err {
            InventoryError::NotFound(_) => AppError::NotFoundError(err.to_string()),
            InventoryError::Closed(_) | InventoryError::InsufficientSlots { .. } => {
                AppError::ConflictError(err.to_string())
            }
        }
    }

    pub fn core(err: CoreError) -> Self {
        match err {
            CoreError::ValidationError(msg) => AppError::ValidationError(msg),
            CoreError::NotFound(msg) => AppError::NotFoundError(msg),
            CoreError::Conflict(msg) => AppError::ConflictError(msg),
            CoreError::InternalError(msg) => AppError::InternalServerError(msg),
        }
    }

    pub fn booking(err: BookingError) -> Self {
        match err {
            BookingError::Validation(fields) => AppError::FieldValidationError(fields),
            BookingError::Incomplete(_) => AppError::ValidationError(err.to_string()),
            BookingError::DateNotFound { .. } => AppError::NotFoundError(err.to_string()),
            BookingError::InvalidTransition { .. } | BookingError::SubmissionInFlight(_) => {
                AppError::ConflictError(err.to_string())
            }
            other => AppError::InternalServerError(other.to_string()),
        }
    }

    pub fn trip(err: TripError) -> Self {
        AppError::ValidationError(err.to_string())
    }

    pub fn product(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(_) => AppError::NotFoundError(err.to_string()),
            ProductError::Invalid(_) => AppError::ValidationError(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, fields) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg, None),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::FieldValidationError(fields) => {
                (StatusCode::BAD_REQUEST, "Validation failed".to_string(), Some(fields.0))
            }
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg, None),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string(), None)
            },
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string(), None)
            },
        };

        let body = match fields {
            Some(fields) => Json(json!({ "error": error_message, "fields": fields })),
            None => Json(json!({ "error": error_message })),
        };

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_slots_is_conflict() {
        let err: RepoError = Box::new(InventoryError::InsufficientSlots { requested: 3, available: 1 });
        let response = AppError::repo(err).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_other_repo_errors_are_masked() {
        let err: RepoError = "connection reset".into();
        let response = AppError::repo(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_booking_validation_is_bad_request() {
        let mut fields = tripdesk_booking::FieldErrors::new();
        fields.add("email", "enter a valid email address");
        let response = AppError::booking(BookingError::Validation(fields)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
