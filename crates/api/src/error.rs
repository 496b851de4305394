use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::services::AccessError;
use persistence::repositories::CheckoutFailure;
use serde::Serialize;
use thiserror::Error;

use crate::services::{AuthError, MediaError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Field-level validation failures.
    #[error("Validation error: {message}")]
    InvalidFields {
        message: String,
        details: Vec<ValidationDetail>,
    },

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl ApiError {
    /// 400 pointing at a single request field.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        ApiError::InvalidFields {
            message: message.clone(),
            details: vec![ValidationDetail {
                field: field.to_string(),
                message,
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<ValidationDetail>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationDetail {
    pub field: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg, None),
            ApiError::InvalidFields { message, details } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message,
                Some(details),
            ),
            ApiError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large", msg, None)
            }
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Too many requests. Please try again later.".into(),
                None,
            ),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                    None,
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg,
                None,
            ),
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".into()),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some("23505") => ApiError::Conflict("Resource already exists".into()),
                Some("23503") => ApiError::NotFound("Referenced resource not found".into()),
                _ => ApiError::Internal(format!("Database error: {}", db_err)),
            },
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| ValidationDetail {
                    // Struct-level checks report the offending field as their code.
                    field: if *field == "__all__" {
                        e.code.to_string()
                    } else {
                        field.to_string()
                    },
                    message: e
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field)),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        let message = if details.len() == 1 {
            details[0].message.clone()
        } else {
            format!("{} validation errors", details.len())
        };

        ApiError::InvalidFields { message, details }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Unauthenticated => ApiError::Unauthorized(err.to_string()),
            AccessError::Forbidden(msg) => ApiError::Forbidden(msg.to_string()),
            AccessError::NotFound(msg) => ApiError::NotFound(msg.to_string()),
        }
    }
}

impl From<CheckoutFailure> for ApiError {
    fn from(err: CheckoutFailure) -> Self {
        match err {
            CheckoutFailure::Checkout(e) => ApiError::Validation(e.to_string()),
            CheckoutFailure::Database(e) => e.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UsernameTaken | AuthError::EmailTaken => ApiError::Conflict(err.to_string()),
            AuthError::InvalidCredentials
            | AuthError::UserDisabled
            | AuthError::InvalidRefreshToken => ApiError::Unauthorized(err.to_string()),
            AuthError::TokenError(e) => ApiError::Internal(format!("Token error: {}", e)),
            AuthError::PasswordError(e) => ApiError::Internal(format!("Password error: {}", e)),
            AuthError::DatabaseError(e) => e.into(),
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::Missing => ApiError::field("image", err.to_string()),
            MediaError::UnsupportedType(_) => ApiError::field("image", err.to_string()),
            MediaError::TooLarge(_) => ApiError::PayloadTooLarge(err.to_string()),
            MediaError::Io(e) => ApiError::Internal(format!("Media storage error: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::services::CheckoutError;
    use validator::Validate;

    async fn body_json(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Conflict("x".into()), StatusCode::CONFLICT),
            (ApiError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::PayloadTooLarge("x".into()), StatusCode::PAYLOAD_TOO_LARGE),
            (ApiError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::ServiceUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_internal_error_hides_message() {
        let (status, body) = body_json(ApiError::Internal("password=hunter2".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn test_field_error_has_details() {
        let (status, body) = body_json(ApiError::field("driver_id", "Driver not found")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["details"][0]["field"], "driver_id");
        assert_eq!(body["details"][0]["message"], "Driver not found");
    }

    #[tokio::test]
    async fn test_plain_errors_omit_details() {
        let (_, body) = body_json(ApiError::NotFound("Order not found".into())).await;
        assert!(body.get("details").is_none());
        assert_eq!(body["message"], "Order not found");
    }

    #[test]
    fn test_from_sqlx_row_not_found() {
        let error: ApiError = sqlx::Error::RowNotFound.into();
        assert!(matches!(error, ApiError::NotFound(msg) if msg == "Resource not found"));
    }

    #[test]
    fn test_from_validation_errors_maps_schema_code() {
        let req: domain::models::user::RegisterRequest = serde_json::from_value(serde_json::json!({
            "username": "chef",
            "email": "chef@example.com",
            "password": "secret1",
            "password_confirm": "secret1",
            "role": "manager"
        }))
        .unwrap();

        let error: ApiError = req.validate().unwrap_err().into();
        match error {
            ApiError::InvalidFields { details, .. } => {
                assert_eq!(details.len(), 1);
                assert_eq!(details[0].field, "restaurant_name");
            }
            other => panic!("Expected InvalidFields, got {:?}", other),
        }
    }

    #[test]
    fn test_from_access_error() {
        assert!(matches!(
            ApiError::from(AccessError::Unauthenticated),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from(AccessError::Forbidden("Not authorized")),
            ApiError::Forbidden(msg) if msg == "Not authorized"
        ));
        assert!(matches!(
            ApiError::from(AccessError::NotFound("Order not found")),
            ApiError::NotFound(_)
        ));
    }

    #[test]
    fn test_auth_error_mapping() {
        assert!(matches!(ApiError::from(AuthError::EmailTaken), ApiError::Conflict(_)));
        assert!(matches!(
            ApiError::from(AuthError::InvalidCredentials),
            ApiError::Unauthorized(msg) if msg == "Invalid credentials"
        ));
        assert!(matches!(
            ApiError::from(AuthError::UserDisabled),
            ApiError::Unauthorized(msg) if msg == "User account is disabled"
        ));
    }

    #[test]
    fn test_media_error_mapping() {
        assert!(matches!(
            ApiError::from(MediaError::TooLarge(10)),
            ApiError::PayloadTooLarge(_)
        ));
        assert!(matches!(
            ApiError::from(MediaError::Missing),
            ApiError::InvalidFields { message, .. } if message == "No image provided"
        ));
    }

    #[test]
    fn test_empty_cart_is_bad_request() {
        let error: ApiError = CheckoutFailure::Checkout(CheckoutError::EmptyCart).into();
        assert!(matches!(error, ApiError::Validation(msg) if msg == "Cart is empty"));
    }

    #[tokio::test]
    async fn test_overflowing_total_is_bad_request() {
        let (status, body) =
            body_json(CheckoutFailure::Checkout(CheckoutError::TotalOverflow).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Order total is too large");
    }
}
