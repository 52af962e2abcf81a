//! Identity Error Types
//!
//! Identity-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Identity-specific result type alias
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Identity-specific error variants
///
/// Display strings are the user-facing messages; they must stay stable and
/// must never reveal whether an email address is registered.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Malformed input (field-level message)
    #[error("{0}")]
    Validation(String),

    #[error("User already exists")]
    DuplicateEmail,

    /// Unknown user id
    #[error("Invalid user")]
    UserNotFound,

    /// Unknown email OR wrong password; deliberately indistinguishable
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Please verify your email first")]
    UnverifiedAccount,

    /// Wrong code OR expired code; deliberately indistinguishable
    #[error("Invalid or expired OTP")]
    InvalidOrExpiredOtp,

    #[error("User already verified")]
    AlreadyVerified,

    /// OTP mail could not be delivered (resend path only)
    #[error("Failed to send email")]
    EmailDelivery(String),

    /// Bearer token missing, malformed, expired, or its user is gone
    #[error("Not authorized")]
    SessionInvalid,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IdentityError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            IdentityError::Validation(_) | IdentityError::InvalidOrExpiredOtp => {
                ErrorKind::BadRequest
            }
            IdentityError::DuplicateEmail | IdentityError::AlreadyVerified => ErrorKind::Conflict,
            IdentityError::UserNotFound => ErrorKind::NotFound,
            IdentityError::InvalidCredentials | IdentityError::SessionInvalid => {
                ErrorKind::Unauthorized
            }
            IdentityError::UnverifiedAccount => ErrorKind::Forbidden,
            IdentityError::EmailDelivery(_) => ErrorKind::ServiceUnavailable,
            IdentityError::Database(_) | IdentityError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            IdentityError::Validation(_) => "VALIDATION_ERROR",
            IdentityError::DuplicateEmail => "DUPLICATE_EMAIL",
            IdentityError::UserNotFound => "INVALID_USER",
            IdentityError::InvalidCredentials => "INVALID_CREDENTIALS",
            IdentityError::UnverifiedAccount => "UNVERIFIED_ACCOUNT",
            IdentityError::InvalidOrExpiredOtp => "INVALID_OR_EXPIRED_OTP",
            IdentityError::AlreadyVerified => "ALREADY_VERIFIED",
            IdentityError::EmailDelivery(_) => "EMAIL_DELIVERY_FAILED",
            IdentityError::SessionInvalid => "NOT_AUTHORIZED",
            IdentityError::Database(_) | IdentityError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to AppError
    ///
    /// Storage and internal details are replaced by a generic message.
    pub fn to_app_error(&self) -> AppError {
        let message = match self {
            IdentityError::Database(_) | IdentityError::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let err = AppError::new(self.kind(), message).with_code(self.code());
        match self {
            IdentityError::UnverifiedAccount => {
                err.with_action("Enter the verification code sent to your email")
            }
            IdentityError::InvalidOrExpiredOtp => err.with_action("Request a new code"),
            IdentityError::EmailDelivery(_) => err.with_action("Please try again later"),
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            IdentityError::Database(e) => {
                tracing::error!(error = %e, "Identity database error");
            }
            IdentityError::Internal(msg) => {
                tracing::error!(message = %msg, "Identity internal error");
            }
            IdentityError::EmailDelivery(reason) => {
                tracing::warn!(reason = %reason, "OTP email delivery failed");
            }
            IdentityError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            IdentityError::InvalidOrExpiredOtp => {
                tracing::warn!("Rejected OTP submission");
            }
            _ => {
                tracing::debug!(error = %self, "Identity error");
            }
        }
    }
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

/// Value objects report problems as `AppError`; bad input becomes a
/// validation failure, anything else is internal.
impl From<AppError> for IdentityError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest => IdentityError::Validation(err.message().to_string()),
            _ => IdentityError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumeration_resistant_messages() {
        // login: unknown email and wrong password share one variant
        assert_eq!(
            IdentityError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
        assert_eq!(
            IdentityError::InvalidOrExpiredOtp.to_string(),
            "Invalid or expired OTP"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            IdentityError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(IdentityError::DuplicateEmail.status_code(), StatusCode::CONFLICT);
        assert_eq!(IdentityError::UserNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            IdentityError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            IdentityError::UnverifiedAccount.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            IdentityError::EmailDelivery("smtp down".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            IdentityError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_not_exposed() {
        let app = IdentityError::Internal("connection refused on 10.0.0.3".into()).to_app_error();
        assert_eq!(app.message(), "Internal server error");
        assert_eq!(app.code(), Some("INTERNAL_ERROR"));

        let app = IdentityError::EmailDelivery("535 auth failed".into()).to_app_error();
        assert!(!app.message().contains("535"));
    }

    #[test]
    fn test_unverified_is_distinct_from_invalid_credentials() {
        let unverified = IdentityError::UnverifiedAccount.to_app_error();
        let invalid = IdentityError::InvalidCredentials.to_app_error();
        assert_ne!(unverified.code(), invalid.code());
        assert_ne!(unverified.status_code(), invalid.status_code());
    }

    #[test]
    fn test_from_app_error() {
        let err: IdentityError = AppError::bad_request("Invalid email format").into();
        assert!(matches!(err, IdentityError::Validation(msg) if msg == "Invalid email format"));

        let err: IdentityError = AppError::internal("boom").into();
        assert!(matches!(err, IdentityError::Internal(_)));
    }
}
