//! Email Value Object
//!
//! A normalized (trimmed, lower-cased) email address. The normalized form is
//! the uniqueness key of the user directory.

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum email length (RFC 5321)
const EMAIL_MAX_LENGTH: usize = 254;

/// Maximum local-part length (RFC 5321)
const LOCAL_PART_MAX_LENGTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Normalize and validate user input
    pub fn new(email: impl AsRef<str>) -> AppResult<Self> {
        let email = Self::normalize(email.as_ref());

        if email.is_empty() {
            return Err(AppError::bad_request("Email is required"));
        }

        if email.len() > EMAIL_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Email must be at most {EMAIL_MAX_LENGTH} characters"
            )));
        }

        if !Self::is_valid_format(&email) {
            return Err(AppError::bad_request("Please enter a valid email"));
        }

        Ok(Self(email))
    }

    /// Normalize an address that an identity provider already vouched for
    ///
    /// No format check: federated login must not fail on input the provider
    /// accepted. Presence and the storage limit still apply.
    pub fn from_trusted(email: impl AsRef<str>) -> AppResult<Self> {
        let email = Self::normalize(email.as_ref());

        if email.is_empty() {
            return Err(AppError::bad_request("Email is required"));
        }

        if email.chars().count() > EMAIL_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Email must be at most {EMAIL_MAX_LENGTH} characters"
            )));
        }

        Ok(Self(email))
    }

    /// Create from database value (already normalized)
    pub fn from_db(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    fn normalize(raw: &str) -> String {
        raw.trim().to_lowercase()
    }

    fn is_valid_format(email: &str) -> bool {
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };

        if local.is_empty() || local.len() > LOCAL_PART_MAX_LENGTH || domain.contains('@') {
            return false;
        }

        if local.chars().any(char::is_whitespace) {
            return false;
        }

        if domain.is_empty() || !domain.contains('.') || domain.contains("..") {
            return false;
        }

        if !domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return false;
        }

        let edges = ['.', '-'];
        !(domain.starts_with(edges) || domain.ends_with(edges))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_valid() {
        assert!(Email::new("ana@x.com").is_ok());
        assert!(Email::new("user.name+tag@example.co.in").is_ok());
        assert!(Email::new("a@sub-domain.example.org").is_ok());
    }

    #[test]
    fn test_email_normalized() {
        let email = Email::new("  Ana@X.COM ").unwrap();
        assert_eq!(email.as_str(), "ana@x.com");
        assert_eq!(email, Email::new("ana@x.com").unwrap());
    }

    #[test]
    fn test_email_invalid() {
        for bad in [
            "",
            "   ",
            "anax.com",
            "ana@",
            "@x.com",
            "ana@@x.com",
            "ana@x",
            "ana@.x.com",
            "ana@x.com-",
            "ana@x..com",
            "a na@x.com",
            "ana@x_y.com",
        ] {
            assert!(Email::new(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_email_length_limits() {
        let local = "a".repeat(LOCAL_PART_MAX_LENGTH + 1);
        assert!(Email::new(format!("{local}@x.com")).is_err());

        let domain = format!("{}.com", "d".repeat(EMAIL_MAX_LENGTH));
        assert!(Email::new(format!("a@{domain}")).is_err());
    }

    #[test]
    fn test_validation_error_is_bad_request() {
        let err = Email::new("nope").unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Please enter a valid email");
    }

    #[test]
    fn test_from_trusted_only_normalizes() {
        let email = Email::from_trusted(" Someone@Corp.Example ").unwrap();
        assert_eq!(email.as_str(), "someone@corp.example");

        let odd = Email::from_trusted("weird-but-accepted").unwrap();
        assert_eq!(odd.as_str(), "weird-but-accepted");
    }

    #[test]
    fn test_from_trusted_enforces_storage_limit() {
        let at_limit = format!("{}@x.com", "a".repeat(EMAIL_MAX_LENGTH - 6));
        assert!(Email::from_trusted(&at_limit).is_ok());

        let over = format!("{}@x.com", "a".repeat(EMAIL_MAX_LENGTH - 5));
        let err = Email::from_trusted(&over).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Email must be at most 254 characters");

        assert!(Email::from_trusted("  ").is_err());
    }
}
