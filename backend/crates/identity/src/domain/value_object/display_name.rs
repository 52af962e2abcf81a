//! Display Name Value Object

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

pub const DISPLAY_NAME_MAX_LENGTH: usize = 100;

/// Free-form display name; non-empty after trimming
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(raw: impl AsRef<str>) -> AppResult<Self> {
        let name: String = raw.as_ref().nfkc().collect::<String>().trim().to_string();

        if name.is_empty() {
            return Err(AppError::bad_request("Name is required"));
        }

        if name.chars().count() > DISPLAY_NAME_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Name must be at most {DISPLAY_NAME_MAX_LENGTH} characters"
            )));
        }

        if name.chars().any(char::is_control) {
            return Err(AppError::bad_request("Name contains invalid characters"));
        }

        Ok(Self(name))
    }

    /// Provider-supplied names are stored as given, falling back to the
    /// local part of the email when blank. Cut to
    /// `DISPLAY_NAME_MAX_LENGTH` characters.
    pub fn from_trusted(raw: impl AsRef<str>, email: &str) -> Self {
        let mut name = raw.as_ref().trim();
        if name.is_empty() {
            name = email.split('@').next().unwrap_or(email);
        }

        let truncated: String = name.chars().take(DISPLAY_NAME_MAX_LENGTH).collect();
        Self(truncated.trim_end().to_string())
    }

    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_trimmed() {
        assert_eq!(DisplayName::new("  Ana  ").unwrap().as_str(), "Ana");
        assert_eq!(DisplayName::new("José Ñúñez").unwrap().as_str(), "José Ñúñez");
    }

    #[test]
    fn test_display_name_rejected() {
        assert_eq!(DisplayName::new("").unwrap_err().message(), "Name is required");
        assert!(DisplayName::new(" \t ").is_err());
        assert!(DisplayName::new("a\u{0000}b").is_err());
        assert!(DisplayName::new("x".repeat(DISPLAY_NAME_MAX_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_trusted_name_fallback() {
        assert_eq!(DisplayName::from_trusted("Bo", "b@x.com").as_str(), "Bo");
        assert_eq!(DisplayName::from_trusted("  ", "bob@x.com").as_str(), "bob");
    }

    #[test]
    fn test_trusted_name_truncated_on_char_boundary() {
        let long = "é".repeat(150);
        let name = DisplayName::from_trusted(&long, "e@x.com");
        assert_eq!(name.as_str().chars().count(), DISPLAY_NAME_MAX_LENGTH);
        assert_eq!(name.as_str(), "é".repeat(DISPLAY_NAME_MAX_LENGTH));

        let local = "l".repeat(150);
        let fallback = DisplayName::from_trusted("", &format!("{local}@x.com"));
        assert_eq!(fallback.as_str().chars().count(), DISPLAY_NAME_MAX_LENGTH);
    }
}
