//! User Password Value Object
//!
//! Domain wrappers over `platform::password`: policy failures become
//! field-level `AppError`s, hashing failures become internal errors.

use kernel::error::app_error::{AppError, AppResult};
use platform::password::{
    self, ClearTextPassword, HashedPassword, PasswordHashError, PasswordPolicyError,
};
use std::fmt;

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Clear text password from a request body, zeroized on drop
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Accept a new password (registration, profile update)
    pub fn new(raw: String) -> AppResult<Self> {
        ClearTextPassword::new(raw)
            .map(Self)
            .map_err(policy_error)
    }

    /// Wrap a login candidate without applying the policy
    pub fn candidate(raw: String) -> Self {
        Self(ClearTextPassword::candidate(raw))
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

fn policy_error(err: PasswordPolicyError) -> AppError {
    match err {
        PasswordPolicyError::TooShort { min, .. } => {
            AppError::bad_request(format!("Password must be at least {min} characters"))
                .with_action("Please choose a longer password")
        }
        PasswordPolicyError::TooLong { max, .. } => {
            AppError::bad_request(format!("Password must be at most {max} characters"))
                .with_action("Please choose a shorter password")
        }
        PasswordPolicyError::EmptyOrWhitespace => AppError::bad_request("Password is required"),
        PasswordPolicyError::InvalidCharacter => {
            AppError::bad_request("Password contains invalid characters")
        }
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// Stored Password Credential
// ============================================================================

/// One-way password credential as stored on the user record
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    /// Hash a validated password
    pub fn from_raw(raw: &RawPassword, pepper: Option<&[u8]>) -> AppResult<Self> {
        raw.inner()
            .hash(pepper)
            .map(Self)
            .map_err(|e| AppError::internal(e.to_string()))
    }

    /// Restore from the stored PHC string
    pub fn from_db(phc: impl Into<String>) -> Result<Self, PasswordHashError> {
        HashedPassword::from_phc_string(phc).map(Self)
    }

    pub fn verify(&self, candidate: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(candidate.inner(), pepper)
    }

    /// Burn the same work as `verify` when there is nothing to compare with
    pub fn verify_dummy(candidate: &RawPassword) -> bool {
        password::verify_dummy(candidate.inner())
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UserPassword([HASH])")
    }
}
