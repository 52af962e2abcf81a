//! Application Configuration
//!
//! Secrets and time windows for the identity use cases. Loaded once at
//! startup and shared behind an `Arc`.

use chrono::TimeDelta;
use std::time::Duration;

/// Identity application configuration
#[derive(Clone)]
pub struct IdentityConfig {
    /// HMAC key for session tokens (32 bytes)
    pub token_secret: [u8; 32],
    /// Session token lifetime (30 days)
    pub token_ttl: Duration,
    /// HMAC key for stored OTP hashes (32 bytes)
    pub otp_secret: [u8; 32],
    /// OTP validity window (10 minutes)
    pub otp_ttl: Duration,
    /// Upper bound on a single OTP delivery attempt
    pub email_timeout: Duration,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            token_secret: [0u8; 32],
            token_ttl: Duration::from_secs(30 * 24 * 3600), // 30 days
            otp_secret: [0u8; 32],
            otp_ttl: Duration::from_secs(10 * 60), // 10 minutes
            email_timeout: Duration::from_secs(10),
            password_pepper: None,
        }
    }
}

impl IdentityConfig {
    /// Upper bound accepted for a configured token lifetime
    pub const MAX_TOKEN_TTL_DAYS: u64 = 3650;

    /// Token lifetime for a day count, `None` outside `1..=MAX_TOKEN_TTL_DAYS`
    pub fn token_ttl_from_days(days: u64) -> Option<Duration> {
        if days == 0 || days > Self::MAX_TOKEN_TTL_DAYS {
            return None;
        }
        days.checked_mul(24 * 60 * 60).map(Duration::from_secs)
    }

    /// Create config with random token and OTP secrets
    ///
    /// Tokens issued under one process do not survive a restart.
    pub fn with_random_secrets() -> Self {
        Self {
            token_secret: platform::crypto::random_key(),
            otp_secret: platform::crypto::random_key(),
            ..Default::default()
        }
    }

    /// Create config for development (random secrets, short mail timeout)
    pub fn development() -> Self {
        Self {
            email_timeout: Duration::from_secs(3),
            ..Self::with_random_secrets()
        }
    }

    /// OTP validity as a chrono delta for timestamp arithmetic
    pub fn otp_validity(&self) -> TimeDelta {
        TimeDelta::from_std(self.otp_ttl).unwrap_or(TimeDelta::minutes(10))
    }

    /// Token lifetime as a chrono delta for timestamp arithmetic
    pub fn token_validity(&self) -> TimeDelta {
        TimeDelta::from_std(self.token_ttl).unwrap_or(TimeDelta::days(30))
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("token_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("otp_secret", &"[REDACTED]")
            .field("otp_ttl", &self.otp_ttl)
            .field("email_timeout", &self.email_timeout)
            .field("password_pepper", &self.password_pepper.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
