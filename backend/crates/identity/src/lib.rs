//! Identity Backend Module
//!
//! Registration, email verification by one-time passcode, password and
//! federated login, signed session tokens, and profile management for the
//! job-application tracker.
//!
//! Clean Architecture structure:
//! - `domain/` - User entity, value objects, directory and mailer traits
//! - `application/` - Use cases, configuration, token issuer
//! - `infra/` - PostgreSQL and in-memory directories, SMTP mailer
//! - `presentation/` - HTTP handlers, DTOs, routers, bearer middleware
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (optional pepper)
//! - OTPs stored only as keyed HMAC-SHA256 hashes, valid for 10 minutes
//! - OTP consumption is a single conditional write (no double use)
//! - Stateless HMAC-signed bearer tokens; not revocable before expiry
//! - Login failures never reveal whether an email is registered

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::IdentityConfig;
pub use error::{IdentityError, IdentityResult};
pub use infra::{InMemoryUserRepository, PgUserRepository, SmtpConfig, SmtpOtpMailer};
pub use presentation::{IdentityAppState, identity_router};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
