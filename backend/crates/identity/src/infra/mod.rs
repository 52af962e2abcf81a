//! Infrastructure Layer
//!
//! Database implementations and external service integrations.

pub mod memory;
pub mod postgres;
pub mod smtp;

pub use memory::InMemoryUserRepository;
pub use postgres::PgUserRepository;
pub use smtp::{SmtpConfig, SmtpOtpMailer};
