//! Email Dispatcher
//!
//! Delivers verification codes. One attempt per call, no retries.

use crate::domain::value_object::{Email, OtpCode};

/// Delivery failure reason (SMTP response, connection error, timeout)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct DeliveryError(pub String);

#[trait_variant::make(OtpMailer: Send)]
pub trait LocalOtpMailer {
    async fn send_otp(&self, to: &Email, code: &OtpCode) -> Result<(), DeliveryError>;
}
