//! Bounded OTP delivery

use std::time::Duration;

use crate::domain::mailer::{DeliveryError, OtpMailer};
use crate::domain::value_object::{Email, OtpCode};

/// One delivery attempt; running past `timeout` counts as a failure
pub(crate) async fn dispatch_otp<M: OtpMailer>(
    mailer: &M,
    to: &Email,
    code: &OtpCode,
    timeout: Duration,
) -> Result<(), DeliveryError> {
    match tokio::time::timeout(timeout, mailer.send_otp(to, code)).await {
        Ok(result) => result,
        Err(_) => Err(DeliveryError(format!(
            "delivery timed out after {}s",
            timeout.as_secs()
        ))),
    }
}
