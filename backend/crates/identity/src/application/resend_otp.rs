//! Resend OTP Use Case
//!
//! Replaces the pending OTP with a fresh one and mails it. Unlike
//! registration, a failed delivery is reported to the caller.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::IdentityConfig;
use crate::application::otp_dispatch::dispatch_otp;
use crate::domain::mailer::OtpMailer;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{OtpCode, PendingOtp, UserId};
use crate::error::{IdentityError, IdentityResult};

/// Resend OTP input
pub struct ResendOtpInput {
    pub user_id: String,
}

/// Resend OTP use case
pub struct ResendOtpUseCase<R, M>
where
    R: UserRepository,
    M: OtpMailer,
{
    repo: Arc<R>,
    mailer: Arc<M>,
    config: Arc<IdentityConfig>,
}

impl<R, M> ResendOtpUseCase<R, M>
where
    R: UserRepository,
    M: OtpMailer,
{
    pub fn new(repo: Arc<R>, mailer: Arc<M>, config: Arc<IdentityConfig>) -> Self {
        Self {
            repo,
            mailer,
            config,
        }
    }

    pub async fn execute(&self, input: ResendOtpInput) -> IdentityResult<()> {
        let user_id: UserId = input
            .user_id
            .parse()
            .map_err(|_| IdentityError::UserNotFound)?;

        let user = self
            .repo
            .find_by_id(&user_id)
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        if user.verified {
            return Err(IdentityError::AlreadyVerified);
        }

        let code = OtpCode::generate();
        let pending = PendingOtp::new(
            &code,
            &self.config.otp_secret,
            Utc::now(),
            self.config.otp_validity(),
        );

        if !self.repo.replace_pending_otp(&user_id, &pending).await? {
            // Verified or deleted since the lookup
            return Err(match self.repo.find_by_id(&user_id).await? {
                Some(_) => IdentityError::AlreadyVerified,
                None => IdentityError::UserNotFound,
            });
        }

        dispatch_otp(
            self.mailer.as_ref(),
            &user.email,
            &code,
            self.config.email_timeout,
        )
        .await
        .map_err(|e| IdentityError::EmailDelivery(e.to_string()))?;

        tracing::info!(user_id = %user_id, "Verification code resent");

        Ok(())
    }
}
