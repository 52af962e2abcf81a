//! Verify OTP Use Case
//!
//! Consumes the pending OTP and signs the user in. The compare and the
//! clear are one conditional write in the directory, so of several
//! concurrent submissions of the same code at most one succeeds.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::config::IdentityConfig;
use crate::application::token::{AuthOutput, TokenIssuer};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{OtpCode, UserId};
use crate::error::{IdentityError, IdentityResult};

/// Verify OTP input
pub struct VerifyOtpInput {
    pub user_id: String,
    pub otp: String,
}

/// Verify OTP use case
pub struct VerifyOtpUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    config: Arc<IdentityConfig>,
    tokens: TokenIssuer,
}

impl<R> VerifyOtpUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<IdentityConfig>) -> Self {
        let tokens = TokenIssuer::from_config(&config);
        Self {
            repo,
            config,
            tokens,
        }
    }

    pub async fn execute(&self, input: VerifyOtpInput) -> IdentityResult<AuthOutput> {
        self.execute_at(input, Utc::now()).await
    }

    pub async fn execute_at(
        &self,
        input: VerifyOtpInput,
        now: DateTime<Utc>,
    ) -> IdentityResult<AuthOutput> {
        let user_id: UserId = input
            .user_id
            .parse()
            .map_err(|_| IdentityError::UserNotFound)?;

        let mut user = self
            .repo
            .find_by_id(&user_id)
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        // Malformed codes are rejected exactly like wrong ones
        let code = OtpCode::parse(&input.otp).ok_or(IdentityError::InvalidOrExpiredOtp)?;
        let code_hash = code.hash(&self.config.otp_secret);

        if !self
            .repo
            .consume_pending_otp(&user_id, &code_hash, now)
            .await?
        {
            return Err(IdentityError::InvalidOrExpiredOtp);
        }

        user.mark_verified(now);
        let token = self.tokens.issue_at(&user_id, now)?;

        tracing::info!(user_id = %user_id, "Email verified");

        Ok(AuthOutput { user, token })
    }
}
