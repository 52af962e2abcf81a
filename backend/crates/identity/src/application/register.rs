//! Register Use Case
//!
//! Creates an unverified password account and mails its first OTP.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::IdentityConfig;
use crate::application::otp_dispatch::dispatch_otp;
use crate::domain::entity::User;
use crate::domain::mailer::OtpMailer;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    DisplayName, Email, OtpCode, PendingOtp, RawPassword, UserId, UserPassword,
};
use crate::error::{IdentityError, IdentityResult};

/// Register input
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Register output
#[derive(Debug)]
pub struct RegisterOutput {
    pub user_id: UserId,
}

/// Register use case
pub struct RegisterUseCase<R, M>
where
    R: UserRepository,
    M: OtpMailer,
{
    repo: Arc<R>,
    mailer: Arc<M>,
    config: Arc<IdentityConfig>,
}

impl<R, M> RegisterUseCase<R, M>
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

    pub async fn execute(&self, input: RegisterInput) -> IdentityResult<RegisterOutput> {
        // All input is checked before anything is written or sent
        let name = DisplayName::new(&input.name)?;
        let email = Email::new(&input.email)?;
        let raw_password = RawPassword::new(input.password)?;

        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(IdentityError::DuplicateEmail);
        }

        let password = UserPassword::from_raw(&raw_password, self.config.pepper())?;

        let now = Utc::now();
        let code = OtpCode::generate();
        let pending = PendingOtp::new(
            &code,
            &self.config.otp_secret,
            now,
            self.config.otp_validity(),
        );

        // A concurrent registration for the same email fails here
        let user = User::register(name, email, password, pending, now);
        self.repo.create(&user).await?;

        tracing::info!(user_id = %user.user_id, "User registered");

        // The account exists either way; the user can ask for a resend
        if let Err(e) = dispatch_otp(
            self.mailer.as_ref(),
            &user.email,
            &code,
            self.config.email_timeout,
        )
        .await
        {
            tracing::warn!(
                user_id = %user.user_id,
                error = %e,
                "Verification email not delivered"
            );
        }

        Ok(RegisterOutput {
            user_id: user.user_id,
        })
    }
}
