//! Login Use Case
//!
//! Password login. Unknown email, missing password credential and wrong
//! password all fail the same way and cost one Argon2 verification.

use std::sync::Arc;

use crate::application::config::IdentityConfig;
use crate::application::token::{AuthOutput, TokenIssuer};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{Email, RawPassword, UserPassword};
use crate::error::{IdentityError, IdentityResult};

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Login use case
pub struct LoginUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    config: Arc<IdentityConfig>,
    tokens: TokenIssuer,
}

impl<R> LoginUseCase<R>
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

    pub async fn execute(&self, input: LoginInput) -> IdentityResult<AuthOutput> {
        let candidate = RawPassword::candidate(input.password);

        // A malformed email cannot match anyone
        let user = match Email::new(&input.email) {
            Ok(email) => self.repo.find_by_email(&email).await?,
            Err(_) => None,
        };

        let Some(user) = user else {
            UserPassword::verify_dummy(&candidate);
            return Err(IdentityError::InvalidCredentials);
        };

        let matched = match &user.password {
            Some(stored) => stored.verify(&candidate, self.config.pepper()),
            None => UserPassword::verify_dummy(&candidate),
        };

        if !matched {
            return Err(IdentityError::InvalidCredentials);
        }

        if !user.verified {
            return Err(IdentityError::UnverifiedAccount);
        }

        let token = self.tokens.issue(&user.user_id)?;

        tracing::info!(user_id = %user.user_id, "User logged in");

        Ok(AuthOutput { user, token })
    }
}
