//! Authenticate Use Case
//!
//! Turns a bearer token into the live user record. A valid signature is not
//! enough: the account must still exist.

use std::sync::Arc;

use crate::application::config::IdentityConfig;
use crate::application::token::TokenIssuer;
use crate::domain::entity::User;
use crate::domain::repository::UserRepository;
use crate::error::{IdentityError, IdentityResult};

pub struct AuthenticateUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    tokens: TokenIssuer,
}

impl<R> AuthenticateUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<IdentityConfig>) -> Self {
        Self {
            repo,
            tokens: TokenIssuer::from_config(&config),
        }
    }

    pub async fn execute(&self, token: &str) -> IdentityResult<User> {
        let user_id = self.tokens.validate(token)?;

        self.repo
            .find_by_id(&user_id)
            .await?
            .ok_or(IdentityError::SessionInvalid)
    }
}
