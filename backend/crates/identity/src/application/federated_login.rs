//! Federated Login Use Case
//!
//! Signs in a user asserted by the external identity provider.
//!
//! Resolution order: external id first, then normalized email. A match that
//! has no external id yet is linked to this one and marked verified, which
//! merges a password account and a provider identity sharing an email.
//! With no match, a verified account without password is created.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::IdentityConfig;
use crate::application::token::{AuthOutput, TokenIssuer};
use crate::domain::entity::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{DisplayName, Email, ExternalId};
use crate::error::{IdentityError, IdentityResult};

/// Federated login input (already validated by the provider integration)
pub struct FederatedLoginInput {
    pub external_id: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

/// Federated login use case
pub struct FederatedLoginUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    tokens: TokenIssuer,
}

impl<R> FederatedLoginUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<IdentityConfig>) -> Self {
        Self {
            repo,
            tokens: TokenIssuer::from_config(&config),
        }
    }

    pub async fn execute(&self, input: FederatedLoginInput) -> IdentityResult<AuthOutput> {
        let external_id = ExternalId::new(&input.external_id)?;
        let email = Email::from_trusted(&input.email)?;

        let user = match self.resolve(&external_id, &email).await? {
            Some(user) => self.link_if_unlinked(user, &external_id).await?,
            None => {
                let user = User::federated(
                    DisplayName::from_trusted(&input.name, email.as_str()),
                    email.clone(),
                    external_id.clone(),
                    input.avatar.filter(|a| !a.trim().is_empty()),
                    Utc::now(),
                );

                match self.repo.create(&user).await {
                    Ok(()) => {
                        tracing::info!(user_id = %user.user_id, "Federated account created");
                        user
                    }
                    // Someone else created this email or identity first
                    Err(IdentityError::DuplicateEmail) => {
                        let existing = self.resolve(&external_id, &email).await?.ok_or_else(
                            || IdentityError::Internal("conflicting user disappeared".into()),
                        )?;
                        self.link_if_unlinked(existing, &external_id).await?
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        let token = self.tokens.issue(&user.user_id)?;

        Ok(AuthOutput { user, token })
    }

    async fn resolve(
        &self,
        external_id: &ExternalId,
        email: &Email,
    ) -> IdentityResult<Option<User>> {
        if let Some(user) = self.repo.find_by_external_id(external_id).await? {
            return Ok(Some(user));
        }
        self.repo.find_by_email(email).await
    }

    /// A user already holding some external id is returned unchanged
    async fn link_if_unlinked(
        &self,
        mut user: User,
        external_id: &ExternalId,
    ) -> IdentityResult<User> {
        if user.external_id.is_some() {
            tracing::info!(user_id = %user.user_id, linked = false, "Federated login");
            return Ok(user);
        }

        if self
            .repo
            .link_external_identity(&user.user_id, external_id)
            .await?
        {
            user.link(external_id.clone(), Utc::now());
            tracing::info!(user_id = %user.user_id, linked = true, "Federated login");
            return Ok(user);
        }

        // Linked concurrently; return the stored state
        self.repo
            .find_by_id(&user.user_id)
            .await?
            .ok_or(IdentityError::UserNotFound)
    }
}
