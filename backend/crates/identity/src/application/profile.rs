//! Profile Use Cases
//!
//! Read, update, and delete the signed-in user's own record.

use std::sync::Arc;

use crate::application::config::IdentityConfig;
use crate::domain::entity::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{DisplayName, Email, RawPassword, UserId, UserPassword};
use crate::error::{IdentityError, IdentityResult};

// ============================================================================
// Get Profile
// ============================================================================

pub struct GetProfileUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
}

impl<R> GetProfileUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, user_id: &UserId) -> IdentityResult<User> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or(IdentityError::UserNotFound)
    }
}

// ============================================================================
// Update Profile
// ============================================================================

/// Update input
///
/// `None` and empty strings both mean "leave unchanged".
#[derive(Default)]
pub struct UpdateProfileInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub password: Option<String>,
}

pub struct UpdateProfileUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    config: Arc<IdentityConfig>,
}

impl<R> UpdateProfileUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<IdentityConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(
        &self,
        user_id: &UserId,
        input: UpdateProfileInput,
    ) -> IdentityResult<User> {
        // Validate everything up front
        let name = provided(input.name).map(DisplayName::new).transpose()?;
        let email = provided(input.email).map(Email::new).transpose()?;
        let avatar = provided(input.avatar);
        let password = provided(input.password)
            .map(RawPassword::new)
            .transpose()?;

        let mut user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        if let Some(email) = email.filter(|e| *e != user.email) {
            if let Some(other) = self.repo.find_by_email(&email).await? {
                if other.user_id != user.user_id {
                    return Err(IdentityError::DuplicateEmail);
                }
            }
            user.set_email(email);
        }

        if let Some(name) = name {
            user.set_name(name);
        }

        if let Some(avatar) = avatar {
            user.set_avatar(avatar);
        }

        if let Some(raw) = password {
            user.set_password(UserPassword::from_raw(&raw, self.config.pepper())?);
        }

        // The unique index still guards against a concurrent claim
        self.repo.update(&user).await?;

        tracing::info!(user_id = %user.user_id, "Profile updated");

        Ok(user)
    }
}

fn provided(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ============================================================================
// Delete Account
// ============================================================================

pub struct DeleteAccountUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
}

impl<R> DeleteAccountUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Unconditional; deleting an already-deleted account is not an error
    pub async fn execute(&self, user_id: &UserId) -> IdentityResult<()> {
        let removed = self.repo.delete(user_id).await?;

        tracing::info!(user_id = %user_id, removed, "Account deleted");

        Ok(())
    }
}
