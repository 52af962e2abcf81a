//! Repository Traits
//!
//! The user directory. Implementations live in the infrastructure layer.

use chrono::{DateTime, Utc};

use crate::domain::entity::User;
use crate::domain::value_object::{Email, ExternalId, OtpHash, PendingOtp, UserId};
use crate::error::IdentityResult;

/// User directory
///
/// The three conditional operations (`replace_pending_otp`,
/// `consume_pending_otp`, `link_external_identity`) must each be atomic per
/// user: the check and the write happen in one step, and the returned
/// `bool` says whether the write happened.
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a new user; `DuplicateEmail` if the email is taken
    async fn create(&self, user: &User) -> IdentityResult<()>;

    async fn find_by_id(&self, user_id: &UserId) -> IdentityResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> IdentityResult<Option<User>>;

    async fn find_by_external_id(&self, external_id: &ExternalId)
    -> IdentityResult<Option<User>>;

    /// Persist profile fields (name, email, avatar, password)
    ///
    /// `DuplicateEmail` if the new email belongs to someone else.
    async fn update(&self, user: &User) -> IdentityResult<()>;

    /// Remove the user; `false` if there was nothing to remove
    async fn delete(&self, user_id: &UserId) -> IdentityResult<bool>;

    /// Replace the pending OTP while the user is still unverified
    async fn replace_pending_otp(&self, user_id: &UserId, otp: &PendingOtp)
    -> IdentityResult<bool>;

    /// Mark verified and clear the OTP iff the stored hash equals
    /// `code_hash` and `now` is before its expiry
    async fn consume_pending_otp(
        &self,
        user_id: &UserId,
        code_hash: &OtpHash,
        now: DateTime<Utc>,
    ) -> IdentityResult<bool>;

    /// Attach `external_id` iff the user has none yet; also marks the
    /// account verified and clears any pending OTP
    async fn link_external_identity(
        &self,
        user_id: &UserId,
        external_id: &ExternalId,
    ) -> IdentityResult<bool>;
}
