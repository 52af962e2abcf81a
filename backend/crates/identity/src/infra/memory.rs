//! In-Memory User Directory
//!
//! Process-local directory for tests and database-less runs. Every
//! operation takes the single lock for its whole read-check-write, which
//! gives the same per-user atomicity as the conditional SQL updates.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::entity::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{Email, ExternalId, OtpHash, PendingOtp, UserId};
use crate::error::{IdentityError, IdentityResult};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

fn conflicts(users: &HashMap<UserId, User>, candidate: &User) -> bool {
    users.values().any(|u| {
        u.user_id != candidate.user_id
            && (u.email == candidate.email
                || (u.external_id.is_some() && u.external_id == candidate.external_id))
    })
}

impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> IdentityResult<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.user_id) || conflicts(&users, user) {
            return Err(IdentityError::DuplicateEmail);
        }
        users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> IdentityResult<Option<User>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> IdentityResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| &u.email == email).cloned())
    }

    async fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> IdentityResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.external_id.as_ref() == Some(external_id))
            .cloned())
    }

    async fn update(&self, user: &User) -> IdentityResult<()> {
        let mut users = self.users.write().await;
        if conflicts(&users, user) {
            return Err(IdentityError::DuplicateEmail);
        }
        if let Some(stored) = users.get_mut(&user.user_id) {
            stored.name = user.name.clone();
            stored.email = user.email.clone();
            stored.avatar_url = user.avatar_url.clone();
            stored.password = user.password.clone();
            stored.updated_at = user.updated_at;
        }
        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> IdentityResult<bool> {
        Ok(self.users.write().await.remove(user_id).is_some())
    }

    async fn replace_pending_otp(
        &self,
        user_id: &UserId,
        otp: &PendingOtp,
    ) -> IdentityResult<bool> {
        let mut users = self.users.write().await;
        match users.get_mut(user_id) {
            Some(user) if !user.verified => {
                user.pending_otp = Some(*otp);
                user.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn consume_pending_otp(
        &self,
        user_id: &UserId,
        code_hash: &OtpHash,
        now: DateTime<Utc>,
    ) -> IdentityResult<bool> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(user_id) else {
            return Ok(false);
        };

        let accepted = user
            .pending_otp
            .is_some_and(|pending| pending.accepts(code_hash, now));
        if accepted {
            user.mark_verified(now);
        }
        Ok(accepted)
    }

    async fn link_external_identity(
        &self,
        user_id: &UserId,
        external_id: &ExternalId,
    ) -> IdentityResult<bool> {
        let mut users = self.users.write().await;

        let taken = users
            .values()
            .any(|u| u.user_id != *user_id && u.external_id.as_ref() == Some(external_id));
        if taken {
            return Err(IdentityError::DuplicateEmail);
        }

        match users.get_mut(user_id) {
            Some(user) if user.external_id.is_none() => {
                user.link(external_id.clone(), Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{DisplayName, OtpCode};
    use chrono::TimeDelta;

    fn federated(email: &str, external: &str) -> User {
        User::federated(
            DisplayName::from_db("X"),
            Email::from_trusted(email).unwrap(),
            ExternalId::new(external).unwrap(),
            None,
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let repo = InMemoryUserRepository::new();
        repo.create(&federated("a@x.com", "g-1")).await.unwrap();

        let err = repo.create(&federated("a@x.com", "g-2")).await.unwrap_err();
        assert!(matches!(err, IdentityError::DuplicateEmail));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_external_id() {
        let repo = InMemoryUserRepository::new();
        repo.create(&federated("a@x.com", "g-1")).await.unwrap();
        assert!(repo.create(&federated("b@x.com", "g-1")).await.is_err());
    }

    #[tokio::test]
    async fn test_consume_requires_unverified_matching_fresh_otp() {
        let repo = InMemoryUserRepository::new();
        let mut user = federated("a@x.com", "g-1");
        user.verified = false;
        user.external_id = None;
        let secret = [3u8; 32];
        let code = OtpCode::parse("123456").unwrap();
        let now = Utc::now();
        user.pending_otp = Some(PendingOtp::new(&code, &secret, now, TimeDelta::minutes(10)));
        repo.create(&user).await.unwrap();

        let wrong = OtpCode::parse("654321").unwrap().hash(&secret);
        assert!(!repo.consume_pending_otp(&user.user_id, &wrong, now).await.unwrap());

        let right = code.hash(&secret);
        let late = now + TimeDelta::minutes(10);
        assert!(!repo.consume_pending_otp(&user.user_id, &right, late).await.unwrap());

        assert!(repo.consume_pending_otp(&user.user_id, &right, now).await.unwrap());
        assert!(!repo.consume_pending_otp(&user.user_id, &right, now).await.unwrap());

        let stored = repo.find_by_id(&user.user_id).await.unwrap().unwrap();
        assert!(stored.verified);
        assert!(stored.pending_otp.is_none());
    }

    #[tokio::test]
    async fn test_link_only_once() {
        let repo = InMemoryUserRepository::new();
        let mut user = federated("a@x.com", "g-1");
        user.external_id = None;
        repo.create(&user).await.unwrap();

        let first = ExternalId::new("g-1").unwrap();
        let second = ExternalId::new("g-2").unwrap();
        assert!(repo.link_external_identity(&user.user_id, &first).await.unwrap());
        assert!(!repo.link_external_identity(&user.user_id, &second).await.unwrap());

        let stored = repo.find_by_external_id(&first).await.unwrap().unwrap();
        assert_eq!(stored.user_id, user.user_id);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryUserRepository::new();
        let user = federated("a@x.com", "g-1");
        repo.create(&user).await.unwrap();

        assert!(repo.delete(&user.user_id).await.unwrap());
        assert!(!repo.delete(&user.user_id).await.unwrap());
        assert!(repo.is_empty().await);
    }
}
