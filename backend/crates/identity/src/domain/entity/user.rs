//! User Entity
//!
//! The only entity of the identity domain. Password accounts start
//! unverified with a pending OTP; federated accounts start verified.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    DisplayName, Email, ExternalId, PendingOtp, UserId, UserPassword,
};

#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    pub name: DisplayName,
    /// Normalized; unique across the directory
    pub email: Email,
    /// Absent for accounts created through federated login
    pub password: Option<UserPassword>,
    /// Set once, never cleared
    pub external_id: Option<ExternalId>,
    pub avatar_url: Option<String>,
    pub verified: bool,
    /// Only present while `verified == false`
    pub pending_otp: Option<PendingOtp>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// New password account awaiting email verification
    pub fn register(
        name: DisplayName,
        email: Email,
        password: UserPassword,
        pending_otp: PendingOtp,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: UserId::new(),
            name,
            email,
            password: Some(password),
            external_id: None,
            avatar_url: None,
            verified: false,
            pending_otp: Some(pending_otp),
            created_at: now,
            updated_at: now,
        }
    }

    /// New account vouched for by the identity provider
    pub fn federated(
        name: DisplayName,
        email: Email,
        external_id: ExternalId,
        avatar_url: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: UserId::new(),
            name,
            email,
            password: None,
            external_id: Some(external_id),
            avatar_url,
            verified: true,
            pending_otp: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    pub fn set_name(&mut self, name: DisplayName) {
        self.name = name;
        self.updated_at = Utc::now();
    }

    /// Does not reset `verified`
    pub fn set_email(&mut self, email: Email) {
        self.email = email;
        self.updated_at = Utc::now();
    }

    pub fn set_avatar(&mut self, avatar_url: String) {
        self.avatar_url = Some(avatar_url);
        self.updated_at = Utc::now();
    }

    pub fn set_password(&mut self, password: UserPassword) {
        self.password = Some(password);
        self.updated_at = Utc::now();
    }

    /// In-memory mirror of a successful OTP consumption
    pub(crate) fn mark_verified(&mut self, now: DateTime<Utc>) {
        self.verified = true;
        self.pending_otp = None;
        self.updated_at = now;
    }

    /// In-memory mirror of a successful account link
    pub(crate) fn link(&mut self, external_id: ExternalId, now: DateTime<Utc>) {
        self.external_id = Some(external_id);
        self.mark_verified(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{OtpCode, RawPassword};
    use chrono::Duration;

    fn registered() -> User {
        let now = Utc::now();
        let raw = RawPassword::new("secret1".to_string()).unwrap();
        User::register(
            DisplayName::new("Ana").unwrap(),
            Email::new("ana@x.com").unwrap(),
            UserPassword::from_raw(&raw, None).unwrap(),
            PendingOtp::new(&OtpCode::generate(), &[1u8; 32], now, Duration::minutes(10)),
            now,
        )
    }

    #[test]
    fn test_registered_user_is_unverified_with_otp() {
        let user = registered();
        assert!(!user.verified);
        assert!(user.pending_otp.is_some());
        assert!(user.has_password());
        assert!(user.external_id.is_none());
    }

    #[test]
    fn test_federated_user_is_verified_without_password() {
        let user = User::federated(
            DisplayName::from_db("Bo"),
            Email::from_trusted("bo@x.com").unwrap(),
            ExternalId::new("g-1").unwrap(),
            Some("https://img/bo.png".to_string()),
            Utc::now(),
        );
        assert!(user.verified);
        assert!(user.pending_otp.is_none());
        assert!(!user.has_password());
    }

    #[test]
    fn test_link_clears_pending_otp() {
        let mut user = registered();
        user.link(ExternalId::new("g-2").unwrap(), Utc::now());
        assert!(user.verified);
        assert!(user.pending_otp.is_none());
        assert_eq!(user.external_id.as_ref().map(ExternalId::as_str), Some("g-2"));
    }

    #[test]
    fn test_email_change_keeps_verification_state() {
        let mut user = registered();
        user.mark_verified(Utc::now());
        user.set_email(Email::new("new@x.com").unwrap());
        assert!(user.verified);
    }
}
