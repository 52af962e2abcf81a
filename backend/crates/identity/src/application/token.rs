//! Session Tokens
//!
//! HS256 JWTs keyed by `token_secret` with claims `{sub, iat, exp}`; the
//! server keeps no session table, so tokens cannot be revoked before they
//! expire.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::application::config::IdentityConfig;
use crate::domain::entity::User;
use crate::domain::value_object::UserId;
use crate::error::{IdentityError, IdentityResult};

/// Result of every operation that signs a user in
#[derive(Debug)]
pub struct AuthOutput {
    pub user: User,
    pub token: String,
}

/// Session token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: TimeDelta,
}

impl TokenIssuer {
    pub fn new(secret: [u8; 32], ttl: TimeDelta) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(&secret),
            decoding_key: DecodingKey::from_secret(&secret),
            validation,
            ttl,
        }
    }

    pub fn from_config(config: &IdentityConfig) -> Self {
        Self::new(config.token_secret, config.token_validity())
    }

    pub fn issue(&self, user_id: &UserId) -> IdentityResult<String> {
        self.issue_at(user_id, Utc::now())
    }

    pub fn issue_at(&self, user_id: &UserId, now: DateTime<Utc>) -> IdentityResult<String> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| IdentityError::Internal("token expiry out of range".into()))?;

        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| IdentityError::Internal(format!("could not encode session token: {e}")))
    }

    /// Check signature and expiry, returning the embedded user id
    ///
    /// Does not check that the user still exists; see `AuthenticateUseCase`.
    pub fn validate(&self, token: &str) -> IdentityResult<UserId> {
        let data =
            jsonwebtoken::decode::<SessionClaims>(token.trim(), &self.decoding_key, &self.validation)
                .map_err(|e| {
                    tracing::debug!(error = %e, "Rejected session token");
                    IdentityError::SessionInvalid
                })?;

        data.claims
            .sub
            .parse()
            .map_err(|_| IdentityError::SessionInvalid)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: [u8; 32] = [9u8; 32];

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(SECRET, TimeDelta::days(30))
    }

    #[test]
    fn test_round_trip() {
        let user_id = UserId::new();
        let token = issuer().issue(&user_id).unwrap();
        assert_eq!(issuer().validate(&token).unwrap(), user_id);
    }

    #[test]
    fn test_claims_carry_thirty_day_window() {
        let user_id = UserId::new();
        let token = issuer().issue(&user_id).unwrap();

        let data = jsonwebtoken::decode::<SessionClaims>(
            &token,
            &DecodingKey::from_secret(&SECRET),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();
        assert_eq!(data.header.alg, Algorithm::HS256);
        assert_eq!(data.claims.sub, user_id.to_string());
        assert_eq!(data.claims.exp - data.claims.iat, 30 * 24 * 60 * 60);
    }

    #[test]
    fn test_rejected_after_expiry() {
        let user_id = UserId::new();
        let now = Utc::now();

        let fresh = issuer().issue_at(&user_id, now - TimeDelta::days(29)).unwrap();
        assert!(issuer().validate(&fresh).is_ok());

        let stale = issuer()
            .issue_at(&user_id, now - TimeDelta::days(30) - TimeDelta::seconds(5))
            .unwrap();
        assert!(matches!(
            issuer().validate(&stale),
            Err(IdentityError::SessionInvalid)
        ));
    }

    #[test]
    fn test_rejected_with_other_secret() {
        let token = issuer().issue(&UserId::new()).unwrap();
        let other = TokenIssuer::new([1u8; 32], TimeDelta::days(30));
        assert!(other.validate(&token).is_err());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let token = issuer().issue(&UserId::new()).unwrap();
        let victim = issuer().issue(&UserId::new()).unwrap();

        // victim's claims under the first token's signature
        let parts: Vec<&str> = token.split('.').collect();
        let victim_claims = victim.split('.').nth(1).unwrap();
        let forged = format!("{}.{}.{}", parts[0], victim_claims, parts[2]);
        assert!(matches!(
            issuer().validate(&forged),
            Err(IdentityError::SessionInvalid)
        ));
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: UserId::new().to_string(),
            iat: now.timestamp(),
            exp: (now + TimeDelta::days(1)).timestamp(),
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(&SECRET),
        )
        .unwrap();
        assert!(issuer().validate(&token).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        for bad in ["", "abc", "a.b", "a.b.c", "...", "Bearer x"] {
            assert!(issuer().validate(bad).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn test_unrepresentable_expiry_is_an_error() {
        let issuer = TokenIssuer::new(SECRET, TimeDelta::days(365 * 300_000));
        assert!(matches!(
            issuer.issue(&UserId::new()),
            Err(IdentityError::Internal(_))
        ));
    }
}
