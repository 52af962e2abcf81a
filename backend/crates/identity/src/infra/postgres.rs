//! PostgreSQL User Directory
//!
//! Every conditional operation is a single `UPDATE ... WHERE ...`; the row
//! lock taken by the update serializes concurrent callers per user.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    DisplayName, Email, ExternalId, OtpHash, PendingOtp, UserId, UserPassword,
};
use crate::error::{IdentityError, IdentityResult};

const SELECT_USER: &str = r#"
    SELECT
        user_id,
        name,
        email,
        password_hash,
        external_id,
        avatar_url,
        verified,
        otp_hash,
        otp_expires_at,
        created_at,
        updated_at
    FROM users
"#;

/// PostgreSQL-backed user directory
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Remove expired pending OTPs (housekeeping, not required for correctness)
    pub async fn purge_expired_otps(&self) -> IdentityResult<u64> {
        let cleared = sqlx::query(
            r#"
            UPDATE users SET otp_hash = NULL, otp_expires_at = NULL
            WHERE otp_expires_at IS NOT NULL AND otp_expires_at <= $1
            "#,
        )
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        tracing::info!(otps_cleared = cleared, "Purged expired OTPs");

        Ok(cleared)
    }

    async fn find_one(&self, clause: &str, value: &str) -> IdentityResult<Option<User>> {
        let sql = format!("{SELECT_USER} WHERE {clause}");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }
}

/// Unique violations on `users` (email or external id) mean the account
/// already exists
fn map_unique_violation(err: sqlx::Error) -> IdentityError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            IdentityError::DuplicateEmail
        }
        _ => IdentityError::Database(err),
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgUserRepository {
    async fn create(&self, user: &User) -> IdentityResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                name,
                email,
                password_hash,
                external_id,
                avatar_url,
                verified,
                otp_hash,
                otp_expires_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.name.as_str())
        .bind(user.email.as_str())
        .bind(user.password.as_ref().map(UserPassword::as_phc_string))
        .bind(user.external_id.as_ref().map(ExternalId::as_str))
        .bind(user.avatar_url.as_deref())
        .bind(user.verified)
        .bind(user.pending_otp.map(|otp| otp.code_hash.as_bytes().to_vec()))
        .bind(user.pending_otp.map(|otp| otp.expires_at))
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> IdentityResult<Option<User>> {
        let sql = format!("{SELECT_USER} WHERE user_id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> IdentityResult<Option<User>> {
        self.find_one("email = $1", email.as_str()).await
    }

    async fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> IdentityResult<Option<User>> {
        self.find_one("external_id = $1", external_id.as_str()).await
    }

    async fn update(&self, user: &User) -> IdentityResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                name = $2,
                email = $3,
                avatar_url = $4,
                password_hash = $5,
                updated_at = $6
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.name.as_str())
        .bind(user.email.as_str())
        .bind(user.avatar_url.as_deref())
        .bind(user.password.as_ref().map(UserPassword::as_phc_string))
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> IdentityResult<bool> {
        let deleted = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn replace_pending_otp(
        &self,
        user_id: &UserId,
        otp: &PendingOtp,
    ) -> IdentityResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE users SET
                otp_hash = $2,
                otp_expires_at = $3,
                updated_at = NOW()
            WHERE user_id = $1 AND verified = FALSE
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(otp.code_hash.as_bytes().as_slice())
        .bind(otp.expires_at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated == 1)
    }

    async fn consume_pending_otp(
        &self,
        user_id: &UserId,
        code_hash: &OtpHash,
        now: DateTime<Utc>,
    ) -> IdentityResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE users SET
                verified = TRUE,
                otp_hash = NULL,
                otp_expires_at = NULL,
                updated_at = $3
            WHERE user_id = $1
              AND otp_hash = $2
              AND otp_expires_at > $3
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(code_hash.as_bytes().as_slice())
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated == 1)
    }

    async fn link_external_identity(
        &self,
        user_id: &UserId,
        external_id: &ExternalId,
    ) -> IdentityResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE users SET
                external_id = $2,
                verified = TRUE,
                otp_hash = NULL,
                otp_expires_at = NULL,
                updated_at = NOW()
            WHERE user_id = $1 AND external_id IS NULL
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(external_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?
        .rows_affected();

        Ok(updated == 1)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    name: String,
    email: String,
    password_hash: Option<String>,
    external_id: Option<String>,
    avatar_url: Option<String>,
    verified: bool,
    otp_hash: Option<Vec<u8>>,
    otp_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> IdentityResult<User> {
        let password = self
            .password_hash
            .map(UserPassword::from_db)
            .transpose()
            .map_err(|e| IdentityError::Internal(format!("Invalid password_hash: {e}")))?;

        let pending_otp = match (self.otp_hash, self.otp_expires_at) {
            (Some(hash), Some(expires_at)) => Some(PendingOtp {
                code_hash: OtpHash::from_slice(&hash)
                    .ok_or_else(|| IdentityError::Internal("Invalid otp_hash length".into()))?,
                expires_at,
            }),
            _ => None,
        };

        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            name: DisplayName::from_db(self.name),
            email: Email::from_db(self.email),
            password,
            external_id: self.external_id.map(ExternalId::from_db),
            avatar_url: self.avatar_url,
            verified: self.verified,
            pending_otp,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
