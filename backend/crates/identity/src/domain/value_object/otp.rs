//! One-Time Passcode Value Objects
//!
//! - `OtpCode`: the 6-digit clear code, only ever held in memory long enough
//!   to be mailed or checked
//! - `OtpHash`: keyed HMAC-SHA256 of the code, the only form that is stored
//! - `PendingOtp`: hash plus expiry, attached to an unverified user

use chrono::{DateTime, Duration, Utc};
use platform::crypto;
use rand::Rng;
use std::fmt;
use zeroize::Zeroize;

pub const OTP_DIGITS: usize = 6;
const OTP_SPACE: u32 = 1_000_000;

// ============================================================================
// Clear Code
// ============================================================================

pub struct OtpCode(String);

impl OtpCode {
    /// Draw a uniformly random code from `000000..=999999`
    pub fn generate() -> Self {
        let n = rand::rng().random_range(0..OTP_SPACE);
        Self(format!("{n:0width$}", width = OTP_DIGITS))
    }

    /// Parse a submitted code
    ///
    /// Returns `None` for anything that is not exactly six ASCII digits, so
    /// callers can reject it the same way as a wrong code.
    pub fn parse(raw: &str) -> Option<Self> {
        let code = raw.trim();
        (code.len() == OTP_DIGITS && code.bytes().all(|b| b.is_ascii_digit()))
            .then(|| Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn hash(&self, secret: &[u8]) -> OtpHash {
        OtpHash(crypto::hmac_sha256(secret, self.0.as_bytes()))
    }
}

impl Drop for OtpCode {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpCode([REDACTED])")
    }
}

// ============================================================================
// Stored Hash
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct OtpHash([u8; 32]);

impl OtpHash {
    /// Restore from a database column; `None` on wrong length
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        <[u8; 32]>::try_from(bytes).ok().map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Constant-time comparison
    pub fn matches(&self, other: &OtpHash) -> bool {
        crypto::constant_time_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for OtpHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpHash([HASH])")
    }
}

// ============================================================================
// Pending OTP
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingOtp {
    pub code_hash: OtpHash,
    pub expires_at: DateTime<Utc>,
}

impl PendingOtp {
    pub fn new(code: &OtpCode, secret: &[u8], now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            code_hash: code.hash(secret),
            expires_at: now + ttl,
        }
    }

    /// Both conditions must hold: the hash matches and `now < expires_at`
    pub fn accepts(&self, candidate: &OtpHash, now: DateTime<Utc>) -> bool {
        let fresh = now < self.expires_at;
        let matches = self.code_hash.matches(candidate);
        fresh & matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = &[7u8; 32];

    #[test]
    fn test_generate_is_six_digits() {
        for _ in 0..200 {
            let code = OtpCode::generate();
            assert_eq!(code.as_str().len(), OTP_DIGITS);
            assert!(code.as_str().bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn test_leading_zeros_kept() {
        let code = OtpCode::parse("000042").unwrap();
        assert_eq!(code.as_str(), "000042");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "12345", "1234567", "12a456", "١٢٣٤٥٦", "12 456"] {
            assert!(OtpCode::parse(bad).is_none(), "{bad:?}");
        }
        assert!(OtpCode::parse(" 483920 ").is_some());
    }

    #[test]
    fn test_hash_is_keyed() {
        let code = OtpCode::parse("483920").unwrap();
        assert!(code.hash(SECRET).matches(&code.hash(SECRET)));
        assert!(!code.hash(SECRET).matches(&code.hash(&[8u8; 32])));
        assert_ne!(code.hash(SECRET).as_bytes(), b"483920".as_slice());
    }

    #[test]
    fn test_pending_accepts_before_expiry_only() {
        let now = Utc::now();
        let code = OtpCode::parse("483920").unwrap();
        let pending = PendingOtp::new(&code, SECRET, now, Duration::minutes(10));

        assert_eq!(pending.expires_at, now + Duration::minutes(10));
        assert!(pending.accepts(&code.hash(SECRET), now));
        assert!(pending.accepts(&code.hash(SECRET), now + Duration::seconds(599)));
        assert!(!pending.accepts(&code.hash(SECRET), pending.expires_at));

        let wrong = OtpCode::parse("000000").unwrap();
        assert!(!pending.accepts(&wrong.hash(SECRET), now));
    }

    #[test]
    fn test_hash_from_slice() {
        let hash = OtpCode::parse("123456").unwrap().hash(SECRET);
        assert_eq!(OtpHash::from_slice(hash.as_bytes()), Some(hash));
        assert!(OtpHash::from_slice(&[0u8; 16]).is_none());
    }

    #[test]
    fn test_debug_redacted() {
        let code = OtpCode::parse("483920").unwrap();
        assert!(!format!("{code:?}").contains("483920"));
    }
}
