//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations with no domain knowledge:
//! - Cryptographic utilities (HMAC-SHA256, Base64, randomness)
//! - Password hashing (Argon2id with optional pepper)

pub mod crypto;
pub mod password;
