//! Value Object Module

pub mod display_name;
pub mod email;
pub mod external_id;
pub mod otp;
pub mod user_id;
pub mod user_password;

pub use display_name::DisplayName;
pub use email::Email;
pub use external_id::ExternalId;
pub use otp::{OtpCode, OtpHash, PendingOtp};
pub use user_id::UserId;
pub use user_password::{RawPassword, UserPassword};
