//! Application Layer
//!
//! One use case per identity operation, plus configuration and the
//! session token issuer.

pub mod authenticate;
pub mod config;
pub mod federated_login;
pub mod login;
mod otp_dispatch;
pub mod profile;
pub mod register;
pub mod resend_otp;
pub mod token;
pub mod verify_otp;

// Re-exports
pub use authenticate::AuthenticateUseCase;
pub use config::IdentityConfig;
pub use federated_login::{FederatedLoginInput, FederatedLoginUseCase};
pub use login::{LoginInput, LoginUseCase};
pub use profile::{
    DeleteAccountUseCase, GetProfileUseCase, UpdateProfileInput, UpdateProfileUseCase,
};
pub use register::{RegisterInput, RegisterOutput, RegisterUseCase};
pub use resend_otp::{ResendOtpInput, ResendOtpUseCase};
pub use token::{AuthOutput, TokenIssuer};
pub use verify_otp::{VerifyOtpInput, VerifyOtpUseCase};
