//! Domain Layer
//!
//! Contains the user entity, value objects, and the collaborator traits
//! (user directory, email dispatcher).

pub mod entity;
pub mod mailer;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::User;
pub use mailer::{DeliveryError, OtpMailer};
pub use repository::UserRepository;
