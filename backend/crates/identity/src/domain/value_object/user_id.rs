//! User identifier
//!
//! Assigned on creation, never changes. The typed id lives in `kernel` so
//! other domains can reference users without depending on this crate.

pub use kernel::id::UserId;
