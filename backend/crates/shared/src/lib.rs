//! Shared Kernel - Domain-crossing minimal core
//!
//! - Unified error type ([`error::app_error::AppError`]) and its HTTP mapping
//! - Typed identifiers ([`id::Id`])
//!
//! Only things whose meaning is stable across every domain crate belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
