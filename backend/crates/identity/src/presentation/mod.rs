//! Presentation Layer
//!
//! HTTP handlers, DTOs, routers, and the bearer-token middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::IdentityAppState;
pub use middleware::{CurrentUser, bearer_token, require_bearer};
pub use router::{auth_router, identity_router, users_router};
