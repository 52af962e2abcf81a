//! Identity Routers

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::domain::mailer::OtpMailer;
use crate::domain::repository::UserRepository;
use crate::presentation::handlers::{self, IdentityAppState};
use crate::presentation::middleware::require_bearer;

/// Routes mounted under `/api/auth`
pub fn auth_router<R, M>(state: IdentityAppState<R, M>) -> Router
where
    R: UserRepository + Send + Sync + 'static,
    M: OtpMailer + Send + Sync + 'static,
{
    let guard = middleware::from_fn_with_state(state.clone(), require_bearer::<R, M>);

    Router::new()
        .route("/register", post(handlers::register::<R, M>))
        .route("/verify-otp", post(handlers::verify_otp::<R, M>))
        .route("/resend-otp", post(handlers::resend_otp::<R, M>))
        .route("/login", post(handlers::login::<R, M>))
        .route("/google", post(handlers::google_auth::<R, M>))
        .route(
            "/profile",
            get(handlers::get_profile::<R, M>).route_layer(guard),
        )
        .with_state(state)
}

/// Routes mounted under `/api/users`; all require a bearer token
pub fn users_router<R, M>(state: IdentityAppState<R, M>) -> Router
where
    R: UserRepository + Send + Sync + 'static,
    M: OtpMailer + Send + Sync + 'static,
{
    let guard = middleware::from_fn_with_state(state.clone(), require_bearer::<R, M>);

    Router::new()
        .route(
            "/profile",
            axum::routing::put(handlers::update_profile::<R, M>)
                .delete(handlers::delete_account::<R, M>),
        )
        .route_layer(guard)
        .with_state(state)
}

/// Both routers nested at their API prefixes
pub fn identity_router<R, M>(state: IdentityAppState<R, M>) -> Router
where
    R: UserRepository + Send + Sync + 'static,
    M: OtpMailer + Send + Sync + 'static,
{
    Router::new()
        .nest("/api/auth", auth_router(state.clone()))
        .nest("/api/users", users_router(state))
}
