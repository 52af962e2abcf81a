//! Bearer Token Middleware
//!
//! Guards protected routes: `Authorization: Bearer <token>` must carry a
//! valid, unexpired token whose user still exists. The resolved user is
//! stored in request extensions as `CurrentUser`.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;

use crate::application::AuthenticateUseCase;
use crate::domain::entity::User;
use crate::domain::mailer::OtpMailer;
use crate::domain::repository::UserRepository;
use crate::error::IdentityError;
use crate::presentation::handlers::IdentityAppState;

/// Authenticated user, inserted by `require_bearer`
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Extract the token from an `Authorization: Bearer` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Middleware that requires a valid bearer token
pub async fn require_bearer<R, M>(
    State(state): State<IdentityAppState<R, M>>,
    mut req: Request,
    next: Next,
) -> Result<Response, IdentityError>
where
    R: UserRepository + Send + Sync + 'static,
    M: OtpMailer + Send + Sync + 'static,
{
    let token = bearer_token(req.headers())
        .ok_or(IdentityError::SessionInvalid)?
        .to_string();

    let use_case = AuthenticateUseCase::new(state.repo.clone(), state.config.clone());
    let user = use_case.execute(&token).await?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}
