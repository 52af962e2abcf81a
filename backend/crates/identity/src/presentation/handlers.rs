//! HTTP Handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use std::sync::Arc;

use crate::application::{
    DeleteAccountUseCase, FederatedLoginInput, FederatedLoginUseCase, GetProfileUseCase,
    IdentityConfig, LoginInput, LoginUseCase, RegisterInput, RegisterUseCase, ResendOtpInput,
    ResendOtpUseCase, UpdateProfileInput, UpdateProfileUseCase, VerifyOtpInput, VerifyOtpUseCase,
};
use crate::domain::mailer::OtpMailer;
use crate::domain::repository::UserRepository;
use crate::error::IdentityResult;
use crate::presentation::dto::{
    AuthResponse, GoogleAuthRequest, LoginRequest, MessageResponse, ProfileResponse,
    RegisterRequest, RegisterResponse, ResendOtpRequest, UpdateProfileRequest, VerifyOtpRequest,
};
use crate::presentation::middleware::CurrentUser;

/// Shared state for identity handlers
pub struct IdentityAppState<R, M>
where
    R: UserRepository + Send + Sync + 'static,
    M: OtpMailer + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub mailer: Arc<M>,
    pub config: Arc<IdentityConfig>,
}

impl<R, M> IdentityAppState<R, M>
where
    R: UserRepository + Send + Sync + 'static,
    M: OtpMailer + Send + Sync + 'static,
{
    pub fn new(repo: R, mailer: M, config: IdentityConfig) -> Self {
        Self {
            repo: Arc::new(repo),
            mailer: Arc::new(mailer),
            config: Arc::new(config),
        }
    }
}

// R and M need not be Clone
impl<R, M> Clone for IdentityAppState<R, M>
where
    R: UserRepository + Send + Sync + 'static,
    M: OtpMailer + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            mailer: self.mailer.clone(),
            config: self.config.clone(),
        }
    }
}

// ============================================================================
// Registration & OTP
// ============================================================================

/// POST /api/auth/register
pub async fn register<R, M>(
    State(state): State<IdentityAppState<R, M>>,
    Json(req): Json<RegisterRequest>,
) -> IdentityResult<(StatusCode, Json<RegisterResponse>)>
where
    R: UserRepository + Send + Sync + 'static,
    M: OtpMailer + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(
        state.repo.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(RegisterInput {
            name: req.name,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Registration successful. Please check your email for verification code."
                .to_string(),
            user_id: output.user_id.to_string(),
        }),
    ))
}

/// POST /api/auth/verify-otp
pub async fn verify_otp<R, M>(
    State(state): State<IdentityAppState<R, M>>,
    Json(req): Json<VerifyOtpRequest>,
) -> IdentityResult<Json<AuthResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: OtpMailer + Send + Sync + 'static,
{
    let use_case = VerifyOtpUseCase::new(state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(VerifyOtpInput {
            user_id: req.user_id,
            otp: req.otp,
        })
        .await?;

    Ok(Json(output.into()))
}

/// POST /api/auth/resend-otp
pub async fn resend_otp<R, M>(
    State(state): State<IdentityAppState<R, M>>,
    Json(req): Json<ResendOtpRequest>,
) -> IdentityResult<Json<MessageResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: OtpMailer + Send + Sync + 'static,
{
    let use_case = ResendOtpUseCase::new(
        state.repo.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );

    use_case
        .execute(ResendOtpInput {
            user_id: req.user_id,
        })
        .await?;

    Ok(Json(MessageResponse::new("OTP sent successfully")))
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/auth/login
pub async fn login<R, M>(
    State(state): State<IdentityAppState<R, M>>,
    Json(req): Json<LoginRequest>,
) -> IdentityResult<Json<AuthResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: OtpMailer + Send + Sync + 'static,
{
    let use_case = LoginUseCase::new(state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(LoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(output.into()))
}

/// POST /api/auth/google
pub async fn google_auth<R, M>(
    State(state): State<IdentityAppState<R, M>>,
    Json(req): Json<GoogleAuthRequest>,
) -> IdentityResult<Json<AuthResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: OtpMailer + Send + Sync + 'static,
{
    let use_case = FederatedLoginUseCase::new(state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(FederatedLoginInput {
            external_id: req.google_id,
            name: req.name,
            email: req.email,
            avatar: req.avatar,
        })
        .await?;

    Ok(Json(output.into()))
}

// ============================================================================
// Profile (bearer token required)
// ============================================================================

/// GET /api/auth/profile
pub async fn get_profile<R, M>(
    State(state): State<IdentityAppState<R, M>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> IdentityResult<Json<ProfileResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: OtpMailer + Send + Sync + 'static,
{
    let use_case = GetProfileUseCase::new(state.repo.clone());
    let user = use_case.execute(&user.user_id).await?;
    Ok(Json(user.into()))
}

/// PUT /api/users/profile
pub async fn update_profile<R, M>(
    State(state): State<IdentityAppState<R, M>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> IdentityResult<Json<ProfileResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: OtpMailer + Send + Sync + 'static,
{
    let use_case = UpdateProfileUseCase::new(state.repo.clone(), state.config.clone());

    let updated = use_case
        .execute(
            &user.user_id,
            UpdateProfileInput {
                name: req.name,
                email: req.email,
                avatar: req.avatar,
                password: req.password,
            },
        )
        .await?;

    Ok(Json(updated.into()))
}

/// DELETE /api/users/profile
pub async fn delete_account<R, M>(
    State(state): State<IdentityAppState<R, M>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> IdentityResult<Json<MessageResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: OtpMailer + Send + Sync + 'static,
{
    let use_case = DeleteAccountUseCase::new(state.repo.clone());
    use_case.execute(&user.user_id).await?;
    Ok(Json(MessageResponse::new("User account deleted successfully")))
}
