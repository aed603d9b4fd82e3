//! HTTP Handlers

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use kernel::envelope::{DataEnvelope, ListEnvelope, MessageEnvelope};
use kernel::error::app_error::AppError;
use kernel::extract::{ApiJson, ApiQuery, RequestedAt};
use kernel::id::UserId;
use kernel::query::{QueryTranslator, ResourceDefaults};
use platform::password::PasswordHasher;

use crate::application::config::AuthConfig;
use crate::application::{
    DeleteUserUseCase, ForgotPasswordUseCase, GetUserUseCase, ListUsersUseCase,
    ResendVerificationUseCase, ResetPasswordInput, ResetPasswordUseCase, SignInInput,
    SignInUseCase, SignUpInput, SignUpUseCase, UpdatePasswordInput, UpdatePasswordUseCase,
    VerifyEmailInput, VerifyEmailUseCase,
};
use crate::domain::mailer::EmailClient;
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};
use crate::infra::jwt::TokenSigner;
use crate::presentation::dto::{
    AuthResponse, EmailRequest, ResetPasswordRequest, SignInRequest, SignUpRequest,
    UpdatePasswordRequest, UserData, UsersData, VerifyEmailRequest,
};
use crate::presentation::middleware::{AuthGuard, CurrentUser};

const SIGNED_UP: &str = "User created successfully. Welcome aboard! \
    A verification code has been sent to your email.";
const SIGNED_UP_WITHOUT_EMAIL: &str = "User created successfully, but the verification email \
    could not be sent. Please request a new code at /api/v1/auth/resend-verification.";
const VERIFICATION_RESENT: &str =
    "If an unverified account exists for this email, a new verification code has been sent.";
const RESET_REQUESTED: &str =
    "If an account exists for this email, a password reset link has been sent.";

/// Shared state for auth and user handlers
pub struct AuthAppState<R, M> {
    pub repo: Arc<R>,
    pub mailer: Arc<M>,
    pub config: Arc<AuthConfig>,
    pub hasher: PasswordHasher,
    pub signer: Arc<TokenSigner>,
}

// Manual impl: a derive would require `R: Clone` and `M: Clone`.
impl<R, M> Clone for AuthAppState<R, M> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            mailer: self.mailer.clone(),
            config: self.config.clone(),
            hasher: self.hasher.clone(),
            signer: self.signer.clone(),
        }
    }
}

impl<R, M> AuthAppState<R, M>
where
    R: UserRepository + Sync + 'static,
    M: EmailClient + Sync + 'static,
{
    /// Fails on an unusable secret or hashing parameters.
    pub fn new(repo: R, mailer: M, config: AuthConfig) -> AuthResult<Self> {
        let hasher = PasswordHasher::new(config.hash_params)?;
        let signer = TokenSigner::new(&config)?;
        Ok(Self {
            repo: Arc::new(repo),
            mailer: Arc::new(mailer),
            config: Arc::new(config),
            hasher,
            signer: Arc::new(signer),
        })
    }

    /// Guard sharing this state's store and signer
    pub fn guard(&self) -> AuthGuard<R> {
        AuthGuard::new(self.repo.clone(), self.signer.clone())
    }
}

// ============================================================================
// Auth
// ============================================================================

/// POST /api/v1/auth/signup
pub async fn sign_up<R, M>(
    State(state): State<AuthAppState<R, M>>,
    ApiJson(req): ApiJson<SignUpRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + Sync + 'static,
    M: EmailClient + Sync + 'static,
{
    let use_case = SignUpUseCase::new(
        state.repo.clone(),
        state.mailer.clone(),
        state.hasher.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(SignUpInput {
            name: req.name,
            email: req.email,
            password: req.password,
            password_confirm: req.password_confirm,
        })
        .await?;

    let message = if output.verification_sent {
        SIGNED_UP
    } else {
        SIGNED_UP_WITHOUT_EMAIL
    };

    Ok((
        StatusCode::CREATED,
        ApiJson(AuthResponse::with_message(output.user.profile(), message)),
    ))
}

/// POST /api/v1/auth/verify-email
pub async fn verify_email<R, M>(
    State(state): State<AuthAppState<R, M>>,
    ApiJson(req): ApiJson<VerifyEmailRequest>,
) -> AuthResult<ApiJson<AuthResponse>>
where
    R: UserRepository + Sync + 'static,
    M: EmailClient + Sync + 'static,
{
    let use_case = VerifyEmailUseCase::new(state.repo.clone(), state.signer.clone());
    let output = use_case
        .execute(VerifyEmailInput {
            email: req.email,
            otp: req.otp,
        })
        .await?;

    Ok(ApiJson(AuthResponse::with_token(output.user.profile(), output.token)))
}

/// POST /api/v1/auth/resend-verification
pub async fn resend_verification<R, M>(
    State(state): State<AuthAppState<R, M>>,
    ApiJson(req): ApiJson<EmailRequest>,
) -> AuthResult<ApiJson<MessageEnvelope>>
where
    R: UserRepository + Sync + 'static,
    M: EmailClient + Sync + 'static,
{
    let use_case = ResendVerificationUseCase::new(
        state.repo.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );
    use_case.execute(req.email).await?;

    Ok(ApiJson(MessageEnvelope::success(VERIFICATION_RESENT)))
}

/// POST /api/v1/auth/login
pub async fn sign_in<R, M>(
    State(state): State<AuthAppState<R, M>>,
    ApiJson(req): ApiJson<SignInRequest>,
) -> AuthResult<ApiJson<AuthResponse>>
where
    R: UserRepository + Sync + 'static,
    M: EmailClient + Sync + 'static,
{
    let use_case = SignInUseCase::new(state.repo.clone(), state.hasher.clone(), state.signer.clone());
    let output = use_case
        .execute(SignInInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(ApiJson(AuthResponse::with_token(output.user.profile(), output.token)))
}

/// POST /api/v1/auth/forgot-password
pub async fn forgot_password<R, M>(
    State(state): State<AuthAppState<R, M>>,
    ApiJson(req): ApiJson<EmailRequest>,
) -> AuthResult<ApiJson<MessageEnvelope>>
where
    R: UserRepository + Sync + 'static,
    M: EmailClient + Sync + 'static,
{
    let use_case = ForgotPasswordUseCase::new(
        state.repo.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );
    use_case.execute(req.email).await?;

    Ok(ApiJson(MessageEnvelope::success(RESET_REQUESTED)))
}

/// PATCH /api/v1/auth/reset-password/{token}
pub async fn reset_password<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Path(token): Path<String>,
    ApiJson(req): ApiJson<ResetPasswordRequest>,
) -> AuthResult<ApiJson<AuthResponse>>
where
    R: UserRepository + Sync + 'static,
    M: EmailClient + Sync + 'static,
{
    let use_case =
        ResetPasswordUseCase::new(state.repo.clone(), state.hasher.clone(), state.signer.clone());
    let output = use_case
        .execute(ResetPasswordInput {
            token,
            password: req.password,
            password_confirm: req.password_confirm,
        })
        .await?;

    Ok(ApiJson(AuthResponse::with_token(output.user.profile(), output.token)))
}

/// PATCH /api/v1/auth/update-password
pub async fn update_password<R, M>(
    State(state): State<AuthAppState<R, M>>,
    CurrentUser(user): CurrentUser,
    ApiJson(req): ApiJson<UpdatePasswordRequest>,
) -> AuthResult<ApiJson<AuthResponse>>
where
    R: UserRepository + Sync + 'static,
    M: EmailClient + Sync + 'static,
{
    let use_case =
        UpdatePasswordUseCase::new(state.repo.clone(), state.hasher.clone(), state.signer.clone());
    let output = use_case
        .execute(
            &user.id,
            UpdatePasswordInput {
                current_password: req.current_password,
                password: req.password,
                password_confirm: req.password_confirm,
            },
        )
        .await?;

    Ok(ApiJson(AuthResponse::with_token(output.user.profile(), output.token)))
}

// ============================================================================
// Users
// ============================================================================

/// GET /api/v1/users/me
pub async fn get_me(CurrentUser(user): CurrentUser) -> ApiJson<DataEnvelope<UserData>> {
    ApiJson(DataEnvelope::success(UserData {
        user: user.profile(),
    }))
}

/// GET /api/v1/users
pub async fn list_users<R, M>(
    State(state): State<AuthAppState<R, M>>,
    RequestedAt(requested_at): RequestedAt,
    ApiQuery(pairs): ApiQuery<Vec<(String, String)>>,
) -> AuthResult<ApiJson<ListEnvelope<UsersData>>>
where
    R: UserRepository + Sync + 'static,
    M: EmailClient + Sync + 'static,
{
    let query = QueryTranslator::new(ResourceDefaults::default()).translate(&pairs)?;
    let page = ListUsersUseCase::new(state.repo.clone()).execute(&query).await?;

    let users = page
        .items
        .iter()
        .map(|user| -> Result<serde_json::Value, serde_json::Error> {
            let mut document = serde_json::to_value(user.profile())?;
            query.projection.apply(&mut document);
            Ok(document)
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(AppError::from)?;

    Ok(ApiJson(ListEnvelope::success(
        requested_at,
        users.len(),
        page.meta,
        UsersData { users },
    )))
}

/// GET /api/v1/users/{id}
pub async fn get_user<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Path(id): Path<String>,
) -> AuthResult<ApiJson<DataEnvelope<UserData>>>
where
    R: UserRepository + Sync + 'static,
    M: EmailClient + Sync + 'static,
{
    let id = UserId::parse(&id)?;
    let user = GetUserUseCase::new(state.repo.clone()).execute(&id).await?;

    Ok(ApiJson(DataEnvelope::success(UserData {
        user: user.profile(),
    })))
}

/// DELETE /api/v1/users/{id}
pub async fn delete_user<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AuthError>
where
    R: UserRepository + Sync + 'static,
    M: EmailClient + Sync + 'static,
{
    let id = UserId::parse(&id)?;
    DeleteUserUseCase::new(state.repo.clone()).execute(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
