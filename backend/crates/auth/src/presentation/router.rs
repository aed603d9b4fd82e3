//! Auth and Users Routers

use axum::Router;
use axum::routing::{get, patch, post};

use crate::domain::mailer::EmailClient;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_role::UserRole;
use crate::presentation::handlers::{self, AuthAppState};

/// Roles allowed to manage users
pub const USER_ADMINS: &[UserRole] = &[UserRole::Admin];

/// Routes under `/api/v1/auth`
pub fn auth_router<R, M>(state: AuthAppState<R, M>) -> Router
where
    R: UserRepository + Sync + 'static,
    M: EmailClient + Sync + 'static,
{
    let guard = state.guard();

    Router::new()
        .route("/signup", post(handlers::sign_up::<R, M>))
        .route("/verify-email", post(handlers::verify_email::<R, M>))
        .route("/resend-verification", post(handlers::resend_verification::<R, M>))
        .route("/login", post(handlers::sign_in::<R, M>))
        .route("/forgot-password", post(handlers::forgot_password::<R, M>))
        .route("/reset-password/{token}", patch(handlers::reset_password::<R, M>))
        .route(
            "/update-password",
            guard.protect(patch(handlers::update_password::<R, M>)),
        )
        .with_state(state)
}

/// Routes under `/api/v1/users`
pub fn users_router<R, M>(state: AuthAppState<R, M>) -> Router
where
    R: UserRepository + Sync + 'static,
    M: EmailClient + Sync + 'static,
{
    let guard = state.guard();

    Router::new()
        .route("/me", guard.protect(get(handlers::get_me)))
        .route(
            "/",
            guard.restrict(get(handlers::list_users::<R, M>), USER_ADMINS),
        )
        .route(
            "/{id}",
            guard.restrict(
                get(handlers::get_user::<R, M>).delete(handlers::delete_user::<R, M>),
                USER_ADMINS,
            ),
        )
        .with_state(state)
}
