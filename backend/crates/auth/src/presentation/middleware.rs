//! Auth Middleware
//!
//! `protect` resolves the bearer token to a [`CurrentUser`] in the request
//! extensions; `restrict_to` checks that user's role. Both are attached per
//! route through [`AuthGuard`], protect outermost.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::{Next, from_fn_with_state};
use axum::response::Response;
use axum::routing::MethodRouter;

use crate::application::AuthenticateUseCase;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_role::UserRole;
use crate::error::AuthError;
use crate::infra::jwt::TokenSigner;

/// The authenticated user, as loaded by `protect`
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::NotLoggedIn)
    }
}

/// Roles accepted by `restrict_to`
#[derive(Debug, Clone, Copy)]
pub struct AllowedRoles(pub &'static [UserRole]);

/// Route wrappers for authentication and authorization
pub struct AuthGuard<R> {
    repo: Arc<R>,
    signer: Arc<TokenSigner>,
}

// Manual impl: a derive would require `R: Clone`.
impl<R> Clone for AuthGuard<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            signer: self.signer.clone(),
        }
    }
}

impl<R> AuthGuard<R>
where
    R: UserRepository + Sync + 'static,
{
    pub fn new(repo: Arc<R>, signer: Arc<TokenSigner>) -> Self {
        Self { repo, signer }
    }

    /// Require a valid bearer token
    pub fn protect<S>(&self, route: MethodRouter<S>) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        route.route_layer(from_fn_with_state(self.clone(), protect::<R>))
    }

    /// Require a valid bearer token for a user with one of `roles`
    pub fn restrict<S>(&self, route: MethodRouter<S>, roles: &'static [UserRole]) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let route = route.route_layer(from_fn_with_state(AllowedRoles(roles), restrict_to));
        self.protect(route)
    }
}

/// Middleware that requires a valid bearer token
pub async fn protect<R>(
    State(guard): State<AuthGuard<R>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError>
where
    R: UserRepository + Sync + 'static,
{
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let use_case = AuthenticateUseCase::new(guard.repo.clone(), guard.signer.clone());
    let user = use_case.execute(header).await?;

    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

/// Middleware that requires `protect` to have run with an allowed role
pub async fn restrict_to(
    State(AllowedRoles(roles)): State<AllowedRoles>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let Some(CurrentUser(user)) = req.extensions().get::<CurrentUser>() else {
        return Err(AuthError::NotLoggedIn);
    };
    if !roles.contains(&user.role) {
        tracing::warn!(user_id = %user.id, role = %user.role, "Forbidden");
        return Err(AuthError::Forbidden);
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::AuthConfig;
    use crate::domain::entity::user::fixtures;
    use crate::infra::memory::InMemoryUserRepository;
    use axum::Router;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::routing::get;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn whoami(CurrentUser(user): CurrentUser) -> String {
        user.email.as_str().to_string()
    }

    async fn setup() -> (Router, Arc<InMemoryUserRepository>, Arc<TokenSigner>) {
        let repo = Arc::new(InMemoryUserRepository::new());
        let signer = Arc::new(TokenSigner::new(&AuthConfig::for_tests()).unwrap());
        let guard = AuthGuard::new(repo.clone(), signer.clone());
        let app = Router::new()
            .route("/me", guard.protect(get(whoami)))
            .route("/admin", guard.restrict(get(whoami), &[UserRole::Admin]));
        (app, repo, signer)
    }

    async fn call(app: Router, path: &str, token: Option<&str>) -> (StatusCode, String) {
        let mut request = Request::get(path);
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let response = app.oneshot(request.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tokio::test]
    async fn test_protect_inserts_current_user() {
        let (app, repo, signer) = setup().await;
        let user = fixtures::verified_user("jane@example.com");
        repo.create(&user).await.unwrap();
        let token = signer.issue(&user.id).unwrap();

        let (status, body) = call(app, "/me", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "jane@example.com");
    }

    #[tokio::test]
    async fn test_protect_without_token() {
        let (app, _, _) = setup().await;
        let (status, body) = call(app, "/me", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("You are not logged in!"));
    }

    #[tokio::test]
    async fn test_restrict_to_roles() {
        let (app, repo, signer) = setup().await;
        let user = fixtures::verified_user("jane@example.com");
        let mut admin = fixtures::verified_user("admin@example.com");
        admin.role = UserRole::Admin;
        repo.create(&user).await.unwrap();
        repo.create(&admin).await.unwrap();

        let (status, body) = call(app.clone(), "/admin", Some(&signer.issue(&user.id).unwrap())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.contains("You do not have permission to perform this action"));

        let (status, _) = call(app.clone(), "/admin", Some(&signer.issue(&admin.id).unwrap())).await;
        assert_eq!(status, StatusCode::OK);

        // protect runs before the role check
        let (status, _) = call(app, "/admin", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
