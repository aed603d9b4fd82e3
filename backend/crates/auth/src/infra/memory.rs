//! In-memory user store
//!
//! Same contract as the PostgreSQL store, including the unique email and
//! user name and the query semantics (through `kernel::query::document`).
//! Used by tests and by the API's router tests.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::error::app_error::AppError;
use kernel::id::UserId;
use kernel::query::ListQuery;
use kernel::query::document::DocumentSchema;
use tokio::sync::RwLock;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, user_name::UserName};
use crate::error::{AuthError, AuthResult};

/// Queryable fields of a user (the serialized profile)
pub const USER_SCHEMA: DocumentSchema = DocumentSchema {
    fields: &[
        "id",
        "name",
        "username",
        "email",
        "role",
        "isEmailVerified",
        "passwordChangedAt",
        "createdAt",
        "updatedAt",
    ],
    search: &[("name", 10)],
};

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_unique(users: &HashMap<UserId, User>, candidate: &User) -> AuthResult<()> {
        for other in users.values().filter(|u| u.id != candidate.id) {
            if other.email == candidate.email {
                return Err(duplicate("email", candidate.email.as_str()));
            }
            if other.user_name == candidate.user_name {
                return Err(duplicate("username", candidate.user_name.as_str()));
            }
        }
        Ok(())
    }

    async fn run(&self, query: &ListQuery) -> AuthResult<(Vec<User>, u64)> {
        let users = self.users.read().await;
        let documents = users
            .values()
            .map(|user| {
                serde_json::to_value(user.profile())
                    .map(|doc| (user.clone(), doc))
                    .map_err(AppError::from)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let (page, total) = USER_SCHEMA.run(documents, query)?;
        Ok((page.into_iter().map(|(user, _)| user).collect(), total))
    }
}

fn duplicate(field: &str, value: &str) -> AuthError {
    AuthError::App(AppError::conflict(format!(
        "Duplicate field: {field}: \"{value}\". Please use another value."
    )))
}

impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.write().await;
        Self::check_unique(&users, user)?;
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| &u.email == email).cloned())
    }

    async fn find_by_verification_otp(
        &self,
        email: &Email,
        otp_hash: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| &u.email == email && u.verification_otp_matches(otp_hash, now))
            .cloned())
    }

    async fn find_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.reset_token_matches(token_hash, now))
            .cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let users = self.users.read().await;
        Ok(users.values().any(|u| &u.email == email))
    }

    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool> {
        let users = self.users.read().await;
        Ok(users.values().any(|u| &u.user_name == user_name))
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(AuthError::UserNotFound);
        }
        Self::check_unique(&users, user)?;
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> AuthResult<bool> {
        Ok(self.users.write().await.remove(id).is_some())
    }

    async fn find_page(&self, query: &ListQuery) -> AuthResult<Vec<User>> {
        self.run(query).await.map(|(page, _)| page)
    }

    async fn count(&self, query: &ListQuery) -> AuthResult<u64> {
        self.run(query).await.map(|(_, total)| total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::user::fixtures;
    use kernel::query::{QueryTranslator, ResourceDefaults};

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_unique_email() {
        let repo = InMemoryUserRepository::new();
        repo.create(&fixtures::user("jane@example.com")).await.unwrap();

        let err = repo
            .create(&fixtures::user("jane@example.com"))
            .await
            .unwrap_err()
            .into_app_error();
        assert_eq!(err.status_code(), 409);
        assert_eq!(
            err.message(),
            "Duplicate field: email: \"jane@example.com\". Please use another value."
        );
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = InMemoryUserRepository::new();
        let mut user = fixtures::user("jane@example.com");
        repo.create(&user).await.unwrap();

        user.mark_email_verified();
        repo.update(&user).await.unwrap();
        assert!(repo.find_by_id(&user.id).await.unwrap().unwrap().is_email_verified);

        assert!(repo.delete(&user.id).await.unwrap());
        assert!(!repo.delete(&user.id).await.unwrap());
        assert!(matches!(repo.update(&user).await, Err(AuthError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_query_by_role() {
        let repo = InMemoryUserRepository::new();
        let mut admin = fixtures::user("admin@example.com");
        admin.role = crate::domain::value_object::user_role::UserRole::Admin;
        repo.create(&admin).await.unwrap();
        repo.create(&fixtures::user("jane@example.com")).await.unwrap();

        let query = QueryTranslator::new(ResourceDefaults::default())
            .translate(&pairs(&[("role", "admin")]))
            .unwrap();
        assert_eq!(repo.count(&query).await.unwrap(), 1);
        let page = repo.find_page(&query).await.unwrap();
        assert_eq!(page[0].email.as_str(), "admin@example.com");
    }

    #[tokio::test]
    async fn test_unknown_field_is_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.create(&fixtures::user("jane@example.com")).await.unwrap();
        let query = QueryTranslator::new(ResourceDefaults::default())
            .translate(&pairs(&[("passwordHash", "x")]))
            .unwrap();
        let err = repo.count(&query).await.unwrap_err().into_app_error();
        assert_eq!(err.status_code(), 400);
    }
}
