//! Delete User Use Case

use std::sync::Arc;

use kernel::id::UserId;

use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};

pub struct DeleteUserUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
}

impl<R> DeleteUserUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, id: &UserId) -> AuthResult<()> {
        if !self.repo.delete(id).await? {
            return Err(AuthError::UserNotFound);
        }
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }
}
