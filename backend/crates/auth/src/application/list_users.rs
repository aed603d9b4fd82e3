//! List Users Use Case

use std::sync::Arc;

use kernel::query::{ListQuery, Page};

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::error::AuthResult;

pub struct ListUsersUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
}

impl<R> ListUsersUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Page and total are fetched concurrently with the same filter.
    pub async fn execute(&self, query: &ListQuery) -> AuthResult<Page<User>> {
        let (users, total) =
            tokio::try_join!(self.repo.find_page(query), self.repo.count(query))?;
        Ok(Page::new(users, query.page, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::Harness;
    use kernel::query::{QueryTranslator, ResourceDefaults};

    fn query(pairs: &[(&str, &str)]) -> ListQuery {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        QueryTranslator::new(ResourceDefaults::default())
            .translate(&pairs)
            .unwrap()
    }

    #[tokio::test]
    async fn test_pages_and_metadata() {
        let h = Harness::new();
        for i in 0..5 {
            h.verified_user(&format!("user{i}@example.com")).await;
        }

        let page = h
            .list_users()
            .execute(&query(&[("limit", "2"), ("page", "3")]))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.meta.total_docs, 5);
        assert_eq!(page.meta.total_pages, 3);
        assert!(!page.meta.has_next_page);
        assert!(page.meta.has_prev_page);
    }

    #[tokio::test]
    async fn test_filter_by_role() {
        let h = Harness::new();
        let mut admin = crate::domain::entity::user::fixtures::verified_user("admin@example.com");
        admin.role = crate::domain::value_object::user_role::UserRole::Admin;
        h.repo.create(&admin).await.unwrap();
        h.verified_user("jane@example.com").await;

        let page = h.list_users().execute(&query(&[("role", "admin")])).await.unwrap();
        assert_eq!(page.meta.total_docs, 1);
        assert_eq!(page.items[0].id, admin.id);
    }
}
