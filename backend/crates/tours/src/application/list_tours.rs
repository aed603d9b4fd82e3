//! List Tours Use Case

use std::sync::Arc;

use kernel::query::{ListQuery, Page};

use crate::domain::entity::tour::Tour;
use crate::domain::repository::TourRepository;
use crate::error::TourResult;

pub struct ListToursUseCase<T>
where
    T: TourRepository,
{
    repo: Arc<T>,
}

impl<T> ListToursUseCase<T>
where
    T: TourRepository,
{
    pub fn new(repo: Arc<T>) -> Self {
        Self { repo }
    }

    /// Page and total are fetched concurrently with the same filter.
    pub async fn execute(&self, query: &ListQuery) -> TourResult<Page<Tour>> {
        let (tours, total) =
            tokio::try_join!(self.repo.find_page(query), self.repo.count(query))?;
        Ok(Page::new(tours, query.page, total))
    }
}
