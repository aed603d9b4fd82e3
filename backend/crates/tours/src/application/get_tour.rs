//! Get Tour Use Case

use std::sync::Arc;

use kernel::id::TourId;

use crate::domain::entity::tour::Tour;
use crate::domain::repository::TourRepository;
use crate::error::{TourError, TourResult};

pub struct GetTourUseCase<T>
where
    T: TourRepository,
{
    repo: Arc<T>,
}

impl<T> GetTourUseCase<T>
where
    T: TourRepository,
{
    pub fn new(repo: Arc<T>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, id: &TourId) -> TourResult<Tour> {
        self.repo.find_by_id(id).await?.ok_or(TourError::TourNotFound)
    }
}
