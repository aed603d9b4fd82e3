//! Delete Tour Use Case

use std::sync::Arc;

use kernel::id::TourId;

use crate::domain::repository::TourRepository;
use crate::error::{TourError, TourResult};

pub struct DeleteTourUseCase<T>
where
    T: TourRepository,
{
    repo: Arc<T>,
}

impl<T> DeleteTourUseCase<T>
where
    T: TourRepository,
{
    pub fn new(repo: Arc<T>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, id: &TourId) -> TourResult<()> {
        if !self.repo.delete(id).await? {
            return Err(TourError::TourNotFound);
        }
        tracing::info!(tour_id = %id, "Tour deleted");
        Ok(())
    }
}
