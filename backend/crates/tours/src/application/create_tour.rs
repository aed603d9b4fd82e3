//! Create Tour Use Case

use std::sync::Arc;

use crate::domain::entity::tour::{Tour, TourDraft};
use crate::domain::repository::TourRepository;
use crate::error::{TourError, TourResult};

pub struct CreateTourUseCase<T>
where
    T: TourRepository,
{
    repo: Arc<T>,
}

impl<T> CreateTourUseCase<T>
where
    T: TourRepository,
{
    pub fn new(repo: Arc<T>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, draft: TourDraft) -> TourResult<Tour> {
        let tour = Tour::create(draft).map_err(TourError::Validation)?;
        self.repo.create(&tour).await?;

        tracing::info!(tour_id = %tour.id, slug = %tour.slug, "Tour created");
        Ok(tour)
    }
}
