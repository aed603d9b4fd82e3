//! Tour Stats Use Case

use std::sync::Arc;

use crate::domain::repository::TourRepository;
use crate::domain::stats::{DifficultyStats, STATS_MIN_RATING};
use crate::error::TourResult;

pub struct TourStatsUseCase<T>
where
    T: TourRepository,
{
    repo: Arc<T>,
}

impl<T> TourStatsUseCase<T>
where
    T: TourRepository,
{
    pub fn new(repo: Arc<T>) -> Self {
        Self { repo }
    }

    /// Stats of tours rated at least [`STATS_MIN_RATING`]
    pub async fn execute(&self) -> TourResult<Vec<DifficultyStats>> {
        self.repo.difficulty_stats(STATS_MIN_RATING).await
    }
}
