//! Monthly Plan Use Case

use std::sync::Arc;

use crate::domain::repository::TourRepository;
use crate::domain::stats::{MonthlyPlan, year_bounds};
use crate::error::{TourError, TourResult};

pub struct MonthlyPlanUseCase<T>
where
    T: TourRepository,
{
    repo: Arc<T>,
}

impl<T> MonthlyPlanUseCase<T>
where
    T: TourRepository,
{
    pub fn new(repo: Arc<T>) -> Self {
        Self { repo }
    }

    /// `raw_year` comes straight from the path.
    pub async fn execute(&self, raw_year: &str) -> TourResult<Vec<MonthlyPlan>> {
        let year = parse_year(raw_year)?;
        self.repo.monthly_plan(year).await
    }
}

fn parse_year(raw: &str) -> TourResult<i32> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|year| year_bounds(*year).is_some())
        .ok_or_else(|| TourError::InvalidYear(raw.to_string()))
}
