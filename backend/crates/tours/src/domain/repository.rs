//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use kernel::id::TourId;
use kernel::query::ListQuery;

use crate::domain::entity::tour::Tour;
use crate::domain::stats::{DifficultyStats, MonthlyPlan};
use crate::error::TourResult;

/// Tour repository trait
///
/// Secret tours are invisible to every read, update, delete and
/// aggregation. `name` and `slug` are unique; a violation is a 409.
#[trait_variant::make(TourRepository: Send)]
pub trait LocalTourRepository {
    async fn create(&self, tour: &Tour) -> TourResult<()>;

    /// All or nothing
    async fn create_many(&self, tours: &[Tour]) -> TourResult<()>;

    async fn find_by_id(&self, id: &TourId) -> TourResult<Option<Tour>>;

    /// `TourNotFound` when no visible tour has this id
    async fn update(&self, tour: &Tour) -> TourResult<()>;

    /// `false` when no visible tour has this id
    async fn delete(&self, id: &TourId) -> TourResult<bool>;

    /// Removes every tour, secret ones included. Returns how many.
    async fn delete_all(&self) -> TourResult<u64>;

    /// One page of `query` (filter, sort, skip, limit)
    async fn find_page(&self, query: &ListQuery) -> TourResult<Vec<Tour>>;

    /// Number of tours matching `query.filter`
    async fn count(&self, query: &ListQuery) -> TourResult<u64>;

    /// Per-difficulty stats of tours rated at least `min_rating`
    async fn difficulty_stats(&self, min_rating: f64) -> TourResult<Vec<DifficultyStats>>;

    /// Start dates of `year` grouped by month
    async fn monthly_plan(&self, year: i32) -> TourResult<Vec<MonthlyPlan>>;
}
