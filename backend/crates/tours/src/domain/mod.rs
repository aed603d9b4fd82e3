//! Domain Layer
//!
//! Contains entities, value objects, aggregations and the repository trait.

pub mod entity;
pub mod repository;
pub mod stats;
pub mod value_object;

// Re-exports
pub use entity::tour::{Tour, TourDraft, TourPatch, TourView};
pub use repository::TourRepository;
pub use stats::{DifficultyStats, MonthlyPlan};
