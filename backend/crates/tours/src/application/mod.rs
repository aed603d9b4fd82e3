//! Application Layer
//!
//! One use case per file, each generic over the repository trait.

pub mod create_tour;
pub mod delete_tour;
pub mod get_tour;
pub mod import_tours;
pub mod list_tours;
pub mod monthly_plan;
pub mod tour_stats;
pub mod update_tour;

#[cfg(test)]
pub(crate) mod test_support;

pub use create_tour::CreateTourUseCase;
pub use delete_tour::DeleteTourUseCase;
pub use get_tour::GetTourUseCase;
pub use import_tours::{DeleteAllToursUseCase, ImportToursUseCase};
pub use list_tours::ListToursUseCase;
pub use monthly_plan::MonthlyPlanUseCase;
pub use tour_stats::TourStatsUseCase;
pub use update_tour::UpdateTourUseCase;
