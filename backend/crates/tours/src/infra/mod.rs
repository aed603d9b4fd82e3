//! Infrastructure Layer
//!
//! Storage adapters for [`crate::domain::repository::TourRepository`].

pub mod memory;
pub mod postgres;

pub use memory::InMemoryTourRepository;
pub use postgres::PgTourRepository;
