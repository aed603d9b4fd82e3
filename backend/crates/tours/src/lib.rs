//! Tours Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Tour entity, validation rules, aggregations, repository trait
//! - `application/` - Use cases
//! - `infra/` - PostgreSQL and in-memory stores
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Listing with filters, sorting, projection, full-text search and paging
//! - `top-5-cheap` alias, per-difficulty stats, monthly start plan
//! - Create, update and delete restricted to admins and lead guides
//! - Bulk import and purge for seeding
//!
//! Secret tours never leave the store: every read, update, delete and
//! aggregation skips them.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use domain::{Tour, TourDraft, TourPatch, TourRepository, TourView};
pub use error::{TourError, TourResult};
pub use infra::{InMemoryTourRepository, PgTourRepository};
pub use presentation::{ToursAppState, tours_router};
