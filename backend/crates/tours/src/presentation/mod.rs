//! Presentation Layer

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::ToursAppState;
pub use router::tours_router;
