//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of domain vocabulary:
//! - Common error types and result aliases
//! - Common primitive value objects (ID types, etc.)
//! - Query-string translation and pagination shared by every listing endpoint
//! - Slug derivation
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
    #[cfg(feature = "axum")]
    pub mod response;
}
#[cfg(feature = "axum")]
pub mod envelope;
#[cfg(feature = "axum")]
pub mod extract;
pub mod id;
pub mod query;
pub mod slug;
