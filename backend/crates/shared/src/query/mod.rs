//! Listing support shared by every collection endpoint
//!
//! - [`translator`]: URL query pairs → [`filter::ListQuery`]
//! - [`pagination`]: page bounds and metadata
//! - [`document`]: evaluation over JSON documents (in-memory stores)
//! - [`sql`]: rendering into a `sqlx::QueryBuilder` (feature `sqlx`)

pub mod document;
pub mod filter;
pub mod pagination;
#[cfg(feature = "sqlx")]
pub mod sql;
pub mod translator;

pub use filter::{ListQuery, Projection, Sort, SortKey};
pub use pagination::{Page, PageMeta, PageRequest};
pub use translator::{QueryTranslator, ResourceDefaults};
