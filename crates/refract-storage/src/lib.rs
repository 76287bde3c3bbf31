//! # refract-storage
//!
//! Repository abstraction for the Refract API compiler.
//!
//! The GraphQL layer only needs six operations from persistence, against one
//! named collection per entity alias: find-by-id, filtered/sorted/paginated
//! list, count, create, update and delete-by-id. They are expressed by the
//! [`Repository`] trait. This crate contains no implementation; see
//! `refract-db-memory` for the in-memory backend.
//!
//! ## Example
//!
//! ```ignore
//! use refract_storage::{Condition, Filter, FindQuery, Repository, SortParam};
//!
//! async fn cheapest(repo: &dyn Repository) -> Result<Vec<Value>, RepositoryError> {
//!     let query = FindQuery::new()
//!         .with_filter(Filter::field("price", Condition::Lt(json!(50))))
//!         .with_sort(SortParam::asc("price"))
//!         .with_limit(10);
//!     repo.find(&query).await
//! }
//! ```

mod error;
mod registry;
mod traits;
mod types;

pub use error::{ErrorCategory, RepositoryError};
pub use registry::RepositoryRegistry;
pub use traits::Repository;
pub use types::{Condition, Filter, FindQuery, SortDirection, SortParam, ValueKind};

/// Type alias for a repository result.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Type alias for a shared repository trait object.
pub type DynRepository = std::sync::Arc<dyn Repository>;
