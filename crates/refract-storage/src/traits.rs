//! Repository trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::RepositoryError;
use crate::types::{Filter, FindQuery};

/// Persistence access for one entity collection.
///
/// A repository is bound to a single collection (one per entity alias).
/// Records are JSON objects carrying their identifier in the `_id` field.
/// Implementations must be thread-safe (`Send + Sync`): the compiled schema
/// shares one handle across all concurrently executing resolvers.
///
/// # Example
///
/// ```ignore
/// use refract_storage::{Repository, RepositoryError};
///
/// async fn get_product(repo: &dyn Repository, id: &str) -> Result<Value, RepositoryError> {
///     repo.find_by_id(id)
///         .await?
///         .ok_or_else(|| RepositoryError::invalid_record(format!("no product {id}")))
/// }
/// ```
#[async_trait]
pub trait Repository: Send + Sync {
    /// Counts records matching the filter.
    async fn count(&self, filter: &Filter) -> Result<u64, RepositoryError>;

    /// Reads a record by identifier.
    ///
    /// Returns `None` if the record does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues, not for missing records.
    async fn find_by_id(&self, id: &str) -> Result<Option<Value>, RepositoryError>;

    /// Lists records matching the query's filter, sort and pagination.
    async fn find(&self, query: &FindQuery) -> Result<Vec<Value>, RepositoryError>;

    /// Inserts a new record.
    ///
    /// If the record has no `_id`, the repository generates one. Returns the
    /// record as stored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::AlreadyExists` if the supplied `_id` is taken.
    /// Returns `RepositoryError::InvalidRecord` if the record is not an object.
    async fn create(&self, record: &Value) -> Result<Value, RepositoryError>;

    /// Applies the supplied fields to the record with the given identifier.
    ///
    /// Fields absent from `changes` are left untouched. Returns the updated
    /// record, or `None` if no record has that identifier.
    async fn update(&self, id: &str, changes: &Value) -> Result<Option<Value>, RepositoryError>;

    /// Deletes a record by identifier.
    ///
    /// Returns whether a record was removed.
    async fn delete_by_id(&self, id: &str) -> Result<bool, RepositoryError>;

    /// Returns the first record matching the filter, in natural order.
    async fn find_one(&self, filter: &Filter) -> Result<Option<Value>, RepositoryError> {
        let query = FindQuery::new().with_filter(filter.clone()).with_limit(1);
        Ok(self.find(&query).await?.into_iter().next())
    }

    /// Name of the collection this repository is bound to.
    fn collection(&self) -> &str;

    /// Returns the name of this backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}
