//! # refract-graphql
//!
//! Compiles Refract entity schemas into a dynamic GraphQL API.
//!
//! Given an [`EntityCatalog`](refract_core::EntityCatalog) and a repository
//! per entity alias, [`RefractSchemaBuilder`] produces an
//! `async_graphql::dynamic::Schema` exposing, for an entity `product`:
//!
//! - Queries: `productCount`, `productEntityFindById`, `productList`,
//!   `productEntityList` and `productFindById` (or the singleton `product`
//!   for entities with at most one record)
//! - Mutations: `productCreate`, `productUpdate` and `productRemoveById`,
//!   each gated by a [`MutationPolicy`]
//!
//! ## Usage
//!
//! ```ignore
//! let catalog = EntityCatalog::from_toml_str(&std::fs::read_to_string("entities.toml")?)?;
//! let repositories = InMemoryDatabase::new().registry_for_catalog(&catalog);
//!
//! let schema = RefractSchemaBuilder::new(catalog, repositories)
//!     .with_config(config.graphql.to_schema_builder_config())
//!     .build()?;
//!
//! let context = RequestContext::builder()
//!     .with_user_id("editor")
//!     .with_request_id("req-1")
//!     .build()?;
//! let response = schema
//!     .execute(async_graphql::Request::new("{ productList { name } }").data(context))
//!     .await;
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Configuration options
//! - [`context`] - Per-request identity and correlation data
//! - [`policy`] - Mutation authorization
//! - [`schema`] - Type compilation and schema assembly
//! - [`resolvers`] - Query and mutation resolvers
//! - [`observability`] - Tracing subscriber setup
//! - [`error`] - Error types

pub mod config;
pub mod context;
pub mod error;
pub mod observability;
pub mod policy;
pub mod resolvers;
pub mod schema;

// Re-export main types
pub use config::{ConfigError, GraphQLConfig};
pub use context::{ContextBuilderError, Identity, RequestContext, RequestContextBuilder};
pub use error::{GraphQLError, SchemaError};
pub use policy::{MutationKind, MutationPolicy, MutationRequest, PolicyDecision, RequireIdentity};
pub use schema::{
    EntityTypeOptions, ProjectedField, ProjectionHelpers, ProjectionSet, ProjectionStrategy,
    PublicProjection, RefractSchemaBuilder, SchemaBuilderConfig,
};

/// Result type for GraphQL operations.
pub type Result<T> = std::result::Result<T, GraphQLError>;
