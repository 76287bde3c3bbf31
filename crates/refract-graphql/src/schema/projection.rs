//! Public projections.
//!
//! A public projection replaces an entity's property map when compiling the
//! public `{alias}` type. Each projected field names its GraphQL type and may
//! carry an async resolver computed from the parent record, which lets the
//! public API expose derived or joined values without changing what is
//! persisted.
//!
//! ```ignore
//! let projection = PublicProjection::new("news", |helpers| {
//!     let people = helpers.repository("person");
//!     let mut fields = IndexMap::new();
//!     fields.insert("title".into(), helpers.persisted("title").unwrap());
//!     fields.insert(
//!         "author".into(),
//!         ProjectedField::new(PropertyType::reference("person")).with_resolver(move |news| {
//!             let people = people.clone();
//!             async move { /* look the author up by id */ }
//!         }),
//!     );
//!     fields
//! });
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use indexmap::IndexMap;
use refract_core::{EntitySchema, PropertyType};
use refract_storage::{DynRepository, RepositoryRegistry};
use serde_json::Value;

/// Async resolver of a projected field, called with the parent record.
pub type ProjectedResolver =
    Arc<dyn Fn(Value) -> BoxFuture<'static, async_graphql::Result<Value>> + Send + Sync>;

/// One field of a public projection.
#[derive(Clone)]
pub struct ProjectedField {
    pub property_type: PropertyType,
    pub resolver: Option<ProjectedResolver>,
}

impl ProjectedField {
    /// A field resolved by direct lookup on the parent record.
    pub fn new(property_type: PropertyType) -> Self {
        Self {
            property_type,
            resolver: None,
        }
    }

    /// Attaches an async resolver computed from the parent record.
    #[must_use]
    pub fn with_resolver<F, Fut>(mut self, resolver: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = async_graphql::Result<Value>> + Send + 'static,
    {
        self.resolver = Some(Arc::new(move |parent| resolver(parent).boxed()));
        self
    }

    pub fn has_resolver(&self) -> bool {
        self.resolver.is_some()
    }
}

impl fmt::Debug for ProjectedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectedField")
            .field("property_type", &self.property_type)
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

/// Helpers handed to a projection builder.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionHelpers<'a> {
    schema: &'a EntitySchema,
    repositories: &'a RepositoryRegistry,
}

impl<'a> ProjectionHelpers<'a> {
    pub fn new(schema: &'a EntitySchema, repositories: &'a RepositoryRegistry) -> Self {
        Self {
            schema,
            repositories,
        }
    }

    /// Schema of the entity being projected.
    pub fn schema(&self) -> &'a EntitySchema {
        self.schema
    }

    /// The persisted property `name` as an unresolved projected field.
    pub fn persisted(&self, name: &str) -> Option<ProjectedField> {
        self.schema
            .properties
            .get(name)
            .map(|options| ProjectedField::new(options.property_type.clone()))
    }

    /// Repository bound to `alias`, for resolving references inside resolvers.
    pub fn repository(&self, alias: &str) -> Option<DynRepository> {
        self.repositories.get(alias)
    }
}

type BuildFn = dyn Fn(&ProjectionHelpers<'_>) -> IndexMap<String, ProjectedField> + Send + Sync;

/// Replacement property map for the public type of one entity.
#[derive(Clone)]
pub struct PublicProjection {
    alias: String,
    build: Arc<BuildFn>,
}

impl PublicProjection {
    pub fn new<F>(alias: impl Into<String>, build: F) -> Self
    where
        F: Fn(&ProjectionHelpers<'_>) -> IndexMap<String, ProjectedField> + Send + Sync + 'static,
    {
        Self {
            alias: alias.into(),
            build: Arc::new(build),
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Builds the projected property map.
    pub fn properties(&self, helpers: &ProjectionHelpers<'_>) -> IndexMap<String, ProjectedField> {
        (self.build)(helpers)
    }
}

impl fmt::Debug for PublicProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicProjection")
            .field("alias", &self.alias)
            .finish_non_exhaustive()
    }
}

/// Public projections keyed by entity alias.
#[derive(Debug, Clone, Default)]
pub struct ProjectionSet {
    projections: HashMap<String, PublicProjection>,
}

impl ProjectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a projection, replacing any previous one for the same alias.
    pub fn register(&mut self, projection: PublicProjection) {
        self.projections
            .insert(projection.alias.clone(), projection);
    }

    #[must_use]
    pub fn with(mut self, projection: PublicProjection) -> Self {
        self.register(projection);
        self
    }

    pub fn get(&self, alias: &str) -> Option<&PublicProjection> {
        self.projections.get(alias)
    }

    pub fn len(&self) -> usize {
        self.projections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projections.is_empty()
    }
}
