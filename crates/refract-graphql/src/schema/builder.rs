//! Schema assembly.

use std::sync::Arc;

use async_graphql::dynamic::{Object, Schema};
use refract_core::EntityCatalog;
use refract_storage::RepositoryRegistry;
use tracing::{debug, info};

use super::entity_type::EntityTypeOptions;
use super::projection::ProjectionSet;
use super::query_args::{operator_inputs, sort_direction_enum};
use super::type_builder::{TypeCompiler, date_time_scalar};
use crate::error::{GraphQLError, SchemaError};
use crate::policy::{MutationPolicy, RequireIdentity};
use crate::resolvers::{QueryTypes, mutation_fields, query_fields};

/// Configuration for schema building.
#[derive(Debug, Clone)]
pub struct SchemaBuilderConfig {
    /// Maximum query depth allowed.
    pub max_depth: usize,

    /// Maximum query complexity allowed.
    pub max_complexity: usize,

    /// Whether to enable introspection queries.
    pub introspection_enabled: bool,

    /// Upper bound for the `limit` argument of list fields.
    pub max_list_limit: Option<u64>,
}

impl Default for SchemaBuilderConfig {
    fn default() -> Self {
        Self {
            max_depth: 15,
            max_complexity: 500,
            introspection_enabled: true,
            max_list_limit: None,
        }
    }
}

/// Compiles an entity catalog into a dynamic GraphQL schema.
///
/// For every entity, in catalog order, the builder generates the public
/// `{alias}` type, the persisted `{alias}Entity` type, the `{alias}Input`
/// mutation input and the filter and sort inputs, then adds the query and
/// mutation fields bound to the entity's repository.
///
/// # Example
///
/// ```ignore
/// let schema = RefractSchemaBuilder::new(catalog, repositories)
///     .with_projections(projections)
///     .with_config(GraphQLConfig::default().to_schema_builder_config())
///     .build()?;
/// ```
pub struct RefractSchemaBuilder {
    catalog: EntityCatalog,
    repositories: RepositoryRegistry,
    projections: ProjectionSet,
    policy: Arc<dyn MutationPolicy>,
    config: SchemaBuilderConfig,
}

impl RefractSchemaBuilder {
    /// Creates a builder with no projections, the [`RequireIdentity`] policy
    /// and default limits.
    pub fn new(catalog: EntityCatalog, repositories: RepositoryRegistry) -> Self {
        Self {
            catalog,
            repositories,
            projections: ProjectionSet::new(),
            policy: Arc::new(RequireIdentity),
            config: SchemaBuilderConfig::default(),
        }
    }

    #[must_use]
    pub fn with_projections(mut self, projections: ProjectionSet) -> Self {
        self.projections = projections;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: Arc<dyn MutationPolicy>) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: SchemaBuilderConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the schema.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::SchemaBuildFailed` if the catalog is empty, an
    /// entity has no bound repository, a type fails to compile, or the
    /// finished schema does not validate.
    pub fn build(&self) -> Result<Schema, GraphQLError> {
        debug!(entities = self.catalog.len(), "Starting GraphQL schema build");

        if self.catalog.is_empty() {
            return Err(SchemaError::EmptyCatalog.into());
        }

        let mut compiler = TypeCompiler::new(&self.catalog, &self.repositories, &self.projections);
        let mut query = Object::new("Query");
        let mut mutation = Object::new("Mutation");

        for schema in self.catalog.iter() {
            let repository = self
                .repositories
                .get(&schema.alias)
                .ok_or_else(|| SchemaError::MissingRepository(schema.alias.clone()))?;

            let types = QueryTypes {
                public: compiler.compile_entity(schema, &EntityTypeOptions::public())?,
                entity: compiler.compile_entity(schema, &EntityTypeOptions::entity())?,
                filter: compiler.compile_filter_input(schema)?,
                sort: compiler.compile_sort_input(schema)?,
            };
            let input = compiler.compile_entity_input(schema)?;

            for field in query_fields(schema, &repository, &types, self.config.max_list_limit) {
                query = query.field(field);
            }
            for field in mutation_fields(schema, &repository, &self.policy, &types.public, &input) {
                mutation = mutation.field(field);
            }

            info!("Added schema: {}", schema.label());
        }

        let registry = compiler.into_registry();
        debug!(
            objects = registry.object_count(),
            inputs = registry.input_count(),
            "Registering generated types"
        );

        let mut builder = Schema::build("Query", Some("Mutation"), None)
            .register(date_time_scalar())
            .register(sort_direction_enum());
        for input in operator_inputs() {
            builder = builder.register(input);
        }
        builder = registry
            .register_all(builder)
            .register(query)
            .register(mutation)
            .limit_depth(self.config.max_depth)
            .limit_complexity(self.config.max_complexity);

        if !self.config.introspection_enabled {
            builder = builder.disable_introspection();
        }

        let schema = builder
            .finish()
            .map_err(|e| SchemaError::Finish(e.to_string()))?;

        debug!("GraphQL schema build complete");
        Ok(schema)
    }
}

impl std::fmt::Debug for RefractSchemaBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefractSchemaBuilder")
            .field("catalog", &self.catalog)
            .field("repositories", &self.repositories)
            .field("projections", &self.projections)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
