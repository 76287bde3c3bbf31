//! Schema compilation.
//!
//! Turning an [`EntityCatalog`](refract_core::EntityCatalog) into a GraphQL
//! schema happens once, before serving:
//!
//! 1. [`RefractSchemaBuilder`] walks the catalog in order
//! 2. [`TypeCompiler`] compiles each entity into its public, persisted and
//!    input types, recursing through shapes, arrays and entity references
//! 3. [`TypeRegistry`] memoizes every generated type by name and structural
//!    fingerprint, so shared and recursive types register exactly once
//! 4. Query and mutation fields are bound to the entity's repository
//!
//! Public projections ([`ProjectionSet`]) replace the property map of the
//! public `{alias}` type without affecting the persisted `{alias}Entity`.

mod builder;
mod entity_type;
mod projection;
mod query_args;
mod registry;
mod type_builder;

pub use builder::{RefractSchemaBuilder, SchemaBuilderConfig};
pub use entity_type::{EntityTypeOptions, ProjectionStrategy, input_type_name};
pub use projection::{
    ProjectedField, ProjectedResolver, ProjectionHelpers, ProjectionSet, PublicProjection,
};
pub use query_args::{
    FieldKinds, SORT_DIRECTION_ENUM, operator_input_name, operator_inputs, parse_filter, parse_filter_arg,
    parse_find_query, parse_sort, sort_direction_enum,
};
pub use registry::{Reservation, TypeRegistry};
pub use type_builder::{DATE_TIME_SCALAR, TypeCompiler, date_time_scalar};
