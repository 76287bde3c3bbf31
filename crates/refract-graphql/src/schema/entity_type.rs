//! Entity type compilation.
//!
//! One entity schema yields up to three GraphQL types:
//!
//! - `{alias}`: the public type, using the entity's public projection when one
//!   is registered and attaching its resolvers
//! - `{alias}Entity`: the persisted shape, resolved by direct lookup
//! - `{alias}Input`: the mutation input, built from the persisted shape
//!
//! Each starts with an implicit `_id: ID` field.

use async_graphql::dynamic::{InputObject, InputValue, Object, TypeRef};
use indexmap::IndexMap;
use refract_core::{EntitySchema, ID_FIELD};
use tracing::trace;

use super::projection::{ProjectedField, ProjectionHelpers};
use super::registry::Reservation;
use super::type_builder::{
    TypeCompiler, create_field_resolver, create_projected_field, ensure_valid_name, id_field,
};
use crate::error::SchemaError;

/// Which property map an entity type is compiled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectionStrategy {
    /// The persisted property map.
    Persisted,
    /// The registered public projection, falling back to the persisted map.
    Public,
}

/// Options for compiling an entity into an output type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityTypeOptions {
    pub prefix: String,
    pub suffix: String,
    /// Attach projection resolvers to their fields.
    pub attach_resolvers: bool,
    pub projection: ProjectionStrategy,
}

impl EntityTypeOptions {
    /// Options for the public `{alias}` type.
    pub fn public() -> Self {
        Self {
            prefix: String::new(),
            suffix: String::new(),
            attach_resolvers: true,
            projection: ProjectionStrategy::Public,
        }
    }

    /// Options for the persisted-shape `{alias}Entity` type.
    pub fn entity() -> Self {
        Self {
            prefix: String::new(),
            suffix: "Entity".to_string(),
            attach_resolvers: false,
            projection: ProjectionStrategy::Persisted,
        }
    }

    /// Type name for an entity alias under these options.
    pub fn type_name(&self, alias: &str) -> String {
        format!("{}{}{}", self.prefix, alias, self.suffix)
    }
}

/// Name of the mutation input type for an entity alias.
pub fn input_type_name(alias: &str) -> String {
    format!("{alias}Input")
}

impl TypeCompiler<'_> {
    /// Compiles an entity into an output type and returns its name.
    ///
    /// Compiling the same entity with the same options again returns the
    /// registered name. Re-entering an entity that is still being compiled
    /// (a self or mutual reference) returns its name as a forward reference.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if any property type fails to compile or the
    /// type name is taken by a different definition.
    pub fn compile_entity(
        &mut self,
        schema: &EntitySchema,
        options: &EntityTypeOptions,
    ) -> Result<String, SchemaError> {
        let type_name = options.type_name(&schema.alias);
        ensure_valid_name(&type_name)?;

        let fields = self.entity_fields(schema, options);
        let signature: Vec<_> = fields
            .iter()
            .map(|(key, field)| (key, &field.property_type, field.has_resolver()))
            .collect();
        let fingerprint = format!("object:entity:{}:{options:?}:{signature:?}", schema.alias);
        if self.registry.reserve(&type_name, fingerprint)? == Reservation::Existing {
            return Ok(type_name);
        }

        trace!(
            alias = %schema.alias,
            type_name = %type_name,
            projection = ?options.projection,
            "Generating entity type"
        );

        let mut object = Object::new(&type_name)
            .description(schema.label())
            .field(id_field());
        for (key, field) in &fields {
            if key == ID_FIELD {
                continue;
            }
            ensure_valid_name(key)?;
            let type_ref =
                self.build_output_type(&format!("{type_name}{key}"), &field.property_type, options)?;
            object = object.field(match &field.resolver {
                Some(resolver) if options.attach_resolvers => {
                    create_projected_field(key, type_ref, resolver.clone())
                }
                _ => create_field_resolver(key, type_ref),
            });
        }

        self.registry.finish_object(&type_name, object);
        Ok(type_name)
    }

    /// Compiles the `{alias}Input` type from the persisted properties.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if any property type fails to compile or the
    /// type name is taken by a different definition.
    pub fn compile_entity_input(&mut self, schema: &EntitySchema) -> Result<String, SchemaError> {
        let type_name = input_type_name(&schema.alias);
        ensure_valid_name(&type_name)?;

        let signature: Vec<_> = schema.property_types().collect();
        let fingerprint = format!("input:entity:{}:{signature:?}", schema.alias);
        if self.registry.reserve(&type_name, fingerprint)? == Reservation::Existing {
            return Ok(type_name);
        }

        trace!(alias = %schema.alias, type_name = %type_name, "Generating entity input type");

        let mut input = InputObject::new(&type_name)
            .description(format!("Input for {}", schema.label()))
            .field(InputValue::new(ID_FIELD, TypeRef::named(TypeRef::ID)));
        for (key, property_type) in schema.property_types() {
            if key == ID_FIELD {
                continue;
            }
            ensure_valid_name(key)?;
            let type_ref = self.build_input_type(&format!("{type_name}{key}"), property_type)?;
            input = input.field(InputValue::new(key, type_ref));
        }

        self.registry.finish_input(&type_name, input);
        Ok(type_name)
    }

    fn entity_fields(
        &self,
        schema: &EntitySchema,
        options: &EntityTypeOptions,
    ) -> IndexMap<String, ProjectedField> {
        if options.projection == ProjectionStrategy::Public
            && let Some(projection) = self.projections.get(&schema.alias)
        {
            return projection.properties(&ProjectionHelpers::new(schema, self.repositories));
        }

        schema
            .property_types()
            .map(|(key, property_type)| (key.to_string(), ProjectedField::new(property_type.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::projection::{ProjectionSet, PublicProjection};
    use refract_core::{EntityCatalog, PropertyType};
    use refract_storage::RepositoryRegistry;
    use serde_json::json;

    fn product() -> EntitySchema {
        EntitySchema::new("product")
            .unwrap()
            .property("name", PropertyType::string())
            .property("price", PropertyType::number())
            .property(
                "dimensions",
                PropertyType::shape([
                    ("width", PropertyType::number()),
                    ("height", PropertyType::number()),
                ]),
            )
    }

    #[test]
    fn test_variants_do_not_collide() {
        let catalog = EntityCatalog::from_schemas([product()]).unwrap();
        let repositories = RepositoryRegistry::new();
        let projections = ProjectionSet::new();
        let mut compiler = TypeCompiler::new(&catalog, &repositories, &projections);
        let schema = catalog.get("product").unwrap();

        let public = compiler
            .compile_entity(schema, &EntityTypeOptions::public())
            .unwrap();
        let entity = compiler
            .compile_entity(schema, &EntityTypeOptions::entity())
            .unwrap();
        let input = compiler.compile_entity_input(schema).unwrap();

        assert_eq!(public, "product");
        assert_eq!(entity, "productEntity");
        assert_eq!(input, "productInput");
        // product, productdimensions, productEntity, productEntitydimensions
        assert_eq!(compiler.registry().object_count(), 4);
        // productInput, productInputdimensions
        assert_eq!(compiler.registry().input_count(), 2);
        assert!(compiler.registry().contains("productEntitydimensions"));
        assert!(compiler.registry().contains("productInputdimensions"));
    }

    #[test]
    fn test_compile_twice_registers_once() {
        let catalog = EntityCatalog::from_schemas([product()]).unwrap();
        let repositories = RepositoryRegistry::new();
        let projections = ProjectionSet::new();
        let mut compiler = TypeCompiler::new(&catalog, &repositories, &projections);
        let schema = catalog.get("product").unwrap();

        compiler
            .compile_entity(schema, &EntityTypeOptions::public())
            .unwrap();
        compiler
            .compile_entity(schema, &EntityTypeOptions::public())
            .unwrap();
        assert_eq!(compiler.registry().object_count(), 2);
    }

    #[test]
    fn test_self_reference_compiles() {
        let category = EntitySchema::new("category")
            .unwrap()
            .property("title", PropertyType::string())
            .property("parent", PropertyType::reference("category"))
            .property(
                "children",
                PropertyType::array(PropertyType::reference("category")),
            );
        let catalog = EntityCatalog::from_schemas([category]).unwrap();
        let repositories = RepositoryRegistry::new();
        let projections = ProjectionSet::new();
        let mut compiler = TypeCompiler::new(&catalog, &repositories, &projections);
        let schema = catalog.get("category").unwrap();

        assert_eq!(
            compiler
                .compile_entity(schema, &EntityTypeOptions::public())
                .unwrap(),
            "category"
        );
        assert_eq!(compiler.compile_entity_input(schema).unwrap(), "categoryInput");
        assert!(!compiler.registry().is_generating("category"));
        assert_eq!(compiler.registry().object_count(), 1);
        assert_eq!(compiler.registry().input_count(), 1);
    }

    #[test]
    fn test_mutual_reference_compiles() {
        let person = EntitySchema::new("person")
            .unwrap()
            .property("name", PropertyType::string())
            .property("articles", PropertyType::array(PropertyType::reference("news")));
        let news = EntitySchema::new("news")
            .unwrap()
            .property("title", PropertyType::string())
            .property("author", PropertyType::reference("person"));
        let catalog = EntityCatalog::from_schemas([person, news]).unwrap();
        let repositories = RepositoryRegistry::new();
        let projections = ProjectionSet::new();
        let mut compiler = TypeCompiler::new(&catalog, &repositories, &projections);

        for schema in catalog.iter() {
            compiler
                .compile_entity(schema, &EntityTypeOptions::entity())
                .unwrap();
        }
        assert!(compiler.registry().contains("personEntity"));
        assert!(compiler.registry().contains("newsEntity"));
        assert_eq!(compiler.registry().object_count(), 2);
    }

    #[test]
    fn test_public_projection_replaces_properties() {
        let catalog = EntityCatalog::from_schemas([product()]).unwrap();
        let repositories = RepositoryRegistry::new();
        let projections = ProjectionSet::new().with(PublicProjection::new("product", |helpers| {
            let mut fields = IndexMap::new();
            fields.insert("name".to_string(), helpers.persisted("name").unwrap());
            fields.insert(
                "label".to_string(),
                ProjectedField::new(PropertyType::string())
                    .with_resolver(|record| async move { Ok(json!(format!("#{}", record["name"]))) }),
            );
            fields
        }));
        let mut compiler = TypeCompiler::new(&catalog, &repositories, &projections);
        let schema = catalog.get("product").unwrap();

        compiler
            .compile_entity(schema, &EntityTypeOptions::public())
            .unwrap();
        compiler
            .compile_entity(schema, &EntityTypeOptions::entity())
            .unwrap();

        // The projection drops `dimensions`, so only the persisted variant
        // generates a nested shape type.
        assert!(!compiler.registry().contains("productdimensions"));
        assert!(compiler.registry().contains("productEntitydimensions"));
    }

    #[test]
    fn test_prefix_and_suffix() {
        let options = EntityTypeOptions {
            prefix: "Admin".into(),
            suffix: "View".into(),
            attach_resolvers: false,
            projection: ProjectionStrategy::Persisted,
        };
        assert_eq!(options.type_name("product"), "AdminproductView");
        assert_eq!(input_type_name("product"), "productInput");
    }
}
