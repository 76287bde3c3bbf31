//! Property type to GraphQL type mapping.
//!
//! [`TypeCompiler`] owns the [`TypeRegistry`] for one schema build and turns
//! property types into GraphQL type references, generating nested object and
//! input types on the way. Nested types are named by concatenating the
//! enclosing name and the property key, so `dimensions` on `product` becomes
//! `productdimensions`.

use async_graphql::Value;
use async_graphql::dynamic::{Field, FieldFuture, InputObject, InputValue, Object, Scalar, TypeRef};
use indexmap::IndexMap;
use refract_core::{EntityCatalog, ID_FIELD, PropertyType, is_valid_graphql_name, parse_datetime};
use refract_storage::RepositoryRegistry;
use tracing::trace;

use super::entity_type::EntityTypeOptions;
use super::projection::{ProjectedResolver, ProjectionSet};
use super::registry::{Reservation, TypeRegistry};
use crate::error::SchemaError;
use crate::resolvers::{graphql_value_to_json, json_to_graphql_value};

/// Name of the custom timestamp scalar.
pub const DATE_TIME_SCALAR: &str = "DateTime";

/// Creates the `DateTime` scalar.
///
/// Values are RFC 3339 strings. They are validated on input and passed
/// through verbatim so sub-second precision and offsets round-trip.
pub fn date_time_scalar() -> Scalar {
    Scalar::new(DATE_TIME_SCALAR)
        .description("An RFC 3339 date-time string, e.g. 2024-01-15T10:30:00Z")
        .validator(|value| matches!(value, Value::String(s) if parse_datetime(s).is_ok()))
}

/// Compiles property types into GraphQL types for one schema build.
pub struct TypeCompiler<'a> {
    pub(super) catalog: &'a EntityCatalog,
    pub(super) repositories: &'a RepositoryRegistry,
    pub(super) projections: &'a ProjectionSet,
    pub(super) registry: TypeRegistry,
}

impl<'a> TypeCompiler<'a> {
    pub fn new(
        catalog: &'a EntityCatalog,
        repositories: &'a RepositoryRegistry,
        projections: &'a ProjectionSet,
    ) -> Self {
        Self {
            catalog,
            repositories,
            projections,
            registry: TypeRegistry::new(),
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Consumes the compiler, returning its registry.
    pub fn into_registry(self) -> TypeRegistry {
        self.registry
    }

    /// Builds the output type for a property.
    ///
    /// Entity references compile the referenced entity with the same
    /// `options` as the enclosing type.
    ///
    /// # Errors
    ///
    /// Fails on empty shapes, invalid names, unknown entity references and
    /// type name conflicts.
    pub fn build_output_type(
        &mut self,
        name: &str,
        property_type: &PropertyType,
        options: &EntityTypeOptions,
    ) -> Result<TypeRef, SchemaError> {
        match property_type {
            PropertyType::String => Ok(TypeRef::named(TypeRef::STRING)),
            PropertyType::Number => Ok(TypeRef::named(TypeRef::FLOAT)),
            PropertyType::Boolean => Ok(TypeRef::named(TypeRef::BOOLEAN)),
            PropertyType::Date => Ok(TypeRef::named(DATE_TIME_SCALAR)),
            PropertyType::Array(element) => Ok(TypeRef::List(Box::new(
                self.build_output_type(name, element, options)?,
            ))),
            PropertyType::Shape(fields) => self.build_output_shape(name, fields, options),
            PropertyType::EntityReference(target) => {
                let catalog = self.catalog;
                let schema = catalog.get(target).ok_or_else(|| {
                    SchemaError::UnknownEntityReference {
                        type_name: name.to_string(),
                        target: target.clone(),
                    }
                })?;
                let type_name = self.compile_entity(schema, options)?;
                Ok(TypeRef::named(type_name))
            }
        }
    }

    /// Builds the input type for a property.
    ///
    /// Entity references resolve to the referenced entity's `{alias}Input`.
    ///
    /// # Errors
    ///
    /// Fails on empty shapes, invalid names, unknown entity references and
    /// type name conflicts.
    pub fn build_input_type(
        &mut self,
        name: &str,
        property_type: &PropertyType,
    ) -> Result<TypeRef, SchemaError> {
        match property_type {
            PropertyType::String => Ok(TypeRef::named(TypeRef::STRING)),
            PropertyType::Number => Ok(TypeRef::named(TypeRef::FLOAT)),
            PropertyType::Boolean => Ok(TypeRef::named(TypeRef::BOOLEAN)),
            PropertyType::Date => Ok(TypeRef::named(DATE_TIME_SCALAR)),
            PropertyType::Array(element) => Ok(TypeRef::List(Box::new(
                self.build_input_type(name, element)?,
            ))),
            PropertyType::Shape(fields) => self.build_input_shape(name, fields),
            PropertyType::EntityReference(target) => {
                let catalog = self.catalog;
                let schema = catalog.get(target).ok_or_else(|| {
                    SchemaError::UnknownEntityReference {
                        type_name: name.to_string(),
                        target: target.clone(),
                    }
                })?;
                let type_name = self.compile_entity_input(schema)?;
                Ok(TypeRef::named(type_name))
            }
        }
    }

    fn build_output_shape(
        &mut self,
        name: &str,
        fields: &IndexMap<String, PropertyType>,
        options: &EntityTypeOptions,
    ) -> Result<TypeRef, SchemaError> {
        if fields.is_empty() {
            return Err(SchemaError::EmptyShape(name.to_string()));
        }
        ensure_valid_name(name)?;

        let fingerprint = format!("object:shape:{options:?}:{fields:?}");
        if self.registry.reserve(name, fingerprint)? == Reservation::Existing {
            return Ok(TypeRef::named(name));
        }

        trace!(type_name = %name, fields = fields.len(), "Generating shape type");
        let mut object = Object::new(name);
        for (key, property_type) in fields {
            ensure_valid_name(key)?;
            let type_ref = self.build_output_type(&format!("{name}{key}"), property_type, options)?;
            object = object.field(create_field_resolver(key, type_ref));
        }

        self.registry.finish_object(name, object);
        Ok(TypeRef::named(name))
    }

    fn build_input_shape(
        &mut self,
        name: &str,
        fields: &IndexMap<String, PropertyType>,
    ) -> Result<TypeRef, SchemaError> {
        if fields.is_empty() {
            return Err(SchemaError::EmptyShape(name.to_string()));
        }
        ensure_valid_name(name)?;

        let fingerprint = format!("input:shape:{fields:?}");
        if self.registry.reserve(name, fingerprint)? == Reservation::Existing {
            return Ok(TypeRef::named(name));
        }

        trace!(type_name = %name, fields = fields.len(), "Generating shape input type");
        let mut input = InputObject::new(name);
        for (key, property_type) in fields {
            ensure_valid_name(key)?;
            let type_ref = self.build_input_type(&format!("{name}{key}"), property_type)?;
            input = input.field(InputValue::new(key, type_ref));
        }

        self.registry.finish_input(name, input);
        Ok(TypeRef::named(name))
    }
}

/// Fails with `SchemaError::InvalidTypeName` unless `name` is a valid GraphQL name.
pub(crate) fn ensure_valid_name(name: &str) -> Result<(), SchemaError> {
    if is_valid_graphql_name(name) {
        Ok(())
    } else {
        Err(SchemaError::InvalidTypeName(name.to_string()))
    }
}

/// The implicit `_id` field every entity type starts with.
pub(crate) fn id_field() -> Field {
    create_field_resolver(ID_FIELD, TypeRef::named(TypeRef::ID))
}

/// Creates a field resolver that extracts a value from the parent object.
pub(crate) fn create_field_resolver(field_name: &str, type_ref: TypeRef) -> Field {
    let json_field_name = field_name.to_string();

    Field::new(field_name, type_ref, move |ctx| {
        let field_name = json_field_name.clone();
        FieldFuture::new(async move {
            if let Some(Value::Object(obj)) = ctx.parent_value.as_value()
                && let Some(value) = obj.get(&async_graphql::Name::new(&field_name))
            {
                return Ok(Some(value.clone()));
            }
            Ok(None)
        })
    })
}

/// Creates a field whose value is computed by a projection resolver.
pub(crate) fn create_projected_field(
    field_name: &str,
    type_ref: TypeRef,
    resolver: ProjectedResolver,
) -> Field {
    Field::new(field_name, type_ref, move |ctx| {
        let resolver = resolver.clone();
        FieldFuture::new(async move {
            let parent = ctx
                .parent_value
                .as_value()
                .map(graphql_value_to_json)
                .unwrap_or(serde_json::Value::Null);
            let value = resolver(parent).await?;
            Ok(Some(json_to_graphql_value(value)))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use refract_core::EntitySchema;

    fn catalog() -> EntityCatalog {
        EntityCatalog::from_schemas([EntitySchema::new("product")
            .unwrap()
            .property("name", PropertyType::string())])
        .unwrap()
    }

    #[test]
    fn test_scalar_mapping() {
        let catalog = catalog();
        let repositories = RepositoryRegistry::new();
        let projections = ProjectionSet::new();
        let mut compiler = TypeCompiler::new(&catalog, &repositories, &projections);
        let options = EntityTypeOptions::public();

        let cases = [
            (PropertyType::string(), "String"),
            (PropertyType::number(), "Float"),
            (PropertyType::boolean(), "Boolean"),
            (PropertyType::date(), "DateTime"),
            (PropertyType::array(PropertyType::date()), "[DateTime]"),
            (
                PropertyType::array(PropertyType::array(PropertyType::number())),
                "[[Float]]",
            ),
        ];
        for (property_type, expected) in cases {
            let output = compiler
                .build_output_type("x", &property_type, &options)
                .unwrap();
            assert_eq!(output.to_string(), expected);
            let input = compiler.build_input_type("x", &property_type).unwrap();
            assert_eq!(input.to_string(), expected);
        }
        assert_eq!(compiler.registry().object_count(), 0);
    }

    #[test]
    fn test_shape_is_memoized() {
        let catalog = catalog();
        let repositories = RepositoryRegistry::new();
        let projections = ProjectionSet::new();
        let mut compiler = TypeCompiler::new(&catalog, &repositories, &projections);
        let options = EntityTypeOptions::public();
        let shape = PropertyType::shape([
            ("width", PropertyType::number()),
            ("height", PropertyType::number()),
        ]);

        let first = compiler
            .build_output_type("productdimensions", &shape, &options)
            .unwrap();
        let second = compiler
            .build_output_type("productdimensions", &shape, &options)
            .unwrap();
        assert_eq!(first.to_string(), "productdimensions");
        assert_eq!(second.to_string(), "productdimensions");
        assert_eq!(compiler.registry().object_count(), 1);
    }

    #[test]
    fn test_shape_conflict_rejected() {
        let catalog = catalog();
        let repositories = RepositoryRegistry::new();
        let projections = ProjectionSet::new();
        let mut compiler = TypeCompiler::new(&catalog, &repositories, &projections);
        let options = EntityTypeOptions::public();

        compiler
            .build_output_type(
                "abc",
                &PropertyType::shape([("x", PropertyType::number())]),
                &options,
            )
            .unwrap();
        let err = compiler
            .build_output_type(
                "abc",
                &PropertyType::shape([("x", PropertyType::string())]),
                &options,
            )
            .unwrap_err();
        assert_eq!(err, SchemaError::ConflictingTypeDefinition("abc".into()));
    }

    #[test]
    fn test_empty_shape_rejected() {
        let catalog = catalog();
        let repositories = RepositoryRegistry::new();
        let projections = ProjectionSet::new();
        let mut compiler = TypeCompiler::new(&catalog, &repositories, &projections);

        let empty = PropertyType::Shape(IndexMap::new());
        let err = compiler
            .build_output_type("productmeta", &empty, &EntityTypeOptions::public())
            .unwrap_err();
        assert_eq!(err, SchemaError::EmptyShape("productmeta".into()));
        assert!(compiler.build_input_type("productInputmeta", &empty).is_err());
    }

    #[test]
    fn test_unknown_reference_rejected() {
        let catalog = catalog();
        let repositories = RepositoryRegistry::new();
        let projections = ProjectionSet::new();
        let mut compiler = TypeCompiler::new(&catalog, &repositories, &projections);

        let err = compiler
            .build_output_type(
                "productowner",
                &PropertyType::reference("person"),
                &EntityTypeOptions::public(),
            )
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownEntityReference { target, .. } if target == "person"));
    }

    #[test]
    fn test_invalid_shape_key_rejected() {
        let catalog = catalog();
        let repositories = RepositoryRegistry::new();
        let projections = ProjectionSet::new();
        let mut compiler = TypeCompiler::new(&catalog, &repositories, &projections);

        let err = compiler
            .build_input_type(
                "productInputmeta",
                &PropertyType::shape([("alt-text", PropertyType::string())]),
            )
            .unwrap_err();
        assert_eq!(err, SchemaError::InvalidTypeName("alt-text".into()));
    }
}
