//! Entity catalog.
//!
//! The catalog is the ordered set of entity schemas an API is compiled from.
//! It enforces alias uniqueness and resolves entity references by alias.
//!
//! Catalogs are usually assembled in code, but can also be loaded from TOML
//! or JSON:
//!
//! ```toml
//! [[entities]]
//! alias = "product"
//! display_name = "Products"
//!
//! [entities.properties]
//! name = "String"
//! price = { type = "Number", display_name = "Price" }
//! dimensions = { type = "Shape", properties = { width = "Number", height = "Number" } }
//! related = { type = "Array", items = { type = "SchemaType", schema = "product" } }
//! ```

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::entity::EntitySchema;
use crate::error::{CoreError, Result};
use crate::property::{DescriptorError, PropertyOptions, PropertyType};

/// Ordered, alias-keyed set of entity schemas.
#[derive(Debug, Clone, Default)]
pub struct EntityCatalog {
    entities: IndexMap<String, EntitySchema>,
}

impl EntityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from schemas and validates entity references.
    ///
    /// # Errors
    ///
    /// Fails on duplicate aliases or references to unknown entities.
    pub fn from_schemas(schemas: impl IntoIterator<Item = EntitySchema>) -> Result<Self> {
        let mut catalog = Self::new();
        for schema in schemas {
            catalog.add(schema)?;
        }
        catalog.validate_references()?;
        Ok(catalog)
    }

    /// Adds a schema to the end of the catalog.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::DuplicateAlias` if the alias is already present.
    pub fn add(&mut self, schema: EntitySchema) -> Result<()> {
        if self.entities.contains_key(&schema.alias) {
            return Err(CoreError::DuplicateAlias(schema.alias));
        }
        self.entities.insert(schema.alias.clone(), schema);
        Ok(())
    }

    pub fn get(&self, alias: &str) -> Option<&EntitySchema> {
        self.entities.get(alias)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.entities.contains_key(alias)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntitySchema> {
        self.entities.values()
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Checks that every entity reference points at a catalog entity.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::UnknownReference` naming the first dangling reference.
    pub fn validate_references(&self) -> Result<()> {
        for schema in self.entities.values() {
            for (property, property_type) in schema.property_types() {
                for target in property_type.referenced_entities() {
                    if !self.entities.contains_key(target) {
                        return Err(CoreError::UnknownReference {
                            entity: schema.alias.clone(),
                            property: property.to_string(),
                            target: target.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Loads a catalog from a TOML document.
    ///
    /// # Errors
    ///
    /// Fails on TOML syntax errors and on any error from
    /// [`EntityCatalog::from_json_value`].
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let raw: RawCatalog = toml::from_str(source)?;
        Self::from_raw(raw)
    }

    /// Loads a catalog from a JSON value of the form `{"entities": [..]}`.
    ///
    /// # Errors
    ///
    /// Unknown property type tags fail with `CoreError::UnknownPropertyType`
    /// naming the entity and property.
    pub fn from_json_value(value: Value) -> Result<Self> {
        let raw: RawCatalog = serde_json::from_value(value)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawCatalog) -> Result<Self> {
        let mut schemas = Vec::with_capacity(raw.entities.len());
        for entity in raw.entities {
            let mut schema = EntitySchema::new(entity.alias)?.max_one(entity.max_one);
            schema.display_name = entity.display_name;
            schema.icon = entity.icon;

            for (property, descriptor) in &entity.properties {
                let options = parse_property_options(&schema.alias, property, descriptor)?;
                schema.properties.insert(property.clone(), options);
            }

            debug!(
                alias = %schema.alias,
                properties = schema.properties.len(),
                "Loaded entity schema"
            );
            schemas.push(schema);
        }
        Self::from_schemas(schemas)
    }
}

#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    entities: Vec<RawEntity>,
}

#[derive(Debug, Deserialize)]
struct RawEntity {
    alias: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    max_one: bool,
    #[serde(default)]
    properties: serde_json::Map<String, Value>,
}

fn parse_property_options(entity: &str, property: &str, descriptor: &Value) -> Result<PropertyOptions> {
    let property_type = PropertyType::from_descriptor(descriptor).map_err(|e| match e {
        DescriptorError::UnknownType(alias) => {
            CoreError::unknown_property_type(entity, property, alias)
        }
        DescriptorError::Malformed(message) => {
            CoreError::malformed_property(entity, property, message)
        }
    })?;

    let mut options = PropertyOptions::new(property_type);
    if let Value::Object(map) = descriptor {
        options.display_name = map
            .get("display_name")
            .and_then(Value::as_str)
            .map(String::from);
        options.editor = map.get("editor").and_then(Value::as_str).map(String::from);
        options.default_value = map.get("default").cloned();
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product() -> EntitySchema {
        EntitySchema::new("product")
            .unwrap()
            .property("name", PropertyType::string())
            .property("price", PropertyType::number())
    }

    #[test]
    fn test_duplicate_alias_rejected() {
        let result = EntityCatalog::from_schemas([product(), product()]);
        assert!(matches!(result, Err(CoreError::DuplicateAlias(a)) if a == "product"));
    }

    #[test]
    fn test_dangling_reference_rejected() {
        let news = EntitySchema::new("news")
            .unwrap()
            .property("author", PropertyType::reference("person"));
        let err = EntityCatalog::from_schemas([news]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Entity news property author references unknown entity 'person'"
        );
    }

    #[test]
    fn test_self_reference_is_valid() {
        let category = EntitySchema::new("category")
            .unwrap()
            .property("parent", PropertyType::reference("category"));
        let catalog = EntityCatalog::from_schemas([category]).unwrap();
        assert!(catalog.contains("category"));
    }

    #[test]
    fn test_catalog_keeps_order() {
        let settings = EntitySchema::new("settings").unwrap().max_one(true);
        let catalog = EntityCatalog::from_schemas([settings, product()]).unwrap();
        let aliases: Vec<_> = catalog.aliases().collect();
        assert_eq!(aliases, vec!["settings", "product"]);
    }

    #[test]
    fn test_from_json_value() {
        let catalog = EntityCatalog::from_json_value(json!({
            "entities": [{
                "alias": "news",
                "display_name": "News articles",
                "properties": {
                    "title": {"type": "String", "display_name": "Title", "editor": "textbox"},
                    "published": "Date",
                    "image": {"type": "Shape", "properties": {"url": "String"}}
                }
            }]
        }))
        .unwrap();

        let news = catalog.get("news").unwrap();
        assert_eq!(news.label(), "News articles");
        let title = &news.properties["title"];
        assert_eq!(title.property_type, PropertyType::String);
        assert_eq!(title.display_name.as_deref(), Some("Title"));
        assert_eq!(title.editor.as_deref(), Some("textbox"));
        assert_eq!(news.properties["published"].property_type, PropertyType::Date);
    }

    #[test]
    fn test_from_json_unknown_type_names_entity_and_property() {
        let err = EntityCatalog::from_json_value(json!({
            "entities": [{"alias": "product", "properties": {"color": "Rgb"}}]
        }))
        .unwrap_err();

        match err {
            CoreError::UnknownPropertyType {
                entity,
                property,
                alias,
            } => {
                assert_eq!(entity, "product");
                assert_eq!(property, "color");
                assert_eq!(alias, "Rgb");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_toml_str() {
        let toml = r#"
            [[entities]]
            alias = "settings"
            max_one = true

            [entities.properties]
            siteName = "String"

            [[entities]]
            alias = "product"

            [entities.properties]
            name = "String"
            price = { type = "Number", default = 0 }
            tags = { type = "Array", items = "String" }
        "#;

        let catalog = EntityCatalog::from_toml_str(toml).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.get("settings").unwrap().max_one);

        let product = catalog.get("product").unwrap();
        assert_eq!(
            product.properties["tags"].property_type,
            PropertyType::array(PropertyType::string())
        );
        assert_eq!(product.properties["price"].default_value, Some(json!(0)));
    }
}
