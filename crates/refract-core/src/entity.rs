//! Entity schema definitions.

use indexmap::IndexMap;

use crate::error::{CoreError, Result};
use crate::property::{PropertyOptions, PropertyType};

/// Declarative description of one entity's persisted shape.
///
/// The alias is the stable key for the entity: it names the repository
/// collection, prefixes every generated API field, and is the lookup key for
/// entity references and public projections.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySchema {
    pub alias: String,
    pub display_name: Option<String>,
    pub icon: Option<String>,
    /// At most one record exists for this entity.
    pub max_one: bool,
    pub properties: IndexMap<String, PropertyOptions>,
}

impl EntitySchema {
    /// Creates an empty schema.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidAlias` if the alias cannot be used as a
    /// GraphQL name prefix.
    pub fn new(alias: impl Into<String>) -> Result<Self> {
        let alias = alias.into();
        if !is_valid_graphql_name(&alias) {
            return Err(CoreError::InvalidAlias(alias));
        }
        Ok(Self {
            alias,
            display_name: None,
            icon: None,
            max_one: false,
            properties: IndexMap::new(),
        })
    }

    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub fn max_one(mut self, max_one: bool) -> Self {
        self.max_one = max_one;
        self
    }

    /// Appends a property. Re-adding a name replaces it in place.
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, options: impl Into<PropertyOptions>) -> Self {
        self.properties.insert(name.into(), options.into());
        self
    }

    /// Display name, falling back to the alias.
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.alias)
    }

    /// Property types only, in declaration order.
    pub fn property_types(&self) -> impl Iterator<Item = (&str, &PropertyType)> {
        self.properties
            .iter()
            .map(|(name, options)| (name.as_str(), &options.property_type))
    }
}

/// Checks if a name is valid for GraphQL.
///
/// GraphQL names must match the pattern `[_a-zA-Z][_a-zA-Z0-9]*`.
#[must_use]
pub fn is_valid_graphql_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
