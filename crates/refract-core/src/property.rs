//! Property type algebra.
//!
//! A [`PropertyType`] describes the shape of one entity property. The set of
//! variants is closed: three scalar kinds plus `Date`, the inline composite
//! `Shape`, `Array` and a named reference to another entity schema.
//!
//! The descriptor vocabulary used by declarative catalogs (`"String"`,
//! `{ type = "Shape", properties = { .. } }`, `{ type = "SchemaType", schema = ".." }`)
//! is parsed here as well, see [`PropertyType::from_descriptor`].

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

/// Scalar kinds a property can bottom out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    String,
    Number,
    Boolean,
    Date,
}

impl ScalarKind {
    /// Descriptor tag for this scalar kind.
    #[must_use]
    pub fn alias(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Number => "Number",
            Self::Boolean => "Boolean",
            Self::Date => "Date",
        }
    }
}

/// Type descriptor for one property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyType {
    String,
    Number,
    Boolean,
    /// Timestamp, kept as an RFC 3339 string end to end.
    Date,
    /// Inline composite with its own ordered property map.
    Shape(IndexMap<String, PropertyType>),
    /// List of a single element type.
    Array(Box<PropertyType>),
    /// Named lookup of another entity schema by alias.
    EntityReference(String),
}

impl PropertyType {
    pub fn string() -> Self {
        Self::String
    }

    pub fn number() -> Self {
        Self::Number
    }

    pub fn boolean() -> Self {
        Self::Boolean
    }

    pub fn date() -> Self {
        Self::Date
    }

    /// Builds a shape from `(key, type)` pairs, keeping their order.
    pub fn shape<K: Into<String>>(fields: impl IntoIterator<Item = (K, PropertyType)>) -> Self {
        Self::Shape(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn array(element: PropertyType) -> Self {
        Self::Array(Box::new(element))
    }

    pub fn reference(alias: impl Into<String>) -> Self {
        Self::EntityReference(alias.into())
    }

    /// Descriptor tag of this variant.
    #[must_use]
    pub fn alias(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Number => "Number",
            Self::Boolean => "Boolean",
            Self::Date => "Date",
            Self::Shape(_) => "Shape",
            Self::Array(_) => "Array",
            Self::EntityReference(_) => "SchemaType",
        }
    }

    /// Returns the scalar kind if this is a scalar.
    #[must_use]
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Self::String => Some(ScalarKind::String),
            Self::Number => Some(ScalarKind::Number),
            Self::Boolean => Some(ScalarKind::Boolean),
            Self::Date => Some(ScalarKind::Date),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_scalar(&self) -> bool {
        self.scalar_kind().is_some()
    }

    /// Scalar kind at the bottom of an `Array` chain, or of the type itself.
    ///
    /// Returns `None` when the chain ends in a shape or an entity reference.
    #[must_use]
    pub fn scalar_leaf(&self) -> Option<ScalarKind> {
        match self {
            Self::Array(inner) => inner.scalar_leaf(),
            other => other.scalar_kind(),
        }
    }

    /// Aliases of every entity referenced anywhere inside this type.
    pub fn referenced_entities(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::EntityReference(alias) => out.push(alias),
            Self::Array(inner) => inner.collect_references(out),
            Self::Shape(fields) => {
                for field in fields.values() {
                    field.collect_references(out);
                }
            }
            _ => {}
        }
    }

    /// Parses a property type descriptor.
    ///
    /// Accepts either a bare tag string (`"Number"`) or an object with a `type`
    /// tag and the variant payload (`properties`, `items` or `schema`).
    pub fn from_descriptor(descriptor: &Value) -> Result<Self, DescriptorError> {
        match descriptor {
            Value::String(tag) => Self::from_tag(tag, None),
            Value::Object(map) => {
                let tag = map
                    .get("type")
                    .and_then(Value::as_str)
                    .ok_or_else(|| DescriptorError::Malformed("missing 'type' tag".into()))?;
                Self::from_tag(tag, Some(descriptor))
            }
            other => Err(DescriptorError::Malformed(format!(
                "expected a type tag or table, got {other}"
            ))),
        }
    }

    fn from_tag(tag: &str, body: Option<&Value>) -> Result<Self, DescriptorError> {
        match tag {
            "String" => Ok(Self::String),
            "Number" => Ok(Self::Number),
            "Boolean" => Ok(Self::Boolean),
            "Date" => Ok(Self::Date),
            "Shape" => {
                let properties = body
                    .and_then(|b| b.get("properties"))
                    .and_then(Value::as_object)
                    .ok_or_else(|| {
                        DescriptorError::Malformed("Shape requires a 'properties' table".into())
                    })?;
                let mut fields = IndexMap::with_capacity(properties.len());
                for (key, nested) in properties {
                    let nested = Self::from_descriptor(nested)
                        .map_err(|e| e.nested(key))?;
                    fields.insert(key.clone(), nested);
                }
                Ok(Self::Shape(fields))
            }
            "Array" => {
                let items = body.and_then(|b| b.get("items")).ok_or_else(|| {
                    DescriptorError::Malformed("Array requires an 'items' descriptor".into())
                })?;
                Ok(Self::array(Self::from_descriptor(items)?))
            }
            "SchemaType" => {
                let schema = body
                    .and_then(|b| b.get("schema"))
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        DescriptorError::Malformed("SchemaType requires a 'schema' alias".into())
                    })?;
                Ok(Self::reference(schema))
            }
            unknown => Err(DescriptorError::UnknownType(unknown.to_string())),
        }
    }
}

/// Failure to parse a property descriptor, before entity context is attached.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("Unknown property type: {0}")]
    UnknownType(String),

    #[error("Malformed property descriptor: {0}")]
    Malformed(String),
}

impl DescriptorError {
    fn nested(self, key: &str) -> Self {
        match self {
            Self::UnknownType(tag) => Self::UnknownType(tag),
            Self::Malformed(message) => Self::Malformed(format!("{key}: {message}")),
        }
    }
}

/// Per-property options: the type plus editor/display metadata.
///
/// The metadata is carried for the administrative surface and is never
/// interpreted by the API compiler.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyOptions {
    pub property_type: PropertyType,
    pub display_name: Option<String>,
    pub editor: Option<String>,
    pub default_value: Option<Value>,
}

impl PropertyOptions {
    #[must_use]
    pub fn new(property_type: PropertyType) -> Self {
        Self {
            property_type,
            display_name: None,
            editor: None,
            default_value: None,
        }
    }

    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    #[must_use]
    pub fn with_editor(mut self, editor: impl Into<String>) -> Self {
        self.editor = Some(editor.into());
        self
    }

    #[must_use]
    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }
}

impl From<PropertyType> for PropertyOptions {
    fn from(property_type: PropertyType) -> Self {
        Self::new(property_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_leaf_through_arrays() {
        let t = PropertyType::array(PropertyType::array(PropertyType::date()));
        assert_eq!(t.scalar_leaf(), Some(ScalarKind::Date));
        assert!(!t.is_scalar());

        let shapes = PropertyType::array(PropertyType::shape([("x", PropertyType::number())]));
        assert_eq!(shapes.scalar_leaf(), None);
    }

    #[test]
    fn test_shape_keeps_declaration_order() {
        let t = PropertyType::shape([
            ("zeta", PropertyType::string()),
            ("alpha", PropertyType::number()),
        ]);
        let PropertyType::Shape(fields) = t else {
            panic!("expected shape");
        };
        let keys: Vec<_> = fields.keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_referenced_entities_nested() {
        let t = PropertyType::shape([
            ("author", PropertyType::reference("person")),
            ("tags", PropertyType::array(PropertyType::reference("tag"))),
        ]);
        assert_eq!(t.referenced_entities(), vec!["person", "tag"]);
    }

    #[test]
    fn test_descriptor_shorthand() {
        assert_eq!(
            PropertyType::from_descriptor(&json!("Number")).unwrap(),
            PropertyType::Number
        );
        assert_eq!(
            PropertyType::from_descriptor(&json!({"type": "Date"})).unwrap(),
            PropertyType::Date
        );
    }

    #[test]
    fn test_descriptor_composites() {
        let descriptor = json!({
            "type": "Shape",
            "properties": {
                "url": "String",
                "crops": {"type": "Array", "items": "String"},
                "owner": {"type": "SchemaType", "schema": "person"}
            }
        });
        let parsed = PropertyType::from_descriptor(&descriptor).unwrap();
        assert_eq!(
            parsed,
            PropertyType::shape([
                ("url", PropertyType::string()),
                ("crops", PropertyType::array(PropertyType::string())),
                ("owner", PropertyType::reference("person")),
            ])
        );
    }

    #[test]
    fn test_descriptor_unknown_tag() {
        let err = PropertyType::from_descriptor(&json!("Color")).unwrap_err();
        assert_eq!(err, DescriptorError::UnknownType("Color".into()));
        assert_eq!(err.to_string(), "Unknown property type: Color");

        let nested = json!({"type": "Array", "items": "Money"});
        let err = PropertyType::from_descriptor(&nested).unwrap_err();
        assert_eq!(err, DescriptorError::UnknownType("Money".into()));
    }

    #[test]
    fn test_descriptor_malformed() {
        let err = PropertyType::from_descriptor(&json!({"type": "Shape"})).unwrap_err();
        assert!(matches!(err, DescriptorError::Malformed(_)));
        assert_eq!(
            err.to_string(),
            "Malformed property descriptor: Shape requires a 'properties' table"
        );

        let err = PropertyType::from_descriptor(&json!(42)).unwrap_err();
        assert!(matches!(err, DescriptorError::Malformed(_)));
    }
}
