use thiserror::Error;

/// Core error types for entity schema operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid entity alias: '{0}' (must match [_a-zA-Z][_a-zA-Z0-9]*)")]
    InvalidAlias(String),

    #[error("Duplicate entity alias: {0}")]
    DuplicateAlias(String),

    #[error("Unknown property type '{alias}' for {entity}.{property}")]
    UnknownPropertyType {
        entity: String,
        property: String,
        alias: String,
    },

    #[error("Malformed property {entity}.{property}: {message}")]
    MalformedProperty {
        entity: String,
        property: String,
        message: String,
    },

    #[error("Entity {entity} property {property} references unknown entity '{target}'")]
    UnknownReference {
        entity: String,
        property: String,
        target: String,
    },

    #[error("Invalid DateTime: {0}")]
    InvalidDateTime(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl CoreError {
    /// Create a new UnknownPropertyType error
    pub fn unknown_property_type(
        entity: impl Into<String>,
        property: impl Into<String>,
        alias: impl Into<String>,
    ) -> Self {
        Self::UnknownPropertyType {
            entity: entity.into(),
            property: property.into(),
            alias: alias.into(),
        }
    }

    /// Create a new MalformedProperty error
    pub fn malformed_property(
        entity: impl Into<String>,
        property: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::MalformedProperty {
            entity: entity.into(),
            property: property.into(),
            message: message.into(),
        }
    }

    /// Create a new InvalidDateTime error
    pub fn invalid_date_time(datetime: impl Into<String>) -> Self {
        Self::InvalidDateTime(datetime.into())
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidAlias(_) | Self::InvalidDateTime(_) => ErrorCategory::Validation,
            Self::DuplicateAlias(_) => ErrorCategory::Conflict,
            Self::UnknownPropertyType { .. }
            | Self::MalformedProperty { .. }
            | Self::UnknownReference { .. } => ErrorCategory::Schema,
            Self::JsonError(_) | Self::TomlError(_) => ErrorCategory::Serialization,
        }
    }
}

/// Error categories for monitoring and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Conflict,
    Schema,
    Serialization,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Conflict => write!(f, "conflict"),
            Self::Schema => write!(f, "schema"),
            Self::Serialization => write!(f, "serialization"),
        }
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_property_type_names_entity_and_property() {
        let err = CoreError::unknown_property_type("product", "tags", "Color");
        assert_eq!(
            err.to_string(),
            "Unknown property type 'Color' for product.tags"
        );
        assert_eq!(err.category(), ErrorCategory::Schema);
    }

    #[test]
    fn test_duplicate_alias_error() {
        let err = CoreError::DuplicateAlias("news".into());
        assert_eq!(err.to_string(), "Duplicate entity alias: news");
        assert_eq!(err.category(), ErrorCategory::Conflict);
    }

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::Schema.to_string(), "schema");
        assert_eq!(ErrorCategory::Serialization.to_string(), "serialization");
    }
}
