//! Error types for schema compilation and resolution.
//!
//! [`SchemaError`] covers everything that can go wrong while compiling a
//! catalog into a schema. [`GraphQLError`] is the crate-level error; it is
//! converted into `async_graphql::Error` with a `code` extension when it
//! surfaces from a resolver.

use async_graphql::ErrorExtensions;
use refract_storage::{ErrorCategory, RepositoryError};
use thiserror::Error;

/// Errors raised while compiling entity schemas into GraphQL types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Type {type_name} references unknown entity '{target}'")]
    UnknownEntityReference { type_name: String, target: String },

    #[error("Type name {0} is already registered with a different definition")]
    ConflictingTypeDefinition(String),

    #[error("Shape {0} has no properties")]
    EmptyShape(String),

    #[error("No repository bound for entity '{0}'")]
    MissingRepository(String),

    #[error("Invalid GraphQL name: '{0}'")]
    InvalidTypeName(String),

    #[error("Entity catalog is empty")]
    EmptyCatalog,

    #[error("Schema validation failed: {0}")]
    Finish(String),
}

/// Errors that can occur during GraphQL operations.
#[derive(Debug, Error)]
pub enum GraphQLError {
    #[error("Failed to build GraphQL schema: {0}")]
    SchemaBuildFailed(#[from] SchemaError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl GraphQLError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Returns the error code for GraphQL error extensions.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SchemaBuildFailed(_) => "SCHEMA_BUILD_FAILED",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::Repository(err) => match err.category() {
                ErrorCategory::Conflict => "CONFLICT",
                ErrorCategory::Validation => "VALIDATION_ERROR",
                ErrorCategory::Infrastructure => "STORAGE_ERROR",
                ErrorCategory::Internal => "INTERNAL_ERROR",
            },
        }
    }
}

impl ErrorExtensions for GraphQLError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| {
            e.set("code", self.error_code());
            if let Self::Repository(err) = self {
                e.set("category", err.category().to_string());
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            GraphQLError::from(SchemaError::EmptyShape("productdimensions".into())).error_code(),
            "SCHEMA_BUILD_FAILED"
        );
        assert_eq!(
            GraphQLError::invalid_argument("limit must be non-negative").error_code(),
            "INVALID_ARGUMENT"
        );
        assert_eq!(
            GraphQLError::from(RepositoryError::already_exists("product", "1")).error_code(),
            "CONFLICT"
        );
    }

    #[test]
    fn test_schema_error_display() {
        let err = SchemaError::UnknownEntityReference {
            type_name: "newsauthor".into(),
            target: "person".into(),
        };
        assert_eq!(
            err.to_string(),
            "Type newsauthor references unknown entity 'person'"
        );

        let wrapped = GraphQLError::from(SchemaError::MissingRepository("news".into()));
        assert_eq!(
            wrapped.to_string(),
            "Failed to build GraphQL schema: No repository bound for entity 'news'"
        );
    }

    #[test]
    fn test_extensions_carry_code_and_category() {
        let err = GraphQLError::from(RepositoryError::connection_error("refused")).extend();
        let extensions = err.extensions.expect("extensions should be set");
        assert_eq!(
            extensions.get("code"),
            Some(&async_graphql::Value::from("STORAGE_ERROR"))
        );
        assert_eq!(
            extensions.get("category"),
            Some(&async_graphql::Value::from("infrastructure"))
        );
    }
}
