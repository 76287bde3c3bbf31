//! Host-facing configuration.
//!
//! Read from the `[graphql]` table of the host application's TOML file.
//! Every key is optional:
//!
//! ```toml
//! [graphql]
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! max_list_limit = 100
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::SchemaBuilderConfig;

/// Limits and switches applied to the compiled schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphQLConfig {
    /// Maximum selection nesting depth.
    pub max_depth: usize,

    /// Maximum query complexity score.
    pub max_complexity: usize,

    /// Whether `__schema` and `__type` queries are answered.
    pub introspection: bool,

    /// Upper bound for `limit` on list fields. Also applied when a list
    /// query omits `limit`. Unbounded when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_list_limit: Option<u64>,
}

impl Default for GraphQLConfig {
    fn default() -> Self {
        let limits = SchemaBuilderConfig::default();
        Self {
            max_depth: limits.max_depth,
            max_complexity: limits.max_complexity,
            introspection: limits.introspection_enabled,
            max_list_limit: limits.max_list_limit,
        }
    }
}

/// A configuration value outside its allowed range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("graphql.{0} must be greater than zero")]
    ZeroLimit(&'static str),
}

impl GraphQLConfig {
    /// Checks that every limit is usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ZeroLimit` naming the first limit set to zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroLimit("max_depth"));
        }
        if self.max_complexity == 0 {
            return Err(ConfigError::ZeroLimit("max_complexity"));
        }
        if self.max_list_limit == Some(0) {
            return Err(ConfigError::ZeroLimit("max_list_limit"));
        }
        Ok(())
    }

    #[must_use]
    pub fn to_schema_builder_config(&self) -> SchemaBuilderConfig {
        SchemaBuilderConfig {
            max_depth: self.max_depth,
            max_complexity: self.max_complexity,
            introspection_enabled: self.introspection,
            max_list_limit: self.max_list_limit,
        }
    }
}
