//! GraphQL resolvers for generated entity fields.
//!
//! - `query`: count, find-by-id, list and singleton accessors
//! - `mutation`: policy-gated create, update and remove
//!
//! Records travel between repositories and resolvers as `serde_json::Value`
//! and are converted to `async_graphql::Value` at the field boundary.

mod mutation;
mod query;

pub use mutation::{CreateResolver, RemoveByIdResolver, UpdateResolver};
pub use query::{CountResolver, FindByIdResolver, ListResolver, SingletonResolver};

pub(crate) use mutation::mutation_fields;
pub(crate) use query::{QueryTypes, query_fields};

use async_graphql::dynamic::ResolverContext;
use async_graphql::{ErrorExtensions, Name, Value};
use refract_storage::RepositoryError;

use crate::context::RequestContext;
use crate::error::GraphQLError;

/// Request context attached to the current request, if any.
pub(crate) fn request_context<'a>(ctx: &'a ResolverContext<'_>) -> Option<&'a RequestContext> {
    ctx.data_opt::<RequestContext>()
}

/// Converts a repository error to a GraphQL error with `code` and `category`
/// extensions.
pub fn repository_error_to_graphql(error: RepositoryError) -> async_graphql::Error {
    GraphQLError::from(error).extend()
}

/// Convert a serde_json::Value to async_graphql::Value.
pub fn json_to_graphql_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else if let Some(f) = n.as_f64() {
                Value::Number(
                    async_graphql::Number::from_f64(f)
                        .unwrap_or_else(|| async_graphql::Number::from(0)),
                )
            } else {
                Value::Null
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => {
            Value::List(arr.into_iter().map(json_to_graphql_value).collect())
        }
        serde_json::Value::Object(obj) => {
            let map: async_graphql::indexmap::IndexMap<Name, Value> = obj
                .into_iter()
                .map(|(k, v)| (Name::new(k), json_to_graphql_value(v)))
                .collect();
            Value::Object(map)
        }
    }
}

/// Converts a GraphQL Value to serde_json::Value.
///
/// Enum values become their item names. Binary values have no JSON
/// representation and become `null`.
pub fn graphql_value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null | Value::Binary(_) => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                serde_json::Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                serde_json::Value::Number(u.into())
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(serde_json::Value::Null, serde_json::Value::Number)
            }
        }
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Enum(e) => serde_json::Value::String(e.to_string()),
        Value::List(items) => {
            serde_json::Value::Array(items.iter().map(graphql_value_to_json).collect())
        }
        Value::Object(obj) => serde_json::Value::Object(
            obj.iter()
                .map(|(k, v)| (k.to_string(), graphql_value_to_json(v)))
                .collect(),
        ),
    }
}
