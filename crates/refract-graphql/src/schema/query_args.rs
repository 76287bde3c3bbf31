//! Filter, sort and pagination arguments for list queries.
//!
//! Every entity gets a `{alias}EntityFilter` input with one operator input per
//! scalar field of its persisted shape, plus `AND`/`OR` lists of itself, and
//! a `{alias}EntitySort` input mapping scalar fields to a [`SortDirection`].
//! The key order of a sort argument is its precedence.
//!
//! ```graphql
//! productList(
//!   filter: { price: { lt: 100 }, OR: [{ name: { eq: "Chair" } }] }
//!   sort: { price: DESC, name: ASC }
//!   skip: 10
//!   limit: 10
//! )
//! ```

use std::collections::HashSet;

use async_graphql::Value;
use async_graphql::dynamic::{Enum, EnumItem, InputObject, InputValue, ObjectAccessor, TypeRef};
use refract_core::{EntitySchema, ID_FIELD, ScalarKind};
use refract_storage::{Condition, Filter, FindQuery, SortDirection, SortParam, ValueKind};
use tracing::trace;

use super::entity_type::EntityTypeOptions;
use super::registry::Reservation;
use super::type_builder::{DATE_TIME_SCALAR, TypeCompiler};
use crate::error::{GraphQLError, SchemaError};
use crate::resolvers::graphql_value_to_json;

/// Name of the sort direction enum.
pub const SORT_DIRECTION_ENUM: &str = "SortDirection";

const ID_FILTER: &str = "IDFilter";
const AND: &str = "AND";
const OR: &str = "OR";

/// Operator input type name for a scalar kind.
pub fn operator_input_name(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::String => "StringFilter",
        ScalarKind::Number => "FloatFilter",
        ScalarKind::Boolean => "BooleanFilter",
        ScalarKind::Date => "DateTimeFilter",
    }
}

/// Creates the shared operator input types.
pub fn operator_inputs() -> Vec<InputObject> {
    let ordered = |name: &str, scalar: &str| {
        InputObject::new(name)
            .field(InputValue::new("eq", TypeRef::named(scalar)))
            .field(InputValue::new("ne", TypeRef::named(scalar)))
            .field(InputValue::new("gt", TypeRef::named(scalar)))
            .field(InputValue::new("gte", TypeRef::named(scalar)))
            .field(InputValue::new("lt", TypeRef::named(scalar)))
            .field(InputValue::new("lte", TypeRef::named(scalar)))
            .field(InputValue::new("in", TypeRef::named_list(scalar)))
            .field(InputValue::new("nin", TypeRef::named_list(scalar)))
    };

    vec![
        ordered(operator_input_name(ScalarKind::String), TypeRef::STRING),
        ordered(operator_input_name(ScalarKind::Number), TypeRef::FLOAT),
        ordered(operator_input_name(ScalarKind::Date), DATE_TIME_SCALAR),
        InputObject::new(operator_input_name(ScalarKind::Boolean))
            .field(InputValue::new("eq", TypeRef::named(TypeRef::BOOLEAN)))
            .field(InputValue::new("ne", TypeRef::named(TypeRef::BOOLEAN))),
        InputObject::new(ID_FILTER)
            .field(InputValue::new("eq", TypeRef::named(TypeRef::ID)))
            .field(InputValue::new("ne", TypeRef::named(TypeRef::ID)))
            .field(InputValue::new("in", TypeRef::named_list(TypeRef::ID)))
            .field(InputValue::new("nin", TypeRef::named_list(TypeRef::ID))),
    ]
}

/// Creates the `SortDirection` enum.
pub fn sort_direction_enum() -> Enum {
    Enum::new(SORT_DIRECTION_ENUM)
        .item(EnumItem::new("ASC").description("Ascending order"))
        .item(EnumItem::new("DESC").description("Descending order"))
}

impl TypeCompiler<'_> {
    /// Compiles `{alias}EntityFilter` and returns its name.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ConflictingTypeDefinition` if the name is taken.
    pub fn compile_filter_input(&mut self, schema: &EntitySchema) -> Result<String, SchemaError> {
        let type_name = format!("{}Filter", EntityTypeOptions::entity().type_name(&schema.alias));
        let fields = filterable_fields(schema);
        let fingerprint = format!("input:filter:{fields:?}");
        if self.registry.reserve(&type_name, fingerprint)? == Reservation::Existing {
            return Ok(type_name);
        }

        trace!(type_name = %type_name, fields = fields.len(), "Generating filter input type");
        let mut input = InputObject::new(&type_name)
            .description(format!("Filter for {} records", schema.label()));
        for (field, operator_input) in fields {
            input = input.field(InputValue::new(field, TypeRef::named(operator_input)));
        }
        input = input
            .field(InputValue::new(AND, TypeRef::named_nn_list(&type_name)))
            .field(InputValue::new(OR, TypeRef::named_nn_list(&type_name)));

        self.registry.finish_input(&type_name, input);
        Ok(type_name)
    }

    /// Compiles `{alias}EntitySort` and returns its name.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ConflictingTypeDefinition` if the name is taken.
    pub fn compile_sort_input(&mut self, schema: &EntitySchema) -> Result<String, SchemaError> {
        let type_name = format!("{}Sort", EntityTypeOptions::entity().type_name(&schema.alias));
        let fields = sortable_fields(schema);
        let fingerprint = format!("input:sort:{fields:?}");
        if self.registry.reserve(&type_name, fingerprint)? == Reservation::Existing {
            return Ok(type_name);
        }

        let mut input = InputObject::new(&type_name)
            .description("Sort order; earlier keys take precedence");
        for field in fields {
            input = input.field(InputValue::new(field, TypeRef::named(SORT_DIRECTION_ENUM)));
        }

        self.registry.finish_input(&type_name, input);
        Ok(type_name)
    }
}

/// Top-level fields of an entity whose values are `Date` timestamps.
///
/// Used to tag parsed filter conditions and sort keys so that the repository
/// compares those fields by instant and every other string byte-wise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldKinds {
    timestamps: HashSet<String>,
}

impl FieldKinds {
    /// Collects the date-valued properties of `schema`, including arrays of dates.
    #[must_use]
    pub fn of(schema: &EntitySchema) -> Self {
        let timestamps = schema
            .property_types()
            .filter(|(_, property_type)| property_type.scalar_leaf() == Some(ScalarKind::Date))
            .map(|(name, _)| name.to_string())
            .collect();
        Self { timestamps }
    }

    /// The comparison kind for `field`.
    #[must_use]
    pub fn kind(&self, field: &str) -> ValueKind {
        if self.timestamps.contains(field) {
            ValueKind::Timestamp
        } else {
            ValueKind::Plain
        }
    }
}

/// `_id` plus every property bottoming out in a scalar, with its operator input.
fn filterable_fields(schema: &EntitySchema) -> Vec<(&str, &'static str)> {
    std::iter::once((ID_FIELD, ID_FILTER))
        .chain(
            schema
                .property_types()
                .filter(|(name, _)| *name != ID_FIELD)
                .filter_map(|(name, property_type)| {
                    property_type
                        .scalar_leaf()
                        .map(|kind| (name, operator_input_name(kind)))
                }),
        )
        .collect()
}

/// `_id` plus every scalar property.
fn sortable_fields(schema: &EntitySchema) -> Vec<&str> {
    std::iter::once(ID_FIELD)
        .chain(
            schema
                .property_types()
                .filter(|(name, property_type)| *name != ID_FIELD && property_type.is_scalar())
                .map(|(name, _)| name),
        )
        .collect()
}

/// Parses a filter argument.
///
/// Conditions on different fields are combined with AND. `null` operators
/// are ignored, except `eq`/`ne`, where `null` matches missing values.
///
/// # Errors
///
/// Returns `GraphQLError::InvalidArgument` for values that are not filter objects.
pub fn parse_filter(value: &Value, kinds: &FieldKinds) -> Result<Filter, GraphQLError> {
    let fields = match value {
        Value::Null => return Ok(Filter::All),
        Value::Object(fields) => fields,
        other => {
            return Err(GraphQLError::invalid_argument(format!(
                "filter must be an object, got {other}"
            )));
        }
    };

    let mut parts = Vec::with_capacity(fields.len());
    for (name, operand) in fields {
        match name.as_str() {
            AND => parts.push(Filter::and(parse_filter_list(operand, kinds)?)),
            OR => {
                let children = parse_filter_list(operand, kinds)?;
                if !children.is_empty() {
                    parts.push(Filter::Or(children));
                }
            }
            field => parts.extend(parse_field_conditions(field, operand, kinds.kind(field))?),
        }
    }
    Ok(Filter::and(parts))
}

fn parse_filter_list(value: &Value, kinds: &FieldKinds) -> Result<Vec<Filter>, GraphQLError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::List(items) => items.iter().map(|item| parse_filter(item, kinds)).collect(),
        // A single object is coerced to a one-element list.
        Value::Object(_) => Ok(vec![parse_filter(value, kinds)?]),
        other => Err(GraphQLError::invalid_argument(format!(
            "expected a list of filters, got {other}"
        ))),
    }
}

fn parse_field_conditions(
    field: &str,
    operators: &Value,
    kind: ValueKind,
) -> Result<Vec<Filter>, GraphQLError> {
    let operators = match operators {
        Value::Null => return Ok(Vec::new()),
        Value::Object(operators) => operators,
        other => {
            return Err(GraphQLError::invalid_argument(format!(
                "filter on {field} must be an object, got {other}"
            )));
        }
    };

    let mut filters = Vec::with_capacity(operators.len());
    for (operator, operand) in operators {
        if let Some(condition) = parse_condition(operator.as_str(), operand)? {
            filters.push(Filter::typed_field(field, condition, kind));
        }
    }
    Ok(filters)
}

fn parse_condition(operator: &str, operand: &Value) -> Result<Option<Condition>, GraphQLError> {
    let json = graphql_value_to_json(operand);
    let condition = match operator {
        "eq" => Condition::Eq(json),
        "ne" => Condition::Ne(json),
        _ if json.is_null() => return Ok(None),
        "gt" => Condition::Gt(json),
        "gte" => Condition::Gte(json),
        "lt" => Condition::Lt(json),
        "lte" => Condition::Lte(json),
        "in" | "nin" => {
            let values = match json {
                serde_json::Value::Array(values) => values,
                single => vec![single],
            };
            if operator == "in" {
                Condition::In(values)
            } else {
                Condition::Nin(values)
            }
        }
        unknown => {
            return Err(GraphQLError::invalid_argument(format!(
                "unknown filter operator '{unknown}'"
            )));
        }
    };
    Ok(Some(condition))
}

/// Parses a sort argument, keeping key order as precedence.
///
/// # Errors
///
/// Returns `GraphQLError::InvalidArgument` for unknown directions.
pub fn parse_sort(value: &Value, kinds: &FieldKinds) -> Result<Vec<SortParam>, GraphQLError> {
    let fields = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Object(fields) => fields,
        other => {
            return Err(GraphQLError::invalid_argument(format!(
                "sort must be an object, got {other}"
            )));
        }
    };

    let mut sort = Vec::with_capacity(fields.len());
    for (field, direction) in fields {
        let direction = match direction {
            Value::Null => continue,
            Value::Enum(name) => name.as_str(),
            Value::String(name) => name.as_str(),
            other => {
                return Err(GraphQLError::invalid_argument(format!(
                    "sort direction for {field} must be ASC or DESC, got {other}"
                )));
            }
        };
        let direction = match direction {
            "ASC" => SortDirection::Ascending,
            "DESC" => SortDirection::Descending,
            other => {
                return Err(GraphQLError::invalid_argument(format!(
                    "sort direction for {field} must be ASC or DESC, got {other}"
                )));
            }
        };
        sort.push(SortParam::new(field.as_str(), direction).with_kind(kinds.kind(field)));
    }
    Ok(sort)
}

/// Builds a repository query from list field arguments.
///
/// `limit` is clamped to `max_list_limit` when one is configured.
///
/// # Errors
///
/// Returns `GraphQLError::InvalidArgument` for malformed filters or sorts and
/// for negative `skip` or `limit` values.
pub fn parse_find_query(
    args: &ObjectAccessor<'_>,
    kinds: &FieldKinds,
    max_list_limit: Option<u64>,
) -> Result<FindQuery, GraphQLError> {
    let filter = parse_filter_arg(args, kinds)?;
    let sort = match args.get("sort") {
        Some(value) => parse_sort(value.as_value(), kinds)?,
        None => Vec::new(),
    };

    let limit = match (non_negative(args, "limit")?, max_list_limit) {
        (Some(limit), Some(max)) => Some(limit.min(max)),
        (None, Some(max)) => Some(max),
        (limit, None) => limit,
    };

    Ok(FindQuery {
        filter,
        sort,
        skip: non_negative(args, "skip")?,
        limit,
    })
}

/// Parses only the `filter` argument.
///
/// # Errors
///
/// Returns `GraphQLError::InvalidArgument` for malformed filters.
pub fn parse_filter_arg(args: &ObjectAccessor<'_>, kinds: &FieldKinds) -> Result<Filter, GraphQLError> {
    match args.get("filter") {
        Some(value) => parse_filter(value.as_value(), kinds),
        None => Ok(Filter::All),
    }
}

fn non_negative(args: &ObjectAccessor<'_>, name: &str) -> Result<Option<u64>, GraphQLError> {
    let Some(value) = args.get(name) else {
        return Ok(None);
    };
    if value.is_null() {
        return Ok(None);
    }
    let number = value
        .i64()
        .map_err(|_| GraphQLError::invalid_argument(format!("{name} must be an integer")))?;
    u64::try_from(number)
        .map(Some)
        .map_err(|_| GraphQLError::invalid_argument(format!("{name} must be non-negative, got {number}")))
}
