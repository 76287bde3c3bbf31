//! Query types for the repository abstraction.
//!
//! Filters are backend-neutral: the GraphQL layer derives them from request
//! arguments and each repository translates them to its own query language.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison applied to one record field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Eq(Value),
    Ne(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    In(Vec<Value>),
    Nin(Vec<Value>),
}

impl Condition {
    /// Operator name as used in filter arguments (`eq`, `gte`, ...).
    #[must_use]
    pub fn operator(&self) -> &'static str {
        match self {
            Self::Eq(_) => "eq",
            Self::Ne(_) => "ne",
            Self::Gt(_) => "gt",
            Self::Gte(_) => "gte",
            Self::Lt(_) => "lt",
            Self::Lte(_) => "lte",
            Self::In(_) => "in",
            Self::Nin(_) => "nin",
        }
    }
}

/// How a field's stored values compare.
///
/// Values are plain JSON, so a date is just a string. `Timestamp` fields
/// compare RFC 3339 strings by instant; `Plain` fields compare strings
/// byte-wise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    #[default]
    Plain,
    Timestamp,
}

/// A record filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Filter {
    /// Matches every record.
    #[default]
    All,
    /// Matches when every child matches.
    And(Vec<Filter>),
    /// Matches when any child matches.
    Or(Vec<Filter>),
    /// Matches when the named field satisfies the condition.
    Field {
        field: String,
        condition: Condition,
        #[serde(default)]
        kind: ValueKind,
    },
}

impl Filter {
    /// Creates a single-field filter.
    #[must_use]
    pub fn field(field: impl Into<String>, condition: Condition) -> Self {
        Self::typed_field(field, condition, ValueKind::Plain)
    }

    /// Creates a single-field filter on a field of the given kind.
    #[must_use]
    pub fn typed_field(field: impl Into<String>, condition: Condition, kind: ValueKind) -> Self {
        Self::Field {
            field: field.into(),
            condition,
            kind,
        }
    }

    /// Conjunction of filters, collapsing trivial cases.
    #[must_use]
    pub fn and(filters: Vec<Filter>) -> Self {
        let mut filters: Vec<Filter> = filters.into_iter().filter(|f| !f.is_all()).collect();
        match filters.len() {
            0 => Self::All,
            1 => filters.remove(0),
            _ => Self::And(filters),
        }
    }

    /// Returns true if this filter matches everything.
    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

/// Sort order for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A sort parameter for list results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortParam {
    /// The field to sort by.
    pub field: String,
    /// Sort direction.
    pub direction: SortDirection,
    /// How the field's values compare.
    #[serde(default)]
    pub kind: ValueKind,
}

impl SortParam {
    /// Creates a new `SortParam`.
    #[must_use]
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
            kind: ValueKind::Plain,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: ValueKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Ascending)
    }

    #[must_use]
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Descending)
    }
}

/// Parameters for a list query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindQuery {
    /// Record filter.
    #[serde(default)]
    pub filter: Filter,
    /// Sort keys in precedence order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortParam>,
    /// Number of matching records to skip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    /// Maximum number of records to return.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

impl FindQuery {
    /// Creates new empty `FindQuery`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: SortParam) -> Self {
        self.sort.push(sort);
        self
    }

    #[must_use]
    pub fn with_skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_and_collapses() {
        assert_eq!(Filter::and(vec![]), Filter::All);
        assert_eq!(Filter::and(vec![Filter::All, Filter::All]), Filter::All);

        let single = Filter::field("name", Condition::Eq(json!("Chair")));
        assert_eq!(Filter::and(vec![Filter::All, single.clone()]), single);

        let both = Filter::and(vec![
            single.clone(),
            Filter::field("price", Condition::Lt(json!(100))),
        ]);
        assert!(matches!(both, Filter::And(children) if children.len() == 2));
    }

    #[test]
    fn test_find_query_builder() {
        let query = FindQuery::new()
            .with_filter(Filter::field("price", Condition::Gte(json!(10))))
            .with_sort(SortParam::desc("price"))
            .with_sort(SortParam::asc("name"))
            .with_skip(5)
            .with_limit(10);

        assert_eq!(query.sort.len(), 2);
        assert_eq!(query.sort[0].direction, SortDirection::Descending);
        assert_eq!(query.skip, Some(5));
        assert_eq!(query.limit, Some(10));
    }

    #[test]
    fn test_value_kind_defaults_to_plain() {
        let filter = Filter::field("name", Condition::Eq(json!("Chair")));
        assert!(matches!(filter, Filter::Field { kind: ValueKind::Plain, .. }));
        assert_eq!(SortParam::asc("name").kind, ValueKind::Plain);
        assert_eq!(
            SortParam::asc("published").with_kind(ValueKind::Timestamp).kind,
            ValueKind::Timestamp
        );

        // Serialized queries without a kind still deserialize.
        let sort: SortParam =
            serde_json::from_value(json!({"field": "name", "direction": "ascending"})).unwrap();
        assert_eq!(sort, SortParam::asc("name"));
    }

    #[test]
    fn test_condition_operator_names() {
        assert_eq!(Condition::Eq(json!(1)).operator(), "eq");
        assert_eq!(Condition::Nin(vec![]).operator(), "nin");
    }
}
