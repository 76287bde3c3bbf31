//! Filter evaluation and sorting over JSON records.
//!
//! Follows document-store semantics: a condition on an array field matches
//! when any element matches, negative conditions (`ne`, `nin`) match when no
//! element does, and a missing field compares equal to `null`.

use std::cmp::Ordering;

use refract_core::compare_datetimes;
use refract_storage::{Condition, Filter, SortDirection, SortParam, ValueKind};
use serde_json::Value;

/// Checks if a record matches the filter.
pub fn matches(filter: &Filter, record: &Value) -> bool {
    match filter {
        Filter::All => true,
        Filter::And(children) => children.iter().all(|f| matches(f, record)),
        Filter::Or(children) => children.iter().any(|f| matches(f, record)),
        Filter::Field {
            field,
            condition,
            kind,
        } => matches_condition(lookup(record, field).unwrap_or(&Value::Null), condition, *kind),
    }
}

/// Resolves a dotted path inside a record.
pub fn lookup<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(record, |current, segment| current.get(segment))
}

fn matches_condition(value: &Value, condition: &Condition, kind: ValueKind) -> bool {
    let equal = |v: &Value, expected: &Value| values_equal(v, expected, kind);
    let ordered = |v: &Value, bound: &Value, accept: &[Ordering]| {
        compare_values(v, bound, kind).is_some_and(|ordering| accept.contains(&ordering))
    };

    match condition {
        Condition::Ne(expected) => !any_element(value, |v| equal(v, expected)),
        Condition::Nin(excluded) => !any_element(value, |v| excluded.iter().any(|e| equal(v, e))),
        Condition::Eq(expected) => any_element(value, |v| equal(v, expected)),
        Condition::In(allowed) => any_element(value, |v| allowed.iter().any(|a| equal(v, a))),
        Condition::Gt(bound) => any_element(value, |v| ordered(v, bound, &[Ordering::Greater])),
        Condition::Gte(bound) => any_element(value, |v| {
            ordered(v, bound, &[Ordering::Greater, Ordering::Equal])
        }),
        Condition::Lt(bound) => any_element(value, |v| ordered(v, bound, &[Ordering::Less])),
        Condition::Lte(bound) => any_element(value, |v| {
            ordered(v, bound, &[Ordering::Less, Ordering::Equal])
        }),
    }
}

fn any_element(value: &Value, predicate: impl Fn(&Value) -> bool) -> bool {
    match value {
        Value::Array(items) => items.iter().any(&predicate),
        other => predicate(other),
    }
}

fn values_equal(a: &Value, b: &Value, kind: ValueKind) -> bool {
    a == b || compare_values(a, b, kind) == Some(Ordering::Equal)
}

/// Orders two JSON values of the same kind.
///
/// Numbers compare numerically. Strings compare byte-wise, except on
/// `Timestamp` fields, where two RFC 3339 strings compare by instant.
/// Mixed kinds are unordered.
pub fn compare_values(a: &Value, b: &Value, kind: ValueKind) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => match kind {
            ValueKind::Timestamp => Some(compare_datetimes(x, y).unwrap_or_else(|| x.cmp(y))),
            ValueKind::Plain => Some(x.cmp(y)),
        },
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Sorts records by the given keys in precedence order.
///
/// Missing and `null` values sort first in ascending order. The sort is
/// stable, so records equal on every key keep their incoming order.
pub fn sort_records(records: &mut [Value], sort: &[SortParam]) {
    if sort.is_empty() {
        return;
    }
    records.sort_by(|a, b| {
        for key in sort {
            let left = lookup(a, &key.field).filter(|v| !v.is_null());
            let right = lookup(b, &key.field).filter(|v| !v.is_null());
            let ordering = match (left, right) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(l), Some(r)) => compare_values(l, r, key.kind).unwrap_or(Ordering::Equal),
            };
            let ordering = match key.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chair() -> Value {
        json!({
            "_id": "1",
            "name": "Chair",
            "price": 49.99,
            "inStock": true,
            "tags": ["wood", "seating"],
            "released": "2024-03-01T12:00:00Z",
            "dimensions": {"width": 40}
        })
    }

    #[test]
    fn test_eq_and_ne() {
        let record = chair();
        assert!(matches(&Filter::field("name", Condition::Eq(json!("Chair"))), &record));
        assert!(!matches(&Filter::field("name", Condition::Eq(json!("Desk"))), &record));
        assert!(matches(&Filter::field("name", Condition::Ne(json!("Desk"))), &record));
        assert!(matches(&Filter::field("inStock", Condition::Eq(json!(true))), &record));
    }

    #[test]
    fn test_numeric_ranges() {
        let record = chair();
        assert!(matches(&Filter::field("price", Condition::Gt(json!(40))), &record));
        assert!(matches(&Filter::field("price", Condition::Lte(json!(49.99))), &record));
        assert!(!matches(&Filter::field("price", Condition::Lt(json!(49))), &record));
        // Integer and float forms of the same number are equal.
        let whole = json!({"price": 50});
        assert!(matches(&Filter::field("price", Condition::Eq(json!(50.0))), &whole));
    }

    #[test]
    fn test_datetime_comparison_by_instant() {
        let record = chair();
        let released =
            |condition: Condition| Filter::typed_field("released", condition, ValueKind::Timestamp);
        assert!(matches(
            &released(Condition::Gt(json!("2024-03-01T13:30:00+02:00"))),
            &record
        ));
        assert!(matches(
            &released(Condition::Eq(json!("2024-03-01T14:00:00+02:00"))),
            &record
        ));
        assert!(!matches(
            &released(Condition::Ne(json!("2024-03-01T14:00:00+02:00"))),
            &record
        ));
    }

    #[test]
    fn test_plain_strings_compare_bytewise() {
        let record = json!({"name": "2024-01-01T01:00:00+01:00"});
        assert!(!matches(
            &Filter::field("name", Condition::Eq(json!("2024-01-01T00:00:00Z"))),
            &record
        ));
        assert!(matches(
            &Filter::field("name", Condition::Eq(json!("2024-01-01T01:00:00+01:00"))),
            &record
        ));
        // Byte order, not instant order: "...T01..." > "...T00...".
        assert!(matches(
            &Filter::field("name", Condition::Gt(json!("2024-01-01T00:30:00Z"))),
            &record
        ));
    }

    #[test]
    fn test_sort_timestamps_by_instant() {
        let mut records = vec![
            json!({"_id": "a", "at": "2024-01-01T01:00:00+02:00"}),
            json!({"_id": "b", "at": "2024-01-01T00:00:00Z"}),
        ];
        sort_records(&mut records, &[SortParam::asc("at")]);
        let ids: Vec<_> = records.iter().map(|r| r["_id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["b", "a"]);

        sort_records(&mut records, &[SortParam::asc("at").with_kind(ValueKind::Timestamp)]);
        let ids: Vec<_> = records.iter().map(|r| r["_id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_array_fields_match_any_element() {
        let record = chair();
        assert!(matches(&Filter::field("tags", Condition::Eq(json!("wood"))), &record));
        assert!(!matches(&Filter::field("tags", Condition::Ne(json!("wood"))), &record));
        assert!(matches(
            &Filter::field("tags", Condition::In(vec![json!("metal"), json!("seating")])),
            &record
        ));
        assert!(!matches(
            &Filter::field("tags", Condition::Nin(vec![json!("seating")])),
            &record
        ));
    }

    #[test]
    fn test_missing_field_is_null() {
        let record = chair();
        assert!(matches(&Filter::field("color", Condition::Eq(Value::Null)), &record));
        assert!(matches(&Filter::field("color", Condition::Ne(json!("red"))), &record));
        assert!(!matches(&Filter::field("color", Condition::Gt(json!(0))), &record));
    }

    #[test]
    fn test_nested_path_and_boolean_logic() {
        let record = chair();
        let narrow = Filter::field("dimensions.width", Condition::Lt(json!(50)));
        let wrong_name = Filter::field("name", Condition::Eq(json!("Desk")));
        assert!(matches(&narrow, &record));
        assert!(matches(&Filter::Or(vec![wrong_name.clone(), narrow.clone()]), &record));
        assert!(!matches(&Filter::And(vec![wrong_name, narrow]), &record));
    }

    #[test]
    fn test_sort_records_multi_key() {
        let mut records = vec![
            json!({"_id": "a", "category": "b", "price": 10}),
            json!({"_id": "b", "category": "a", "price": 30}),
            json!({"_id": "c", "category": "a", "price": 20}),
            json!({"_id": "d", "price": 5}),
        ];
        sort_records(
            &mut records,
            &[SortParam::asc("category"), SortParam::desc("price")],
        );
        let ids: Vec<_> = records.iter().map(|r| r["_id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["d", "b", "c", "a"]);
    }
}
