//! The filter pipeline applied inside template references.
//!
//! Filters transform one value into another and never error: a filter that
//! does not apply to its input (and any unknown filter name) passes the
//! value through unchanged.
//!
//! | group      | filters |
//! |------------|---------|
//! | string     | `upper`, `lower`, `ucfirst`, `ucwords`, `trim` |
//! | structural | `json`, `count`, `first`, `last`, `join`, `keys`, `values`, `reverse`, `sort`, `unique` |
//! | temporal   | `date`, `datetime`, `time` |
//! | other      | `default` (documents intent; identity) |

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::utils::json::{compare_values, value_to_string};

/// Apply a single named filter to a value.
#[must_use]
pub fn apply(value: Value, filter: &str) -> Value {
    match filter {
        "upper" => map_string(value, |s| s.to_uppercase()),
        "lower" => map_string(value, |s| s.to_lowercase()),
        "ucfirst" => map_string(value, ucfirst),
        "ucwords" => map_string(value, ucwords),
        "trim" => map_string(value, |s| s.trim().to_string()),
        "json" => Value::String(serde_json::to_string(&value).unwrap_or_default()),
        "count" => count(value),
        "first" => match value {
            Value::Array(items) => items.into_iter().next().unwrap_or_else(empty_string),
            other => other,
        },
        "last" => match value {
            Value::Array(items) => items.into_iter().next_back().unwrap_or_else(empty_string),
            other => other,
        },
        "join" => match value {
            Value::Array(items) => Value::String(
                items
                    .iter()
                    .map(value_to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            other => other,
        },
        "keys" => match value {
            Value::Object(map) => Value::Array(map.keys().cloned().map(Value::String).collect()),
            Value::Array(items) => {
                Value::Array((0..items.len()).map(|i| Value::Number(i.into())).collect())
            }
            other => other,
        },
        "values" => match value {
            Value::Object(map) => Value::Array(map.into_iter().map(|(_, v)| v).collect()),
            other => other,
        },
        "reverse" => match value {
            Value::Array(mut items) => {
                items.reverse();
                Value::Array(items)
            }
            Value::String(s) => Value::String(s.chars().rev().collect()),
            other => other,
        },
        "sort" => match value {
            Value::Array(mut items) => {
                items.sort_by(compare_values);
                Value::Array(items)
            }
            other => other,
        },
        "unique" => match value {
            Value::Array(items) => {
                let mut seen: Vec<Value> = Vec::with_capacity(items.len());
                for item in items {
                    if !seen.contains(&item) {
                        seen.push(item);
                    }
                }
                Value::Array(seen)
            }
            other => other,
        },
        "date" => format_temporal(&value, "%Y-%m-%d"),
        "datetime" => format_temporal(&value, "%Y-%m-%d %H:%M:%S"),
        "time" => format_temporal(&value, "%H:%M:%S"),
        // `default` documents intent in flow definitions; it supplies no
        // fallback value of its own.
        "default" => value,
        _ => value,
    }
}

fn empty_string() -> Value {
    Value::String(String::new())
}

fn map_string(value: Value, f: impl FnOnce(&str) -> String) -> Value {
    match value {
        Value::String(s) => Value::String(f(&s)),
        other => other,
    }
}

fn ucfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn ucwords(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_boundary = true;
    for ch in s.chars() {
        if at_boundary {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_boundary = ch.is_whitespace();
    }
    out
}

fn count(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Number(items.len().into()),
        Value::Object(map) => Value::Number(map.len().into()),
        Value::String(s) => Value::Number(s.chars().count().into()),
        other => other,
    }
}

/// Format a temporal value; non-parseable input yields an empty string.
fn format_temporal(value: &Value, format: &str) -> Value {
    match parse_temporal(value) {
        Some(dt) => Value::String(dt.format(format).to_string()),
        None => empty_string(),
    }
}

fn parse_temporal(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(naive.and_utc());
            }
            if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
            }
            None
        }
        Value::Number(n) => DateTime::from_timestamp(n.as_i64()?, 0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_filters() {
        assert_eq!(apply(json!("hello"), "upper"), json!("HELLO"));
        assert_eq!(apply(json!("HELLO"), "lower"), json!("hello"));
        assert_eq!(apply(json!("hello world"), "ucfirst"), json!("Hello world"));
        assert_eq!(apply(json!("hello world"), "ucwords"), json!("Hello World"));
        assert_eq!(apply(json!("  hello  "), "trim"), json!("hello"));
    }

    #[test]
    fn json_filter_encodes_any_value() {
        assert_eq!(apply(json!({"a": 1, "b": 2}), "json"), json!("{\"a\":1,\"b\":2}"));
        assert_eq!(apply(json!("hello"), "json"), json!("\"hello\""));
    }

    #[test]
    fn count_filter() {
        assert_eq!(apply(json!([1, 2, 3, 4, 5]), "count"), json!(5));
        assert_eq!(apply(json!("hello"), "count"), json!(5));
        assert_eq!(apply(json!({"a": 1, "b": 2}), "count"), json!(2));
    }

    #[test]
    fn first_and_last() {
        assert_eq!(apply(json!(["a", "b", "c"]), "first"), json!("a"));
        assert_eq!(apply(json!(["a", "b", "c"]), "last"), json!("c"));
        assert_eq!(apply(json!([]), "first"), json!(""));
        assert_eq!(apply(json!([]), "last"), json!(""));
    }

    #[test]
    fn join_keys_values() {
        assert_eq!(apply(json!(["a", "b", "c"]), "join"), json!("a, b, c"));
        assert_eq!(apply(json!({"x": 1, "y": 2}), "keys"), json!(["x", "y"]));
        assert_eq!(apply(json!({"x": 1, "y": 2}), "values"), json!([1, 2]));
    }

    #[test]
    fn reverse_sort_unique() {
        assert_eq!(apply(json!([1, 2, 3]), "reverse"), json!([3, 2, 1]));
        assert_eq!(apply(json!("hello"), "reverse"), json!("olleh"));
        assert_eq!(apply(json!([3, 1, 2]), "sort"), json!([1, 2, 3]));
        assert_eq!(apply(json!([1, 2, 2, 3, 3, 3]), "unique"), json!([1, 2, 3]));
    }

    #[test]
    fn temporal_filters() {
        assert_eq!(
            apply(json!("2025-06-15 14:30:45"), "date"),
            json!("2025-06-15")
        );
        assert_eq!(
            apply(json!("2025-06-15 14:30:45"), "datetime"),
            json!("2025-06-15 14:30:45")
        );
        assert_eq!(
            apply(json!("2025-06-15 14:30:45"), "time"),
            json!("14:30:45")
        );
        assert_eq!(apply(json!("2025-06-15"), "date"), json!("2025-06-15"));
        assert_eq!(apply(json!([]), "date"), json!(""));
        assert_eq!(apply(json!("not a date"), "date"), json!(""));
    }

    #[test]
    fn default_and_unknown_are_identity() {
        assert_eq!(apply(json!(""), "default"), json!(""));
        assert_eq!(apply(json!("value"), "default"), json!("value"));
        assert_eq!(apply(json!("test"), "unknownfilter"), json!("test"));
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        assert_eq!(
            apply(json!(["2", 2, "1"]), "sort"),
            json!(["1", "2", 2])
        );
    }
}
