//! JSON path access and coercion helpers.
//!
//! Dotted-path lookup/assignment over [`serde_json`] values plus the loose
//! coercion rules shared by the template resolver and the comparison
//! conditions. Everything here is total: no helper panics or errors on odd
//! input shapes.

use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Look up a value in a JSON object map using a dot-separated path.
///
/// Array segments are addressed by numeric index. Missing keys, out-of-range
/// indexes, and non-container intermediates all yield `None`.
///
/// # Examples
///
/// ```rust
/// use brickflow::utils::json::get_path;
/// use serde_json::json;
///
/// let map = json!({"user": {"tags": ["a", "b"]}});
/// let map = map.as_object().unwrap();
/// assert_eq!(get_path(map, "user.tags.1"), Some(&json!("b")));
/// assert_eq!(get_path(map, "user.missing.deep"), None);
/// ```
#[must_use]
pub fn get_path<'a>(map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let head = parts.next()?;
    let mut current = map.get(head)?;
    for part in parts {
        match current {
            Value::Object(obj) => current = obj.get(part)?,
            Value::Array(arr) => {
                let index: usize = part.parse().ok()?;
                current = arr.get(index)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Set a value in a JSON object map using a dot-separated path, creating
/// intermediate objects as needed.
///
/// A non-object intermediate is replaced by an object rather than rejected;
/// run-scoped variable writes never fail.
pub fn set_path(map: &mut Map<String, Value>, path: &str, value: Value) {
    let parts: Vec<&str> = path.split('.').collect();
    if parts.len() == 1 {
        map.insert(parts[0].to_string(), value);
        return;
    }

    let entry = map
        .entry(parts[0].to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    let mut current = entry;
    for part in &parts[1..parts.len() - 1] {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        match current {
            Value::Object(obj) => {
                current = obj
                    .entry((*part).to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
            }
            _ => unreachable!("intermediate coerced to object above"),
        }
    }
    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Value::Object(obj) = current {
        obj.insert(parts[parts.len() - 1].to_string(), value);
    }
}

/// Render a JSON value as the string form used in mixed-content templates.
///
/// - `null` → empty string
/// - `true` → `"1"`, `false` → empty string
/// - numbers and strings render plainly
/// - arrays and objects render as compact JSON
#[must_use]
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        composite => serde_json::to_string(composite).unwrap_or_default(),
    }
}

/// Whether a value counts as empty: `null`, `""`, `[]`, or `{}`.
#[must_use]
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(arr) => arr.is_empty(),
        Value::Object(obj) => obj.is_empty(),
        _ => false,
    }
}

/// Loose truthiness: empty values, `false`, and zero are falsy.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        other => !is_empty_value(other),
    }
}

/// Numeric view of a value: numbers directly, numeric strings parsed.
#[must_use]
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Loose equality in the spirit of the `==` comparison operator.
///
/// Same-typed values compare structurally; a number and a numeric string
/// compare numerically; booleans compare against the other side's
/// truthiness; anything else falls back to stringified comparison.
#[must_use]
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Bool(x), other) | (other, Value::Bool(x)) => *x == is_truthy(other),
        (Value::Number(_), Value::Number(_))
        | (Value::Number(_), Value::String(_))
        | (Value::String(_), Value::Number(_)) => match (as_f64(a), as_f64(b)) {
            (Some(x), Some(y)) => x == y,
            _ => value_to_string(a) == value_to_string(b),
        },
        (Value::String(x), Value::String(y)) => x == y,
        _ => a == b,
    }
}

/// Total ordering over JSON values for the `sort` filter.
///
/// Numbers (including numeric strings) order numerically, strings
/// lexicographically; mixed types order by a fixed type rank so the sort is
/// deterministic.
#[must_use]
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    if let (Some(x), Some(y)) = (as_f64(a), as_f64(b)) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }
    match (a, b) {
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => {
            let rank = |v: &Value| match v {
                Value::Null => 0u8,
                Value::Bool(_) => 1,
                Value::Number(_) => 2,
                Value::String(_) => 3,
                Value::Array(_) => 4,
                Value::Object(_) => 5,
            };
            rank(a)
                .cmp(&rank(b))
                .then_with(|| value_to_string(a).cmp(&value_to_string(b)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn get_path_resolves_nested_and_indexed() {
        let map = obj(json!({"a": {"b": [10, 20]}}));
        assert_eq!(get_path(&map, "a.b.0"), Some(&json!(10)));
        assert_eq!(get_path(&map, "a.b.9"), None);
        assert_eq!(get_path(&map, "a.b.0.x"), None);
    }

    #[test]
    fn set_path_creates_intermediates() {
        let mut map = Map::new();
        set_path(&mut map, "user.profile.name", json!("Alice"));
        assert_eq!(get_path(&map, "user.profile.name"), Some(&json!("Alice")));
    }

    #[test]
    fn set_path_overwrites_scalar_intermediate() {
        let mut map = obj(json!({"user": 1}));
        set_path(&mut map, "user.name", json!("Bob"));
        assert_eq!(get_path(&map, "user.name"), Some(&json!("Bob")));
    }

    #[test]
    fn stringification_matrix() {
        assert_eq!(value_to_string(&json!(null)), "");
        assert_eq!(value_to_string(&json!(true)), "1");
        assert_eq!(value_to_string(&json!(false)), "");
        assert_eq!(value_to_string(&json!(42)), "42");
        assert_eq!(value_to_string(&json!("x")), "x");
        assert_eq!(value_to_string(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn loose_eq_coerces_numeric_strings() {
        assert!(loose_eq(&json!(10), &json!("10")));
        assert!(loose_eq(&json!("10"), &json!(10.0)));
        assert!(!loose_eq(&json!(10), &json!("11")));
        assert!(loose_eq(&json!(true), &json!("yes")));
        assert!(!loose_eq(&json!(true), &json!("")));
    }

    #[test]
    fn compare_values_sorts_numbers_before_mixed() {
        let mut values = vec![json!(3), json!(1), json!(2)];
        values.sort_by(compare_values);
        assert_eq!(values, vec![json!(1), json!(2), json!(3)]);
    }
}
