//! Templated-variable resolution for brick configuration.
//!
//! Nearly every configuration value in a flow definition may embed
//! references of the form `{{ path }}` or `{{ path | filter1 | filter2 }}`,
//! where `path` addresses the run context's merged variable namespace
//! (runtime variables shadowing the initial payload). The runner materializes
//! each node's configuration through [`resolve`] before handing it to the
//! brick.
//!
//! # Resolution rules
//!
//! - **Type-preserving short-circuit**: when the entire input string (after
//!   trimming) is exactly one reference, the referenced value is returned
//!   with its native type intact — arrays stay arrays, numbers stay numbers.
//! - **Mixed-content stringification**: otherwise each reference is replaced
//!   by its stringified value (missing path → empty string, `true` → `"1"`,
//!   `false` → empty string) and literal text is left untouched. Malformed
//!   or unclosed reference syntax stays verbatim.
//! - **Filters** apply left to right; an unknown filter is an identity
//!   passthrough. See [`filters`].
//! - **Composites** resolve recursively; mapping keys may themselves be
//!   templates, and a resolved key colliding with an existing one overwrites
//!   it (later wins). Positional keys pass through unchanged.
//!
//! Resolution never fails: every input produces a best-effort value.
//!
//! # Examples
//!
//! ```rust
//! use brickflow::context::FlowContext;
//! use brickflow::template;
//! use serde_json::json;
//!
//! let ctx = FlowContext::new("flow-1", json!({"a": {"b": 5}, "name": "abc"}));
//!
//! assert_eq!(template::resolve(&json!("{{ a.b }}"), &ctx), json!(5));
//! assert_eq!(template::resolve(&json!("X={{ a.b }}"), &ctx), json!("X=5"));
//! assert_eq!(template::resolve(&json!("{{ name | upper }}"), &ctx), json!("ABC"));
//! ```

pub mod filters;

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

use crate::context::FlowContext;
use crate::utils::json::value_to_string;

fn reference_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z0-9_][A-Za-z0-9_.\-]*)\s*((?:\|\s*[A-Za-z0-9_]+\s*)*)\}\}")
            .expect("reference pattern is valid")
    })
}

/// Resolve a raw configuration value against the run context.
///
/// Strings go through reference resolution; sequences and mappings resolve
/// recursively; every other scalar passes through unchanged.
#[must_use]
pub fn resolve(raw: &Value, ctx: &FlowContext) -> Value {
    match raw {
        Value::String(s) => resolve_str(s, ctx),
        Value::Array(items) => Value::Array(items.iter().map(|v| resolve(v, ctx)).collect()),
        Value::Object(map) => Value::Object(resolve_map(map, ctx)),
        other => other.clone(),
    }
}

/// Resolve a string value: single full reference → native-typed value,
/// anything else → rendered string.
#[must_use]
pub fn resolve_str(raw: &str, ctx: &FlowContext) -> Value {
    if let Some((path, filter_names)) = as_single_reference(raw) {
        let value = ctx.get(path).cloned().unwrap_or(Value::Null);
        return filter_names
            .into_iter()
            .fold(value, |acc, name| filters::apply(acc, name));
    }
    Value::String(render(raw, ctx))
}

/// Render a mixed-content template, substituting every embedded reference
/// with its stringified value.
#[must_use]
pub fn render(template: &str, ctx: &FlowContext) -> String {
    reference_regex()
        .replace_all(template, |caps: &regex::Captures<'_>| {
            let path = &caps[1];
            let value = ctx.get(path).cloned().unwrap_or(Value::Null);
            let value = parse_filters(caps.get(2).map_or("", |m| m.as_str()))
                .fold(value, |acc, name| filters::apply(acc, name));
            value_to_string(&value)
        })
        .into_owned()
}

/// Resolve a mapping: both keys and values may be templates.
///
/// Entries are processed in insertion order; a resolved key that collides
/// with an already-present key overwrites it.
#[must_use]
pub fn resolve_map(map: &Map<String, Value>, ctx: &FlowContext) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in map {
        let resolved_key = if key.contains("{{") {
            render(key, ctx)
        } else {
            key.clone()
        };
        out.insert(resolved_key, resolve(value, ctx));
    }
    out
}

/// Match a string that consists (after trimming) of exactly one reference,
/// returning its path and filter names.
fn as_single_reference(raw: &str) -> Option<(&str, Vec<&str>)> {
    let trimmed = raw.trim();
    let caps = reference_regex().captures(trimmed)?;
    let whole = caps.get(0)?;
    if whole.start() != 0 || whole.end() != trimmed.len() {
        return None;
    }
    let path = caps.get(1)?.as_str();
    let filter_names = parse_filters(caps.get(2).map_or("", |m| m.as_str())).collect();
    Some((path, filter_names))
}

fn parse_filters(segment: &str) -> impl Iterator<Item = &str> {
    segment
        .split('|')
        .map(str::trim)
        .filter(|name| !name.is_empty())
}
