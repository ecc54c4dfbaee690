//! Built-in conditions: field comparisons and boolean combinators.
//!
//! All conditions read the run context through dotted field paths, so
//! `user.role` reaches into nested payload structures. Comparison semantics
//! follow the loose/strict split of the `operator` config field where
//! applicable: `==` coerces numeric strings and booleans, `===` compares
//! structurally.

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;

use crate::bricks::{BrickConfig, BrickError, BrickMeta, ConditionBrick};
use crate::context::FlowContext;
use crate::registry::BrickRegistry;
use crate::utils::json::{as_f64, is_empty_value, loose_eq};

pub(super) fn register(registry: &mut BrickRegistry) {
    registry.register_condition("field_equals", |c| Box::new(FieldEquals::new(c)));
    registry.register_condition("field_not_equals", |c| Box::new(FieldNotEquals::new(c)));
    registry.register_condition("field_contains", |c| Box::new(FieldContains::new(c)));
    registry.register_condition("field_greater_than", |c| Box::new(FieldGreaterThan::new(c)));
    registry.register_condition("field_less_than", |c| Box::new(FieldLessThan::new(c)));
    registry.register_condition("field_is_empty", |c| Box::new(FieldIsEmpty::new(c)));
    registry.register_condition("field_matches_regex", |c| Box::new(FieldMatchesRegex::new(c)));
    registry.register_condition("and", |c| Box::new(AndCondition::new(c)));
    registry.register_condition("or", |c| Box::new(OrCondition::new(c)));
}

fn field_value(config: &BrickConfig, ctx: &FlowContext) -> Result<Value, BrickError> {
    let field = config.require_str("field")?;
    Ok(ctx.get(&field).cloned().unwrap_or(Value::Null))
}

/// `field == value` (loose by default, strict with `operator: "==="`).
pub struct FieldEquals {
    config: BrickConfig,
}

impl FieldEquals {
    #[must_use]
    pub fn new(config: Value) -> Self {
        Self {
            config: BrickConfig::new(config),
        }
    }
}

impl BrickMeta for FieldEquals {
    fn name(&self) -> &str {
        "Field Equals"
    }

    fn description(&self) -> &str {
        "Checks whether a field equals the configured value"
    }

    fn category(&self) -> &str {
        "Comparison"
    }
}

#[async_trait]
impl ConditionBrick for FieldEquals {
    async fn evaluate(&self, ctx: &FlowContext) -> Result<bool, BrickError> {
        let actual = field_value(&self.config, ctx)?;
        let expected = self.config.get("value").cloned().unwrap_or(Value::Null);
        let strict = self.config.str_or("operator", "==") == "===";
        Ok(if strict {
            actual == expected
        } else {
            loose_eq(&actual, &expected)
        })
    }
}

/// Negation of [`FieldEquals`] (loose comparison).
pub struct FieldNotEquals {
    config: BrickConfig,
}

impl FieldNotEquals {
    #[must_use]
    pub fn new(config: Value) -> Self {
        Self {
            config: BrickConfig::new(config),
        }
    }
}

impl BrickMeta for FieldNotEquals {
    fn name(&self) -> &str {
        "Field Not Equals"
    }

    fn description(&self) -> &str {
        "Checks whether a field differs from the configured value"
    }

    fn category(&self) -> &str {
        "Comparison"
    }
}

#[async_trait]
impl ConditionBrick for FieldNotEquals {
    async fn evaluate(&self, ctx: &FlowContext) -> Result<bool, BrickError> {
        let actual = field_value(&self.config, ctx)?;
        let expected = self.config.get("value").cloned().unwrap_or(Value::Null);
        Ok(!loose_eq(&actual, &expected))
    }
}

/// Substring / element containment with optional case-insensitivity.
pub struct FieldContains {
    config: BrickConfig,
}

impl FieldContains {
    #[must_use]
    pub fn new(config: Value) -> Self {
        Self {
            config: BrickConfig::new(config),
        }
    }
}

impl BrickMeta for FieldContains {
    fn name(&self) -> &str {
        "Field Contains"
    }

    fn description(&self) -> &str {
        "Checks whether a string field contains a needle or an array contains a value"
    }

    fn category(&self) -> &str {
        "Comparison"
    }
}

#[async_trait]
impl ConditionBrick for FieldContains {
    async fn evaluate(&self, ctx: &FlowContext) -> Result<bool, BrickError> {
        let actual = field_value(&self.config, ctx)?;
        let needle = self.config.get("needle").cloned().unwrap_or(Value::Null);
        let case_sensitive = self.config.bool_or("case_sensitive", true);
        match &actual {
            Value::String(haystack) => {
                let needle = match &needle {
                    Value::String(s) => s.clone(),
                    other => crate::utils::json::value_to_string(other),
                };
                if case_sensitive {
                    Ok(haystack.contains(&needle))
                } else {
                    Ok(haystack.to_lowercase().contains(&needle.to_lowercase()))
                }
            }
            Value::Array(items) => Ok(items.iter().any(|item| loose_eq(item, &needle))),
            _ => Ok(false),
        }
    }
}

/// `field > value` (or `>=` with `operator: ">="`). Non-numeric sides fail.
pub struct FieldGreaterThan {
    config: BrickConfig,
}

impl FieldGreaterThan {
    #[must_use]
    pub fn new(config: Value) -> Self {
        Self {
            config: BrickConfig::new(config),
        }
    }
}

impl BrickMeta for FieldGreaterThan {
    fn name(&self) -> &str {
        "Field Greater Than"
    }

    fn description(&self) -> &str {
        "Numeric greater-than comparison against a field"
    }

    fn category(&self) -> &str {
        "Comparison"
    }
}

#[async_trait]
impl ConditionBrick for FieldGreaterThan {
    async fn evaluate(&self, ctx: &FlowContext) -> Result<bool, BrickError> {
        let actual = field_value(&self.config, ctx)?;
        let expected = self.config.get("value").cloned().unwrap_or(Value::Null);
        let (Some(lhs), Some(rhs)) = (as_f64(&actual), as_f64(&expected)) else {
            return Ok(false);
        };
        Ok(if self.config.str_or("operator", ">") == ">=" {
            lhs >= rhs
        } else {
            lhs > rhs
        })
    }
}

/// `field < value` (or `<=` with `operator: "<="`). Non-numeric sides fail.
pub struct FieldLessThan {
    config: BrickConfig,
}

impl FieldLessThan {
    #[must_use]
    pub fn new(config: Value) -> Self {
        Self {
            config: BrickConfig::new(config),
        }
    }
}

impl BrickMeta for FieldLessThan {
    fn name(&self) -> &str {
        "Field Less Than"
    }

    fn description(&self) -> &str {
        "Numeric less-than comparison against a field"
    }

    fn category(&self) -> &str {
        "Comparison"
    }
}

#[async_trait]
impl ConditionBrick for FieldLessThan {
    async fn evaluate(&self, ctx: &FlowContext) -> Result<bool, BrickError> {
        let actual = field_value(&self.config, ctx)?;
        let expected = self.config.get("value").cloned().unwrap_or(Value::Null);
        let (Some(lhs), Some(rhs)) = (as_f64(&actual), as_f64(&expected)) else {
            return Ok(false);
        };
        Ok(if self.config.str_or("operator", "<") == "<=" {
            lhs <= rhs
        } else {
            lhs < rhs
        })
    }
}

/// True when the field is missing, `null`, `""`, `[]`, or `{}`.
pub struct FieldIsEmpty {
    config: BrickConfig,
}

impl FieldIsEmpty {
    #[must_use]
    pub fn new(config: Value) -> Self {
        Self {
            config: BrickConfig::new(config),
        }
    }
}

impl BrickMeta for FieldIsEmpty {
    fn name(&self) -> &str {
        "Field Is Empty"
    }

    fn description(&self) -> &str {
        "Checks whether a field is missing or empty"
    }

    fn category(&self) -> &str {
        "Comparison"
    }
}

#[async_trait]
impl ConditionBrick for FieldIsEmpty {
    async fn evaluate(&self, ctx: &FlowContext) -> Result<bool, BrickError> {
        let actual = field_value(&self.config, ctx)?;
        Ok(is_empty_value(&actual))
    }
}

/// Regex match against a string field; the pattern comes from config.
pub struct FieldMatchesRegex {
    config: BrickConfig,
}

impl FieldMatchesRegex {
    #[must_use]
    pub fn new(config: Value) -> Self {
        Self {
            config: BrickConfig::new(config),
        }
    }
}

impl BrickMeta for FieldMatchesRegex {
    fn name(&self) -> &str {
        "Field Matches Regex"
    }

    fn description(&self) -> &str {
        "Checks whether a string field matches a regular expression"
    }

    fn category(&self) -> &str {
        "Comparison"
    }
}

#[async_trait]
impl ConditionBrick for FieldMatchesRegex {
    async fn evaluate(&self, ctx: &FlowContext) -> Result<bool, BrickError> {
        let actual = field_value(&self.config, ctx)?;
        let pattern = self.config.require_str("pattern")?;
        let regex = Regex::new(&pattern)
            .map_err(|e| BrickError::invalid_config(format!("invalid pattern: {e}")))?;
        match actual {
            Value::String(s) => Ok(regex.is_match(&s)),
            _ => Ok(false),
        }
    }
}

/// Up to three `fieldN == valueN` slots that must all match (loose).
pub struct AndCondition {
    config: BrickConfig,
}

impl AndCondition {
    #[must_use]
    pub fn new(config: Value) -> Self {
        Self {
            config: BrickConfig::new(config),
        }
    }

    fn slots(&self) -> Vec<(String, Value)> {
        (1..=3)
            .filter_map(|i| {
                let field = self.config.str(&format!("field{i}"))?;
                let value = self
                    .config
                    .get(&format!("value{i}"))
                    .cloned()
                    .unwrap_or(Value::Null);
                Some((field.to_string(), value))
            })
            .collect()
    }
}

impl BrickMeta for AndCondition {
    fn name(&self) -> &str {
        "AND Condition"
    }

    fn description(&self) -> &str {
        "True when every configured field/value pair matches"
    }

    fn category(&self) -> &str {
        "Logic"
    }
}

#[async_trait]
impl ConditionBrick for AndCondition {
    async fn evaluate(&self, ctx: &FlowContext) -> Result<bool, BrickError> {
        let slots = self.slots();
        if slots.is_empty() {
            return Ok(false);
        }
        Ok(slots.iter().all(|(field, expected)| {
            let actual = ctx.get(field).cloned().unwrap_or(Value::Null);
            loose_eq(&actual, expected)
        }))
    }
}

/// Up to three `fieldN == valueN` slots of which at least one must match.
pub struct OrCondition {
    config: BrickConfig,
}

impl OrCondition {
    #[must_use]
    pub fn new(config: Value) -> Self {
        Self {
            config: BrickConfig::new(config),
        }
    }

    fn slots(&self) -> Vec<(String, Value)> {
        (1..=3)
            .filter_map(|i| {
                let field = self.config.str(&format!("field{i}"))?;
                let value = self
                    .config
                    .get(&format!("value{i}"))
                    .cloned()
                    .unwrap_or(Value::Null);
                Some((field.to_string(), value))
            })
            .collect()
    }
}

impl BrickMeta for OrCondition {
    fn name(&self) -> &str {
        "OR Condition"
    }

    fn description(&self) -> &str {
        "True when any configured field/value pair matches"
    }

    fn category(&self) -> &str {
        "Logic"
    }
}

#[async_trait]
impl ConditionBrick for OrCondition {
    async fn evaluate(&self, ctx: &FlowContext) -> Result<bool, BrickError> {
        let slots = self.slots();
        if slots.is_empty() {
            return Ok(false);
        }
        Ok(slots.iter().any(|(field, expected)| {
            let actual = ctx.get(field).cloned().unwrap_or(Value::Null);
            loose_eq(&actual, expected)
        }))
    }
}
