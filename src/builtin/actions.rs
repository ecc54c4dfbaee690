//! Built-in actions.

use async_trait::async_trait;
use serde_json::Value;

use crate::bricks::{ActionBrick, BrickConfig, BrickError, BrickMeta};
use crate::context::FlowContext;
use crate::registry::BrickRegistry;
use crate::types::LogLevel;
use crate::utils::json::{as_f64, compare_values, get_path, is_empty_value, is_truthy, loose_eq, value_to_string};

pub(super) fn register(registry: &mut BrickRegistry) {
    registry.register_action("set_variable", |c| Box::new(SetVariable::new(c)));
    registry.register_action("log_message", |c| Box::new(LogMessage::new(c)));
    registry.register_action("stop_flow", |c| Box::new(StopFlow::new(c)));
    registry.register_action("await_approval", |c| Box::new(AwaitApproval::new(c)));
    registry.register_action("transform_data", |c| Box::new(TransformData::new(c)));
    #[cfg(feature = "http")]
    registry.register_action("call_webhook", |c| Box::new(CallWebhook::new(c)));
}

/// Write one variable (`mode: single`) or several (`mode: multiple`), with a
/// `value_type` cast applied to each raw value.
///
/// Supported casts: `string`, `integer`, `float`, `boolean`, `json`, and
/// `auto` (the default: numeric and boolean-looking strings are detected,
/// anything else stays a string).
pub struct SetVariable {
    config: BrickConfig,
}

impl SetVariable {
    #[must_use]
    pub fn new(config: Value) -> Self {
        Self {
            config: BrickConfig::new(config),
        }
    }

    fn cast(value: Value, value_type: &str) -> Value {
        match value_type {
            "string" => Value::String(value_to_string(&value)),
            "integer" => {
                let n = match &value {
                    Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
                    Value::String(s) => s
                        .trim()
                        .parse::<i64>()
                        .ok()
                        .or_else(|| s.trim().parse::<f64>().ok().map(|f| f as i64)),
                    _ => None,
                };
                Value::Number(n.unwrap_or(0).into())
            }
            "float" => {
                let f = as_f64(&value).unwrap_or(0.0);
                serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number)
            }
            "boolean" => Value::Bool(match &value {
                Value::Bool(b) => *b,
                Value::String(s) => {
                    matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on")
                }
                other => is_truthy(other),
            }),
            "json" => match &value {
                Value::String(s) => serde_json::from_str(s).unwrap_or(Value::Null),
                other => other.clone(),
            },
            "auto" => match value {
                Value::String(s) => Self::auto_detect(&s),
                other => other,
            },
            _ => value,
        }
    }

    fn auto_detect(s: &str) -> Value {
        let trimmed = s.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Number(i.into());
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if let Some(n) = serde_json::Number::from_f64(f) {
                return Value::Number(n);
            }
        }
        match trimmed {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(s.to_string()),
        }
    }
}

impl BrickMeta for SetVariable {
    fn name(&self) -> &str {
        "Set Variable"
    }

    fn description(&self) -> &str {
        "Stores one or more variables in the run context"
    }

    fn category(&self) -> &str {
        "Flow Control"
    }
}

#[async_trait]
impl ActionBrick for SetVariable {
    async fn handle(&self, ctx: &mut FlowContext) -> Result<(), BrickError> {
        let value_type = self.config.str_or("value_type", "auto");
        if self.config.str_or("mode", "single") == "multiple" {
            let Some(Value::Object(variables)) = self.config.get("variables") else {
                return Err(BrickError::invalid_config(
                    "mode 'multiple' requires a 'variables' object",
                ));
            };
            for (name, raw) in variables.clone() {
                ctx.set(&name, Self::cast(raw, &value_type));
            }
        } else {
            let name = self.config.require_str("variable_name")?;
            let raw = self
                .config
                .get("variable_value")
                .cloned()
                .unwrap_or(Value::Null);
            ctx.set(&name, Self::cast(raw, &value_type));
        }
        Ok(())
    }
}

/// Append a message to the run log (and mirror it to `tracing`).
pub struct LogMessage {
    config: BrickConfig,
}

impl LogMessage {
    #[must_use]
    pub fn new(config: Value) -> Self {
        Self {
            config: BrickConfig::new(config),
        }
    }
}

impl BrickMeta for LogMessage {
    fn name(&self) -> &str {
        "Log Message"
    }

    fn description(&self) -> &str {
        "Writes a message to the run log"
    }

    fn category(&self) -> &str {
        "Debugging"
    }
}

#[async_trait]
impl ActionBrick for LogMessage {
    async fn handle(&self, ctx: &mut FlowContext) -> Result<(), BrickError> {
        let mut message = self.config.str_or("message", "");
        if self.config.bool_or("include_context", false) {
            let variables = serde_json::to_string(ctx.variables()).unwrap_or_default();
            message = format!("{message} {variables}");
        }
        let level = LogLevel::parse_or_info(&self.config.str_or("level", "info"));
        match level {
            LogLevel::Debug => tracing::debug!(run_id = ctx.run_id(), "{message}"),
            LogLevel::Warning => tracing::warn!(run_id = ctx.run_id(), "{message}"),
            LogLevel::Error | LogLevel::Critical => {
                tracing::error!(run_id = ctx.run_id(), "{message}");
            }
            _ => tracing::info!(run_id = ctx.run_id(), "{message}"),
        }
        ctx.append_log(level, message);
        Ok(())
    }
}

/// Stop traversal after this node.
///
/// Records `_stop_requested`, `_stop_type` (`complete`/`fail`/`cancel`),
/// `_stop_reason`, and — when `output_variable` names an existing value —
/// `_flow_output`, then signals the runner to stop walking.
pub struct StopFlow {
    config: BrickConfig,
}

impl StopFlow {
    #[must_use]
    pub fn new(config: Value) -> Self {
        Self {
            config: BrickConfig::new(config),
        }
    }
}

impl BrickMeta for StopFlow {
    fn name(&self) -> &str {
        "Stop Flow"
    }

    fn description(&self) -> &str {
        "Stops the flow, optionally exposing a final output variable"
    }

    fn category(&self) -> &str {
        "Flow Control"
    }
}

#[async_trait]
impl ActionBrick for StopFlow {
    async fn handle(&self, ctx: &mut FlowContext) -> Result<(), BrickError> {
        let stop_type = self.config.str_or("stop_type", "complete");
        let reason = self.config.str_or("reason", "");

        ctx.set("_stop_requested", Value::Bool(true));
        ctx.set("_stop_type", Value::String(stop_type.clone()));
        ctx.set("_stop_reason", Value::String(reason.clone()));
        if let Some(output) = self.config.str("output_variable") {
            let value = ctx.get(output).cloned().unwrap_or(Value::Null);
            ctx.set("_flow_output", value);
        }

        let message = if reason.is_empty() {
            format!("Flow stopped ({stop_type})")
        } else {
            format!("Flow stopped ({stop_type}): {reason}")
        };
        let level = if stop_type == "fail" {
            LogLevel::Error
        } else {
            LogLevel::Info
        };
        ctx.append_log(level, message);
        ctx.request_stop();
        Ok(())
    }
}

/// Suspend the run until it is resumed externally (human approval, delayed
/// continuation). The pause cursor is the node this action runs at.
pub struct AwaitApproval {
    config: BrickConfig,
}

impl AwaitApproval {
    #[must_use]
    pub fn new(config: Value) -> Self {
        Self {
            config: BrickConfig::new(config),
        }
    }
}

impl BrickMeta for AwaitApproval {
    fn name(&self) -> &str {
        "Await Approval"
    }

    fn description(&self) -> &str {
        "Pauses the flow until it is resumed externally"
    }

    fn category(&self) -> &str {
        "Flow Control"
    }
}

#[async_trait]
impl ActionBrick for AwaitApproval {
    async fn handle(&self, ctx: &mut FlowContext) -> Result<(), BrickError> {
        let message = self.config.str_or("message", "Awaiting approval");
        ctx.info(message);
        ctx.mark_paused_here();
        Ok(())
    }
}

/// Reshape a collection variable and store the result.
///
/// `source` names the input (array, or object for the key/value operations),
/// `operation` picks the transform, and `store_as` names the output variable
/// (default `transformed_data`).
pub struct TransformData {
    config: BrickConfig,
}

impl TransformData {
    #[must_use]
    pub fn new(config: Value) -> Self {
        Self {
            config: BrickConfig::new(config),
        }
    }

    fn items(source: &Value) -> Option<Vec<Value>> {
        match source {
            Value::Array(items) => Some(items.clone()),
            Value::Object(map) => Some(map.values().cloned().collect()),
            _ => None,
        }
    }

    fn item_field<'a>(item: &'a Value, field: &str) -> &'a Value {
        item.as_object()
            .and_then(|obj| get_path(obj, field))
            .unwrap_or(&Value::Null)
    }

    fn numbers(items: &[Value]) -> Vec<f64> {
        items.iter().filter_map(as_f64).collect()
    }
}

impl BrickMeta for TransformData {
    fn name(&self) -> &str {
        "Transform Data"
    }

    fn description(&self) -> &str {
        "Applies a transformation to an array (pluck, filter, sort, aggregate, ...)"
    }

    fn category(&self) -> &str {
        "Data"
    }
}

#[async_trait]
impl ActionBrick for TransformData {
    async fn handle(&self, ctx: &mut FlowContext) -> Result<(), BrickError> {
        let source_path = self.config.require_str("source")?;
        let operation = self.config.str_or("operation", "pluck");
        let field = self.config.str_or("field", "");
        let filter_value = self.config.get("value").cloned().unwrap_or(Value::Null);
        let amount = self.config.u64_or("amount", 10) as usize;
        let store_as = self.config.str_or("store_as", "transformed_data");

        let source = ctx.get(&source_path).cloned().unwrap_or(Value::Null);

        // Key/value operations act on the container itself.
        let result = match operation.as_str() {
            "keys" => match &source {
                Value::Object(map) => {
                    Value::Array(map.keys().cloned().map(Value::String).collect())
                }
                Value::Array(items) => {
                    Value::Array((0..items.len()).map(|i| Value::Number(i.into())).collect())
                }
                _ => {
                    return Err(BrickError::failed(format!(
                        "source '{source_path}' is not a collection"
                    )));
                }
            },
            op => {
                let mut items = Self::items(&source).ok_or_else(|| {
                    BrickError::failed(format!("source '{source_path}' is not a collection"))
                })?;
                match op {
                    "pluck" => Value::Array(
                        items
                            .iter()
                            .map(|item| Self::item_field(item, &field).clone())
                            .collect(),
                    ),
                    "filter_not_empty" => {
                        items.retain(|item| !is_empty_value(item));
                        Value::Array(items)
                    }
                    "filter_by_field" => {
                        items.retain(|item| loose_eq(Self::item_field(item, &field), &filter_value));
                        Value::Array(items)
                    }
                    "sort_asc" => {
                        items.sort_by(compare_values);
                        Value::Array(items)
                    }
                    "sort_desc" => {
                        items.sort_by(|a, b| compare_values(b, a));
                        Value::Array(items)
                    }
                    "sort_by_field" => {
                        items.sort_by(|a, b| {
                            compare_values(Self::item_field(a, &field), Self::item_field(b, &field))
                        });
                        Value::Array(items)
                    }
                    "unique" => {
                        let mut seen: Vec<Value> = Vec::with_capacity(items.len());
                        for item in items {
                            if !seen.contains(&item) {
                                seen.push(item);
                            }
                        }
                        Value::Array(seen)
                    }
                    "flatten" => Value::Array(
                        items
                            .into_iter()
                            .flat_map(|item| match item {
                                Value::Array(inner) => inner,
                                other => vec![other],
                            })
                            .collect(),
                    ),
                    "reverse" => {
                        items.reverse();
                        Value::Array(items)
                    }
                    "take" => Value::Array(items.into_iter().take(amount).collect()),
                    "skip" => Value::Array(items.into_iter().skip(amount).collect()),
                    "count" => Value::Number(items.len().into()),
                    "sum" => {
                        let sum: f64 = Self::numbers(&items).iter().sum();
                        serde_json::Number::from_f64(sum).map_or(Value::Null, Value::Number)
                    }
                    "avg" => {
                        let numbers = Self::numbers(&items);
                        if numbers.is_empty() {
                            Value::Null
                        } else {
                            let avg = numbers.iter().sum::<f64>() / numbers.len() as f64;
                            serde_json::Number::from_f64(avg).map_or(Value::Null, Value::Number)
                        }
                    }
                    "min" => Self::numbers(&items)
                        .into_iter()
                        .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
                        .and_then(serde_json::Number::from_f64)
                        .map_or(Value::Null, Value::Number),
                    "max" => Self::numbers(&items)
                        .into_iter()
                        .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
                        .and_then(serde_json::Number::from_f64)
                        .map_or(Value::Null, Value::Number),
                    "first" => items.into_iter().next().unwrap_or(Value::Null),
                    "last" => items.into_iter().next_back().unwrap_or(Value::Null),
                    "values" => Value::Array(items),
                    "implode" => {
                        let separator = match &filter_value {
                            Value::String(s) if !s.is_empty() => s.clone(),
                            _ => ", ".to_string(),
                        };
                        Value::String(
                            items
                                .iter()
                                .map(value_to_string)
                                .collect::<Vec<_>>()
                                .join(&separator),
                        )
                    }
                    other => {
                        return Err(BrickError::invalid_config(format!(
                            "unknown operation '{other}'"
                        )));
                    }
                }
            }
        };

        ctx.set(&store_as, result);
        Ok(())
    }
}

/// Make an HTTP request, optionally storing `{status, body}` in a variable.
#[cfg(feature = "http")]
pub struct CallWebhook {
    config: BrickConfig,
}

#[cfg(feature = "http")]
impl CallWebhook {
    #[must_use]
    pub fn new(config: Value) -> Self {
        Self {
            config: BrickConfig::new(config),
        }
    }
}

#[cfg(feature = "http")]
impl BrickMeta for CallWebhook {
    fn name(&self) -> &str {
        "Call Webhook"
    }

    fn description(&self) -> &str {
        "Sends an HTTP request to an external endpoint"
    }

    fn category(&self) -> &str {
        "Integration"
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl ActionBrick for CallWebhook {
    async fn handle(&self, ctx: &mut FlowContext) -> Result<(), BrickError> {
        let url = self.config.require_str("url")?;
        let method_name = self.config.str_or("method", "GET").to_uppercase();
        let method = reqwest::Method::from_bytes(method_name.as_bytes())
            .map_err(|_| BrickError::invalid_config(format!("invalid method '{method_name}'")))?;
        let timeout = std::time::Duration::from_secs(self.config.u64_or("timeout", 30));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BrickError::failed(e.to_string()))?;

        let mut request = client.request(method.clone(), url.as_str());
        if let Some(Value::Object(headers)) = self.config.get("headers") {
            for (key, value) in headers {
                request = request.header(key.as_str(), value_to_string(value));
            }
        }
        if !matches!(method, reqwest::Method::GET | reqwest::Method::HEAD) {
            if let Some(body) = self.config.get("body") {
                request = if self.config.str_or("body_format", "json") == "form" {
                    let form: serde_json::Map<String, Value> =
                        body.as_object().cloned().unwrap_or_default();
                    let form: std::collections::HashMap<String, String> = form
                        .into_iter()
                        .map(|(k, v)| (k, value_to_string(&v)))
                        .collect();
                    request.form(&form)
                } else {
                    request.json(body)
                };
            }
        }

        let response = request
            .send()
            .await
            .map_err(|e| BrickError::failed(format!("request to {url} failed: {e}")))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| BrickError::failed(e.to_string()))?;
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::String(text));

        ctx.info(format!("Webhook {method_name} {url} -> {status}"));
        if let Some(store) = self.config.str("store_response") {
            let store = store.to_string();
            ctx.set(
                &store,
                serde_json::json!({"status": status, "body": body}),
            );
        }
        Ok(())
    }
}
