//! Built-in triggers.
//!
//! Triggers own the listener side of a flow: they are registered once per
//! active flow by the [`TriggerManager`](crate::trigger_manager::TriggerManager)
//! and report firings over their binding. During a run the runner treats a
//! trigger node as a plain entry point and fans out unconditionally.

use serde_json::Value;

use crate::bricks::{BrickConfig, BrickError, BrickMeta, TriggerBinding, TriggerBrick};
use crate::registry::BrickRegistry;

pub(super) fn register(registry: &mut BrickRegistry) {
    registry.register_trigger("manual", |config| Box::new(ManualTrigger::new(config)));
    registry.register_trigger("webhook", |config| Box::new(WebhookTrigger::new(config)));
    registry.register_trigger("event", |config| Box::new(EventTrigger::new(config)));
}

/// Trigger for flows started explicitly by the embedding application.
///
/// Registration is a no-op; the host calls the runner directly.
pub struct ManualTrigger;

impl ManualTrigger {
    #[must_use]
    pub fn new(_config: Value) -> Self {
        Self
    }
}

impl BrickMeta for ManualTrigger {
    fn name(&self) -> &str {
        "Manual"
    }

    fn description(&self) -> &str {
        "Starts the flow when invoked explicitly"
    }

    fn category(&self) -> &str {
        "Triggers"
    }
}

impl TriggerBrick for ManualTrigger {
    fn register(&mut self, _binding: TriggerBinding) -> Result<(), BrickError> {
        Ok(())
    }
}

/// Trigger fired when the host receives an HTTP call on a configured path.
///
/// Serving HTTP is the host's concern; this brick only records the binding
/// and exposes [`fire`](Self::fire) for the host's webhook handler.
pub struct WebhookTrigger {
    path: String,
    binding: Option<TriggerBinding>,
}

impl WebhookTrigger {
    #[must_use]
    pub fn new(config: Value) -> Self {
        let config = BrickConfig::new(config);
        Self {
            path: config.str_or("path", "/"),
            binding: None,
        }
    }

    /// The configured webhook path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Report an incoming webhook payload.
    pub fn fire(&self, payload: Value) {
        if let Some(binding) = &self.binding {
            binding.dispatch(self.name(), payload);
        }
    }
}

impl BrickMeta for WebhookTrigger {
    fn name(&self) -> &str {
        "On Webhook Received"
    }

    fn description(&self) -> &str {
        "Starts the flow when a webhook arrives on the configured path"
    }

    fn category(&self) -> &str {
        "Triggers"
    }
}

impl TriggerBrick for WebhookTrigger {
    fn register(&mut self, binding: TriggerBinding) -> Result<(), BrickError> {
        tracing::debug!(flow_id = %binding.flow_id(), path = %self.path, "webhook trigger registered");
        self.binding = Some(binding);
        Ok(())
    }

    fn unregister(&mut self) {
        self.binding = None;
    }
}

/// Trigger fired when a named application event is dispatched.
pub struct EventTrigger {
    event: String,
    binding: Option<TriggerBinding>,
}

impl EventTrigger {
    #[must_use]
    pub fn new(config: Value) -> Self {
        let config = BrickConfig::new(config);
        Self {
            event: config.str_or("event", ""),
            binding: None,
        }
    }

    /// The event name this trigger listens for.
    #[must_use]
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Report a dispatched event, firing only on a matching name.
    pub fn fire(&self, event: &str, payload: Value) {
        if event != self.event {
            return;
        }
        if let Some(binding) = &self.binding {
            binding.dispatch(self.name(), payload);
        }
    }
}

impl BrickMeta for EventTrigger {
    fn name(&self) -> &str {
        "On Event Dispatched"
    }

    fn description(&self) -> &str {
        "Starts the flow when the configured application event fires"
    }

    fn category(&self) -> &str {
        "Triggers"
    }
}

impl TriggerBrick for EventTrigger {
    fn register(&mut self, binding: TriggerBinding) -> Result<(), BrickError> {
        if self.event.is_empty() {
            return Err(BrickError::invalid_config("missing field 'event'"));
        }
        self.binding = Some(binding);
        Ok(())
    }

    fn unregister(&mut self) {
        self.binding = None;
    }
}
