//! Process-wide lifecycle management for live trigger listeners.
//!
//! Separate from the traversal core: at startup (and whenever a flow is
//! activated, deactivated, or edited) the [`TriggerManager`] registers the
//! trigger brick of each active flow so external stimuli can start runs.
//! Fired triggers are reported as [`TriggerFired`] records on a channel; a
//! consumer (queue worker, event loop) drains it and invokes the runner —
//! queue dispatch itself stays out of scope.
//!
//! # Examples
//!
//! ```rust
//! use brickflow::registry::BrickRegistry;
//! use brickflow::trigger_manager::TriggerManager;
//! use std::sync::Arc;
//!
//! let mut manager = TriggerManager::new(Arc::new(BrickRegistry::with_builtins()));
//! let firings = manager.take_receiver().expect("receiver available once");
//! # let _ = firings;
//! ```

use rustc_hash::FxHashMap;
use std::sync::Arc;

use crate::bricks::{BrickInstance, TriggerBinding, TriggerBrick, TriggerFired};
use crate::graph::FlowGraph;
use crate::registry::BrickRegistry;

/// Registry-backed bookkeeping of live trigger bricks, keyed by flow id.
pub struct TriggerManager {
    registry: Arc<BrickRegistry>,
    registered: FxHashMap<String, Box<dyn TriggerBrick>>,
    sender: flume::Sender<TriggerFired>,
    receiver: Option<flume::Receiver<TriggerFired>>,
}

impl TriggerManager {
    #[must_use]
    pub fn new(registry: Arc<BrickRegistry>) -> Self {
        let (sender, receiver) = flume::unbounded();
        Self {
            registry,
            registered: FxHashMap::default(),
            sender,
            receiver: Some(receiver),
        }
    }

    /// Take the firing channel's receiver. Available exactly once.
    pub fn take_receiver(&mut self) -> Option<flume::Receiver<TriggerFired>> {
        self.receiver.take()
    }

    /// Register triggers for every active flow.
    pub fn boot_active_flows<'a>(&mut self, flows: impl IntoIterator<Item = &'a FlowGraph>) {
        let mut booted = 0usize;
        for flow in flows {
            if flow.active() {
                self.register_flow(flow);
                booted += 1;
            }
        }
        tracing::debug!(booted, "booted active flows");
    }

    /// Register the trigger for a specific flow.
    ///
    /// Flows without a trigger node, with an unknown trigger brick, or whose
    /// registration fails are logged and skipped — one broken flow must not
    /// keep the rest from booting.
    pub fn register_flow(&mut self, flow: &FlowGraph) {
        let Some(node) = flow.trigger_nodes().first().copied() else {
            tracing::warn!(flow_id = %flow.id(), "flow has no trigger node");
            return;
        };
        if node.brick.is_empty() {
            tracing::warn!(flow_id = %flow.id(), node_id = %node.id, "trigger node has no brick reference");
            return;
        }

        let resolved = self
            .registry
            .resolve(node.kind, &node.brick, node.config.clone());
        let mut trigger = match resolved {
            Ok(BrickInstance::Trigger(trigger)) => trigger,
            Ok(_) => {
                tracing::warn!(flow_id = %flow.id(), brick = %node.brick, "brick is not a trigger");
                return;
            }
            Err(err) => {
                tracing::error!(flow_id = %flow.id(), error = %err, "failed to resolve trigger");
                return;
            }
        };

        let binding = TriggerBinding::new(flow.id(), self.sender.clone());
        if let Err(err) = trigger.register(binding) {
            tracing::error!(flow_id = %flow.id(), error = %err, "failed to register trigger");
            return;
        }

        tracing::info!(flow_id = %flow.id(), trigger = %trigger.name(), "registered trigger");
        self.registered.insert(flow.id().to_string(), trigger);
    }

    /// Unregister the trigger for a flow, if one is registered.
    pub fn unregister_flow(&mut self, flow_id: &str) {
        if let Some(mut trigger) = self.registered.remove(flow_id) {
            trigger.unregister();
            tracing::info!(flow_id = %flow_id, "unregistered trigger");
        }
    }

    /// Re-register a flow's trigger (unregister, then register when active).
    pub fn refresh_flow(&mut self, flow: &FlowGraph) {
        self.unregister_flow(flow.id());
        if flow.active() {
            self.register_flow(flow);
        }
    }

    /// Whether a flow currently has a registered trigger.
    #[must_use]
    pub fn is_registered(&self, flow_id: &str) -> bool {
        self.registered.contains_key(flow_id)
    }

    /// Flow ids with registered triggers, sorted for stable output.
    #[must_use]
    pub fn registered_flows(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.registered.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
