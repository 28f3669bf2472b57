//! Control message types for owner → runtime communication.
//!
//! Wiring and configuration edits are queued on a lock-free SPSC queue and
//! applied by [`crate::runtime::Runtime`] between steps, never between the
//! advance pass and the commit pass of a step.

use crate::decider::{Comparator, DeciderConfig, Operand};
use crate::graph::{Network, NetworkError, NodeId};
use crate::signal::SignalSet;
use rtrb::{Consumer, Producer, PushError, RingBuffer};

/// Capacity for control message queue.
pub const CONTROL_QUEUE_CAPACITY: usize = 256;

/// Creates a new control message queue pair.
///
/// Returns (producer for the owner, consumer for the runtime).
pub fn new_control_queue() -> (Producer<ControlMsg>, Consumer<ControlMsg>) {
    RingBuffer::new(CONTROL_QUEUE_CAPACITY)
}

/// Control messages sent from the owning context to the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlMsg {
    /// Replace a combinator's whole configuration.
    SetConfig {
        node: NodeId,
        config: DeciderConfig,
    },

    /// Remove a combinator's configuration (it becomes uninitialized).
    ClearConfig { node: NodeId },

    /// Set or unset the left operand.
    SetLeft {
        node: NodeId,
        operand: Option<Operand>,
    },

    /// Set or unset the comparator.
    SetComparator {
        node: NodeId,
        comparator: Option<Comparator>,
    },

    /// Set or unset the right operand.
    SetRight {
        node: NodeId,
        operand: Option<Operand>,
    },

    /// Set or unset the output selector.
    SetOutput {
        node: NodeId,
        operand: Option<Operand>,
    },

    /// Set or unset the copy-count flag.
    SetCopyCount { node: NodeId, copy: Option<bool> },

    /// Replace a constant source's signals.
    SetSignals { node: NodeId, signals: SignalSet },

    /// Wire `from` into the combinator `to`.
    Connect { from: NodeId, to: NodeId },

    /// Remove the wire from `from` into `to`.
    Disconnect { from: NodeId, to: NodeId },
}

impl ControlMsg {
    /// Returns the node this message edits.
    pub fn target_node(&self) -> NodeId {
        match self {
            ControlMsg::SetConfig { node, .. } => *node,
            ControlMsg::ClearConfig { node } => *node,
            ControlMsg::SetLeft { node, .. } => *node,
            ControlMsg::SetComparator { node, .. } => *node,
            ControlMsg::SetRight { node, .. } => *node,
            ControlMsg::SetOutput { node, .. } => *node,
            ControlMsg::SetCopyCount { node, .. } => *node,
            ControlMsg::SetSignals { node, .. } => *node,
            ControlMsg::Connect { to, .. } => *to,
            ControlMsg::Disconnect { to, .. } => *to,
        }
    }

    /// Returns a human-readable description (for debugging).
    pub fn description(&self) -> &'static str {
        match self {
            ControlMsg::SetConfig { .. } => "SetConfig",
            ControlMsg::ClearConfig { .. } => "ClearConfig",
            ControlMsg::SetLeft { .. } => "SetLeft",
            ControlMsg::SetComparator { .. } => "SetComparator",
            ControlMsg::SetRight { .. } => "SetRight",
            ControlMsg::SetOutput { .. } => "SetOutput",
            ControlMsg::SetCopyCount { .. } => "SetCopyCount",
            ControlMsg::SetSignals { .. } => "SetSignals",
            ControlMsg::Connect { .. } => "Connect",
            ControlMsg::Disconnect { .. } => "Disconnect",
        }
    }

    /// Apply this edit to a network.
    pub fn apply(self, network: &mut Network) -> Result<(), NetworkError> {
        match self {
            ControlMsg::SetConfig { node, config } => network.decider_mut(node)?.set_config(config),
            ControlMsg::ClearConfig { node } => {
                network.decider_mut(node)?.clear_config();
            }
            ControlMsg::SetLeft { node, operand } => {
                network.decider_mut(node)?.config_mut().condition.left = operand
            }
            ControlMsg::SetComparator { node, comparator } => {
                network.decider_mut(node)?.config_mut().condition.comparator = comparator
            }
            ControlMsg::SetRight { node, operand } => {
                network.decider_mut(node)?.config_mut().condition.right = operand
            }
            ControlMsg::SetOutput { node, operand } => {
                network.decider_mut(node)?.config_mut().output = operand
            }
            ControlMsg::SetCopyCount { node, copy } => {
                network.decider_mut(node)?.config_mut().copy_count_from_input = copy
            }
            ControlMsg::SetSignals { node, signals } => {
                network.constant_mut(node)?.set_signals(signals)
            }
            ControlMsg::Connect { from, to } => network.connect(from, to)?,
            ControlMsg::Disconnect { from, to } => network.disconnect(from, to)?,
        }
        Ok(())
    }
}

/// Errors when queueing control messages.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("control queue is full")]
    QueueFull(ControlMsg),
}

/// Owner-side handle for queueing edits.
pub struct ControlHandle {
    tx: Producer<ControlMsg>,
}

impl ControlHandle {
    pub(crate) fn new(tx: Producer<ControlMsg>) -> Self {
        Self { tx }
    }

    /// Queue an edit for the next step boundary.
    pub fn send(&mut self, msg: ControlMsg) -> Result<(), ControlError> {
        self.tx.push(msg).map_err(|err| match err {
            PushError::Full(msg) => ControlError::QueueFull(msg),
        })
    }

    /// Free slots left in the queue.
    pub fn capacity_left(&self) -> usize {
        self.tx.slots()
    }
}
