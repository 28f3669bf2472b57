//! Step harness: records every node's committed output step by step.

use crate::graph::{Network, NetworkError, NodeId};
use crate::signal::{Signal, SignalSet};
use std::collections::BTreeMap;

/// Committed outputs per step, keyed by node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trace {
    steps: Vec<BTreeMap<NodeId, SignalSet>>,
}

impl Trace {
    /// Number of recorded steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Output of `node` after step `step` (0-based).
    pub fn at(&self, step: usize, node: NodeId) -> Option<&[Signal]> {
        self.steps.get(step)?.get(&node).map(Vec::as_slice)
    }
}

/// Harness for stepping a network with an optional custom pass order.
pub struct StepHarness {
    network: Network,
    advance_order: Option<Vec<NodeId>>,
    commit_order: Option<Vec<NodeId>>,
}

impl StepHarness {
    /// Create harness from network.
    pub fn new(network: Network) -> Self {
        Self {
            network,
            advance_order: None,
            commit_order: None,
        }
    }

    /// Use explicit per-pass orders instead of ascending node id.
    pub fn with_order(mut self, advance_order: Vec<NodeId>, commit_order: Vec<NodeId>) -> Self {
        self.advance_order = Some(advance_order);
        self.commit_order = Some(commit_order);
        self
    }

    /// Borrow the network, e.g. to edit sources between runs.
    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    /// Run `steps` steps and record every node after each.
    pub fn run(&mut self, steps: usize) -> Result<Trace, NetworkError> {
        let mut trace = Trace::default();
        for _ in 0..steps {
            match (&self.advance_order, &self.commit_order) {
                (Some(advance), Some(commit)) => self.network.step_in_order(advance, commit)?,
                _ => self.network.step(),
            }
            trace.steps.push(self.snapshot());
        }
        Ok(trace)
    }

    fn snapshot(&self) -> BTreeMap<NodeId, SignalSet> {
        self.network
            .nodes
            .iter()
            .flatten()
            .map(|n| (n.id, n.node_type.signals().to_vec()))
            .collect()
    }
}
