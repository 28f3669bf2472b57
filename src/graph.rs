//! Graph module: an arena of sources and combinators wired by stable handles.
//!
//! Nodes never own each other. A combinator lists the [`NodeId`]s it reads from,
//! so feedback loops (including a combinator wired to itself) are plain data and
//! never form ownership cycles.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use crate::aggregate::aggregate;
use crate::decider::{DeciderCombinator, DeciderConfig};
use crate::invariant_ppt::{assert_invariant, CONNECTIONS_UNIQUE, STEP_TWO_PASS};
use crate::signal::{Signal, SignalSet};
use crate::source::{ConstantSource, Source};

/// Unique identifier for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Kinds of nodes in a network.
#[non_exhaustive]
pub enum NodeType {
    /// Raw provider with values set by the owner.
    Constant(ConstantSource),
    /// Raw provider implemented outside this crate.
    External(Box<dyn Source>),
    /// Decider combinator.
    Decider(DeciderCombinator),
}

impl std::fmt::Debug for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeType::Constant(_) => write!(f, "Constant"),
            NodeType::External(_) => write!(f, "External"),
            NodeType::Decider(_) => write!(f, "Decider"),
        }
    }
}

impl NodeType {
    /// The node's published output.
    pub fn signals(&self) -> &[Signal] {
        match self {
            NodeType::Constant(src) => src.signals(),
            NodeType::External(src) => src.signals(),
            NodeType::Decider(dc) => dc.signals(),
        }
    }
}

/// A node in the network.
#[derive(Debug)]
pub struct NodeData {
    /// The unique ID of this node.
    pub id: NodeId,
    /// The type of this node.
    pub node_type: NodeType,
}

/// Errors from wiring and node access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// Node does not exist or was removed.
    #[error("node {0:?} does not exist")]
    InvalidNode(NodeId),
    /// Operation needs a decider combinator.
    #[error("node {0:?} is not a decider combinator")]
    NotADecider(NodeId),
    /// Operation needs a constant source.
    #[error("node {0:?} is not a constant source")]
    NotAConstant(NodeId),
    /// The connection already exists.
    #[error("node {from:?} is already wired into {to:?}")]
    AlreadyConnected {
        /// Upstream node.
        from: NodeId,
        /// Downstream combinator.
        to: NodeId,
    },
    /// The connection does not exist.
    #[error("node {from:?} is not wired into {to:?}")]
    NotConnected {
        /// Upstream node.
        from: NodeId,
        /// Downstream combinator.
        to: NodeId,
    },
}

/// The network: nodes addressed by [`NodeId`], possibly cyclic.
#[derive(Debug, Default)]
pub struct Network {
    /// All nodes in the network (None for removed nodes).
    pub nodes: Vec<Option<NodeData>>,
}

impl Network {
    /// Create a new empty network.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Add a node.
    pub fn add_node(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(NodeData { id, node_type }));
        id
    }

    /// Add a raw provider publishing `signals`.
    pub fn add_constant(&mut self, signals: SignalSet) -> NodeId {
        self.add_node(NodeType::Constant(ConstantSource::new(signals)))
    }

    /// Add an externally implemented source.
    pub fn add_external<S: Source + 'static>(&mut self, source: S) -> NodeId {
        self.add_node(NodeType::External(Box::new(source)))
    }

    /// Add an unconfigured decider combinator.
    pub fn add_decider(&mut self) -> NodeId {
        self.add_node(NodeType::Decider(DeciderCombinator::new()))
    }

    /// Add a decider combinator with a configuration.
    pub fn add_decider_with(&mut self, config: DeciderConfig) -> NodeId {
        self.add_node(NodeType::Decider(DeciderCombinator::with_config(config)))
    }

    /// Live node ids in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().flatten().map(|n| n.id)
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Result<&NodeData, NetworkError> {
        self.nodes
            .get(id.0)
            .and_then(|n| n.as_ref())
            .ok_or(NetworkError::InvalidNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData, NetworkError> {
        self.nodes
            .get_mut(id.0)
            .and_then(|n| n.as_mut())
            .ok_or(NetworkError::InvalidNode(id))
    }

    /// Borrow a decider combinator.
    pub fn decider(&self, id: NodeId) -> Result<&DeciderCombinator, NetworkError> {
        match &self.node(id)?.node_type {
            NodeType::Decider(dc) => Ok(dc),
            _ => Err(NetworkError::NotADecider(id)),
        }
    }

    /// Mutably borrow a decider combinator.
    pub fn decider_mut(&mut self, id: NodeId) -> Result<&mut DeciderCombinator, NetworkError> {
        match &mut self.node_mut(id)?.node_type {
            NodeType::Decider(dc) => Ok(dc),
            _ => Err(NetworkError::NotADecider(id)),
        }
    }

    /// Mutably borrow a constant source.
    pub fn constant_mut(&mut self, id: NodeId) -> Result<&mut ConstantSource, NetworkError> {
        match &mut self.node_mut(id)?.node_type {
            NodeType::Constant(src) => Ok(src),
            _ => Err(NetworkError::NotAConstant(id)),
        }
    }

    /// Published output of a node.
    pub fn signals(&self, id: NodeId) -> Result<&[Signal], NetworkError> {
        Ok(self.node(id)?.node_type.signals())
    }

    /// Wire `from`'s output into the combinator `to`. Cycles are allowed.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), NetworkError> {
        self.node(from)?;
        let connections = self.decider_mut(to)?.connections_mut();
        if connections.contains(&from) {
            return Err(NetworkError::AlreadyConnected { from, to });
        }
        connections.push(from);
        assert_invariant(
            CONNECTIONS_UNIQUE,
            connections.iter().filter(|&&c| c == from).count() == 1,
            "Upstream wired twice into one combinator",
            Some("connect"),
        );
        Ok(())
    }

    /// Remove the wire from `from` into `to`.
    pub fn disconnect(&mut self, from: NodeId, to: NodeId) -> Result<(), NetworkError> {
        let connections = self.decider_mut(to)?.connections_mut();
        let before = connections.len();
        connections.retain(|&c| c != from);
        if connections.len() == before {
            return Err(NetworkError::NotConnected { from, to });
        }
        Ok(())
    }

    /// Remove a node and every wire reading from it.
    pub fn remove_node(&mut self, node_id: NodeId) -> Result<(), NetworkError> {
        self.node(node_id)?;
        self.nodes[node_id.0] = None;
        for node in self.nodes.iter_mut().flatten() {
            if let NodeType::Decider(dc) = &mut node.node_type {
                dc.connections_mut().retain(|&c| c != node_id);
            }
        }
        Ok(())
    }

    /// Aggregated committed output of everything wired into `id`.
    pub fn input_of(&self, id: NodeId) -> Result<SignalSet, NetworkError> {
        let dc = self.decider(id)?;
        let upstream = dc
            .connections()
            .iter()
            .filter_map(|&c| self.node(c).ok())
            .map(|n| n.node_type.signals());
        Ok(aggregate(upstream))
    }

    /// Advance one combinator against the current committed state of its inputs.
    pub fn advance(&mut self, id: NodeId) -> Result<(), NetworkError> {
        let input = self.input_of(id)?;
        self.decider_mut(id)?.advance(&input);
        log::trace!("advanced {:?} on {} input signals", id, input.len());
        Ok(())
    }

    /// Publish one combinator's staged output.
    pub fn commit(&mut self, id: NodeId) -> Result<(), NetworkError> {
        self.decider_mut(id)?.commit();
        log::trace!("committed {:?}", id);
        Ok(())
    }

    fn decider_ids(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .flatten()
            .filter(|n| matches!(n.node_type, NodeType::Decider(_)))
            .map(|n| n.id)
            .collect()
    }

    /// Advance every combinator against the committed state before the pass.
    pub fn advance_all(&mut self) {
        let ids = self.decider_ids();
        self.advance_pass(&ids);
    }

    /// Commit every combinator.
    pub fn commit_all(&mut self) {
        let ids = self.decider_ids();
        self.commit_pass(&ids);
    }

    /// One discrete step: every combinator advances, then every combinator commits.
    pub fn step(&mut self) {
        let ids = self.decider_ids();
        self.advance_pass(&ids);
        self.commit_pass(&ids);
    }

    /// One step with explicit per-pass orders.
    ///
    /// Each order must name every live combinator exactly once; the result does
    /// not depend on the orders chosen.
    pub fn step_in_order(
        &mut self,
        advance_order: &[NodeId],
        commit_order: &[NodeId],
    ) -> Result<(), NetworkError> {
        for &id in advance_order.iter().chain(commit_order) {
            self.decider(id)?;
        }
        self.advance_pass(advance_order);
        self.commit_pass(commit_order);
        Ok(())
    }

    // Callers pass ids already checked to be live deciders.
    fn advance_pass(&mut self, order: &[NodeId]) {
        // All inputs are gathered before any combinator stages output, so no
        // advance can observe another's pending buffer.
        let inputs: Vec<(NodeId, SignalSet)> = order
            .iter()
            .filter_map(|&id| self.input_of(id).ok().map(|input| (id, input)))
            .collect();
        let published: Vec<SignalSet> = inputs
            .iter()
            .filter_map(|(id, _)| self.signals(*id).ok().map(<[Signal]>::to_vec))
            .collect();
        for (id, input) in &inputs {
            if let Ok(dc) = self.decider_mut(*id) {
                dc.advance(input);
            }
        }
        assert_invariant(
            STEP_TWO_PASS,
            inputs
                .iter()
                .zip(&published)
                .all(|((id, _), before)| self.signals(*id).map_or(false, |now| now == before.as_slice())),
            "Advance pass changed published output",
            Some("step"),
        );
    }

    fn commit_pass(&mut self, order: &[NodeId]) {
        for &id in order {
            if let Ok(dc) = self.decider_mut(id) {
                dc.commit();
            }
        }
        log::trace!("committed {} combinators", order.len());
    }
}
