//! DSL module: builder API for networks.

use crate::decider::DeciderConfig;
use crate::graph::{Network, NetworkError, NodeId};
use crate::signal::SignalSet;
use std::collections::HashMap;

/// Handle to a node in the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHandle(pub NodeId);

/// The network builder.
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    network: Network,
    node_names: HashMap<String, NodeId>,
}

impl NetworkBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an anonymous raw provider.
    pub fn constant(&mut self, signals: SignalSet) -> NodeHandle {
        NodeHandle(self.network.add_constant(signals))
    }

    /// Add an anonymous combinator; `None` leaves it unconfigured.
    pub fn decider(&mut self, config: Option<DeciderConfig>) -> NodeHandle {
        let id = match config {
            Some(config) => self.network.add_decider_with(config),
            None => self.network.add_decider(),
        };
        NodeHandle(id)
    }

    /// Add a named raw provider.
    pub fn constant_named(&mut self, name: &str, signals: SignalSet) -> Result<NodeHandle, DslError> {
        self.reserve(name)?;
        let handle = self.constant(signals);
        self.node_names.insert(name.to_string(), handle.0);
        Ok(handle)
    }

    /// Add a named combinator.
    pub fn decider_named(
        &mut self,
        name: &str,
        config: Option<DeciderConfig>,
    ) -> Result<NodeHandle, DslError> {
        self.reserve(name)?;
        let handle = self.decider(config);
        self.node_names.insert(name.to_string(), handle.0);
        Ok(handle)
    }

    fn reserve(&self, name: &str) -> Result<(), DslError> {
        if self.node_names.contains_key(name) {
            return Err(DslError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    /// Look up a named node.
    pub fn handle(&self, name: &str) -> Result<NodeHandle, DslError> {
        self.node_names
            .get(name)
            .map(|&id| NodeHandle(id))
            .ok_or_else(|| DslError::MissingNode(name.to_string()))
    }

    /// Wire `from` into the combinator `to`.
    pub fn connect(&mut self, from: NodeHandle, to: NodeHandle) -> Result<(), DslError> {
        self.network.connect(from.0, to.0)?;
        Ok(())
    }

    /// Wire two named nodes.
    pub fn connect_named(&mut self, from: &str, to: &str) -> Result<(), DslError> {
        let from = self.handle(from)?;
        let to = self.handle(to)?;
        self.connect(from, to)
    }

    /// Build the network.
    pub fn build(self) -> Network {
        self.network
    }
}

/// DSL-specific errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DslError {
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error("no node named '{0}'")]
    MissingNode(String),
    #[error("a node named '{0}' already exists")]
    DuplicateName(String),
}
