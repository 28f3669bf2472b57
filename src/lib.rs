//! Deterministic simulation of decider combinator networks.
//!
//! Raw sources and decider combinators live in a [`graph::Network`] and are
//! wired by [`graph::NodeId`]. Each step runs two passes over the network:
//! every combinator first *advances* against its inputs' committed output,
//! then every combinator *commits*. No combinator ever sees another's
//! uncommitted result, so feedback loops only add one step of latency.

pub mod aggregate;
pub mod blueprint;
pub mod control;
pub mod decider;
pub mod dsl;
pub mod graph;
#[doc(hidden)]
pub mod harness;
#[doc(hidden)]
pub mod invariant_ppt;
pub mod runtime;
pub mod signal;
pub mod source;

pub use decider::{Comparator, ConfigError, DeciderCombinator, DeciderConfig, DeciderState, Operand};
pub use graph::{Network, NetworkError, NodeId};
pub use signal::{Signal, SignalId, SignalSet, SignalType};
pub use source::{ConstantSource, Source};
