//! Signal module: identities and values carried between combinators.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use std::fmt;

/// The category a signal belongs to.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalType {
    /// An item signal (e.g. a count of plates).
    Item,
    /// A fluid signal.
    Fluid,
    /// A virtual signal with no physical counterpart.
    Virtual,
}

/// Identity of a named signal channel.
///
/// Merging and lookups key on `name` alone; `signal_type` travels along as metadata
/// of whichever occurrence was seen first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalId {
    /// Category of the signal.
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    /// Channel name.
    pub name: String,
}

impl SignalId {
    /// Create an identity of the given category.
    pub fn new(signal_type: SignalType, name: impl Into<String>) -> Self {
        Self {
            signal_type,
            name: name.into(),
        }
    }

    /// Create a virtual signal identity.
    pub fn virtual_signal(name: impl Into<String>) -> Self {
        Self::new(SignalType::Virtual, name)
    }

    /// Create an item signal identity.
    pub fn item(name: impl Into<String>) -> Self {
        Self::new(SignalType::Item, name)
    }

    /// Create a fluid signal identity.
    pub fn fluid(name: impl Into<String>) -> Self {
        Self::new(SignalType::Fluid, name)
    }

    /// True if both identities share the merge key.
    pub fn same_channel(&self, other: &SignalId) -> bool {
        self.name == other.name
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}:{}", self.signal_type, self.name)
    }
}

/// A single quantity contribution on a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    /// Which channel this value is on.
    #[serde(rename = "signal")]
    pub id: SignalId,
    /// The value.
    #[serde(rename = "count")]
    pub value: i32,
}

impl Signal {
    /// Create a signal.
    pub fn new(id: SignalId, value: i32) -> Self {
        Self { id, value }
    }
}

/// An ordered signal sequence; unique by name and free of zeros once produced by
/// the aggregator or a combinator.
pub type SignalSet = Vec<Signal>;

/// Value on the channel named like `id`, or 0 when absent.
pub fn lookup(signals: &[Signal], id: &SignalId) -> i32 {
    signals
        .iter()
        .find(|s| s.id.same_channel(id))
        .map(|s| s.value)
        .unwrap_or(0)
}

/// Drop every zero-valued entry, preserving order.
pub fn strip_zeros(mut signals: SignalSet) -> SignalSet {
    signals.retain(|s| s.value != 0);
    signals
}
