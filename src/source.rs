//! Source capability: anything that publishes a current committed signal set.

#![forbid(unsafe_code)]

use crate::signal::{Signal, SignalSet};

/// Read-only contract shared by raw providers and combinators.
///
/// Implementors return their *committed* output; anything computed but not yet
/// published must stay invisible through this method.
pub trait Source {
    fn signals(&self) -> &[Signal];
}

impl Source for Vec<Signal> {
    fn signals(&self) -> &[Signal] {
        self
    }
}

/// Raw provider whose signals are set directly by the owning context.
///
/// Values are published as given, zeros and repeated names included; the
/// aggregator in the consuming combinator normalizes them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantSource {
    signals: SignalSet,
}

impl ConstantSource {
    /// Create a provider publishing `signals`.
    pub fn new(signals: SignalSet) -> Self {
        Self { signals }
    }

    /// Replace the published signals.
    pub fn set_signals(&mut self, signals: SignalSet) {
        self.signals = signals;
    }

    /// Set one channel's value, appending it when absent.
    pub fn set_value(&mut self, signal: Signal) {
        match self.signals.iter_mut().find(|s| s.id.same_channel(&signal.id)) {
            Some(existing) => existing.value = signal.value,
            None => self.signals.push(signal),
        }
    }
}

impl Source for ConstantSource {
    fn signals(&self) -> &[Signal] {
        &self.signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::SignalId;

    #[test]
    fn constant_source_set_value_overwrites_by_name() {
        let mut src = ConstantSource::new(vec![Signal::new(SignalId::virtual_signal("a"), 1)]);
        src.set_value(Signal::new(SignalId::virtual_signal("a"), 5));
        src.set_value(Signal::new(SignalId::item("b"), 2));
        assert_eq!(
            src.signals(),
            &[
                Signal::new(SignalId::virtual_signal("a"), 5),
                Signal::new(SignalId::item("b"), 2),
            ]
        );
    }

    #[test]
    fn vec_is_a_source() {
        let raw = vec![Signal::new(SignalId::virtual_signal("a"), 1)];
        let src: &dyn Source = &raw;
        assert_eq!(src.signals().len(), 1);
    }
}
