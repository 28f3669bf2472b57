//! Runtime module: drives a network through discrete steps.

use crate::control::{new_control_queue, ControlHandle, ControlMsg};
use crate::graph::{Network, NetworkError, NodeId};
use crate::signal::SignalSet;
use rtrb::Consumer;

/// Owns a network and steps it, applying queued edits between steps.
pub struct Runtime {
    network: Network,
    control_rx: Option<Consumer<ControlMsg>>,
    step_count: u64,
}

impl Runtime {
    /// Create a runtime without a control queue.
    pub fn new(network: Network) -> Self {
        Self {
            network,
            control_rx: None,
            step_count: 0,
        }
    }

    /// Create a runtime plus the handle the owner uses to queue edits.
    pub fn new_with_control(network: Network) -> (Self, ControlHandle) {
        let (tx, rx) = new_control_queue();
        let runtime = Self {
            network,
            control_rx: Some(rx),
            step_count: 0,
        };
        (runtime, ControlHandle::new(tx))
    }

    /// The network as of the last commit.
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Direct access for edits made between steps.
    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    /// Number of completed steps.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Apply queued edits, returning the ones that failed.
    fn drain_control(&mut self) -> Vec<(ControlMsg, NetworkError)> {
        let mut failed = Vec::new();
        let Some(rx) = self.control_rx.as_mut() else {
            return failed;
        };
        while let Ok(msg) = rx.pop() {
            if let Err(err) = msg.clone().apply(&mut self.network) {
                log::warn!("dropping {} for {:?}: {}", msg.description(), msg.target_node(), err);
                failed.push((msg, err));
            }
        }
        failed
    }

    /// Apply pending edits, then run one advance pass and one commit pass.
    ///
    /// Returns the edits that could not be applied; they never stop the step.
    pub fn step(&mut self) -> Vec<(ControlMsg, NetworkError)> {
        let failed = self.drain_control();
        self.network.step();
        self.step_count += 1;
        log::trace!("step {} complete", self.step_count);
        failed
    }
}

/// Run `steps` steps, capturing `probe`'s committed output after each.
pub fn run_steps(
    runtime: &mut Runtime,
    probe: NodeId,
    steps: usize,
) -> Result<Vec<SignalSet>, NetworkError> {
    runtime.network().node(probe)?;
    let mut history = Vec::with_capacity(steps);
    for _ in 0..steps {
        runtime.step();
        history.push(runtime.network().signals(probe)?.to_vec());
    }
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decider::{Comparator, DeciderConfig, Operand};
    use crate::signal::{Signal, SignalId};

    fn sig(name: &str, value: i32) -> Signal {
        Signal::new(SignalId::virtual_signal(name), value)
    }

    #[test]
    fn runtime_counts_steps() {
        let mut runtime = Runtime::new(Network::new());
        runtime.step();
        runtime.step();
        assert_eq!(runtime.step_count(), 2);
    }

    #[test]
    fn edits_land_at_step_boundary() {
        let mut net = Network::new();
        let src = net.add_constant(vec![sig("a", 2)]);
        let dc = net.add_decider();
        let (mut runtime, mut control) = Runtime::new_with_control(net);

        control
            .send(ControlMsg::Connect { from: src, to: dc })
            .unwrap();
        control
            .send(ControlMsg::SetConfig {
                node: dc,
                config: DeciderConfig::new(
                    Operand::signal("a"),
                    Comparator::Eq,
                    Operand::Constant(2),
                    Operand::Every,
                    true,
                ),
            })
            .unwrap();
        assert!(runtime.network().signals(dc).unwrap().is_empty());

        let failed = runtime.step();
        assert!(failed.is_empty());
        assert_eq!(runtime.network().signals(dc).unwrap(), &[sig("a", 2)]);
    }

    #[test]
    fn failed_edits_are_reported_not_fatal() {
        let mut net = Network::new();
        let src = net.add_constant(vec![]);
        let (mut runtime, mut control) = Runtime::new_with_control(net);
        control.send(ControlMsg::ClearConfig { node: src }).unwrap();
        let failed = runtime.step();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].1, NetworkError::NotADecider(src));
        assert_eq!(runtime.step_count(), 1);
    }

    #[test]
    fn run_steps_records_probe() {
        let mut net = Network::new();
        let src = net.add_constant(vec![sig("a", 1)]);
        let dc = net.add_decider_with(DeciderConfig::new(
            Operand::signal("a"),
            Comparator::Gt,
            Operand::Constant(0),
            Operand::signal("a"),
            false,
        ));
        net.connect(src, dc).unwrap();
        let mut runtime = Runtime::new(net);
        let history = run_steps(&mut runtime, dc, 3).unwrap();
        assert_eq!(history, vec![vec![sig("a", 1)]; 3]);
        assert!(run_steps(&mut runtime, NodeId(7), 1).is_err());
    }
}
