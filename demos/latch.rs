//! SR latch built from two decider combinators.
//!
//! A "set" pulse on `s` turns the latch on; it then holds itself through a
//! self-wired combinator until a "reset" pulse on `r` arrives.

use decider_net::control::ControlMsg;
use decider_net::decider::{Comparator, DeciderConfig, Operand};
use decider_net::graph::Network;
use decider_net::runtime::Runtime;
use decider_net::signal::{lookup, Signal, SignalId};

fn main() {
    env_logger::init();

    let mut net = Network::new();
    let buttons = net.add_constant(Vec::new());

    // Emits `s:1` while s > r; wired to itself so the set survives the pulse
    let latch = net.add_decider_with(DeciderConfig::new(
        Operand::signal("s"),
        Comparator::Gt,
        Operand::signal("r"),
        Operand::signal("s"),
        false,
    ));
    net.connect(buttons, latch).unwrap();
    net.connect(latch, latch).unwrap();

    let (mut runtime, mut control) = Runtime::new_with_control(net);
    let s = SignalId::virtual_signal("s");
    let press = |signals: Vec<Signal>| ControlMsg::SetSignals {
        node: buttons,
        signals,
    };

    let script: [(&str, Vec<Signal>); 6] = [
        ("idle", Vec::new()),
        ("set", vec![Signal::new(s.clone(), 1)]),
        ("release", Vec::new()),
        ("hold", Vec::new()),
        ("reset", vec![Signal::new(SignalId::virtual_signal("r"), 2)]),
        ("release", Vec::new()),
    ];

    for (label, signals) in script {
        control.send(press(signals)).unwrap();
        runtime.step();
        let out = runtime.network().signals(latch).unwrap();
        println!(
            "step {:>2} {:<8} latch = {}",
            runtime.step_count(),
            label,
            lookup(out, &s)
        );
    }
}
