use decider_net::decider::{Comparator, DeciderConfig, Operand};
use decider_net::graph::Network;
use decider_net::runtime::{run_steps, Runtime};
use decider_net::signal::{lookup, Signal, SignalId};
use decider_net::source::Source;

fn sig(name: &str, value: i32) -> Signal {
    Signal::new(SignalId::virtual_signal(name), value)
}

fn pass_through() -> DeciderConfig {
    DeciderConfig::new(
        Operand::Every,
        Comparator::Gt,
        Operand::Constant(0),
        Operand::Every,
        true,
    )
}

#[test]
fn self_wired_counter_wraps_at_limit() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut net = Network::new();
    let pulse = net.add_constant(vec![sig("a", 1)]);
    let counter = net.add_decider_with(DeciderConfig::new(
        Operand::signal("a"),
        Comparator::Lt,
        Operand::Constant(10),
        Operand::Every,
        true,
    ));
    net.connect(pulse, counter).unwrap();
    net.connect(counter, counter).unwrap();

    let mut runtime = Runtime::new(net);
    let history = run_steps(&mut runtime, counter, 12).unwrap();
    let values: Vec<i32> = history
        .iter()
        .map(|out| lookup(out, &SignalId::virtual_signal("a")))
        .collect();
    assert_eq!(values, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 0, 1, 2]);
}

#[test]
fn two_node_cycle_adds_one_step_per_hop() {
    let mut net = Network::new();
    let seed = net.add_constant(vec![sig("a", 1)]);
    let first = net.add_decider_with(pass_through());
    let second = net.add_decider_with(pass_through());
    net.connect(seed, first).unwrap();
    net.connect(second, first).unwrap();
    net.connect(first, second).unwrap();

    let a = SignalId::virtual_signal("a");
    let mut seen = Vec::new();
    for _ in 0..5 {
        net.step();
        seen.push((
            lookup(net.signals(first).unwrap(), &a),
            lookup(net.signals(second).unwrap(), &a),
        ));
    }
    assert_eq!(seen, vec![(1, 0), (1, 1), (2, 1), (2, 2), (3, 2)]);
}

#[test]
fn chained_combinators_see_previous_step() {
    let mut net = Network::new();
    let p1 = net.add_constant(vec![
        sig("a", -1),
        sig("b", 1),
        sig("c", 2),
        sig("d", 3),
        sig("e", 4),
        sig("f", 2),
    ]);
    let p2 = net.add_constant(vec![sig("b", -1), sig("f", 2)]);
    let dc = net.add_decider_with(DeciderConfig::new(
        Operand::Each,
        Comparator::Gt,
        Operand::signal("c"),
        Operand::Each,
        true,
    ));
    let dc2 = net.add_decider_with(DeciderConfig::new(
        Operand::Each,
        Comparator::Lt,
        Operand::Constant(4),
        Operand::Each,
        true,
    ));
    net.connect(p1, dc).unwrap();
    net.connect(p2, dc).unwrap();
    net.connect(dc, dc2).unwrap();

    net.step();
    assert_eq!(
        net.signals(dc).unwrap(),
        &[sig("d", 3), sig("e", 4), sig("f", 4)]
    );
    assert!(net.signals(dc2).unwrap().is_empty());

    net.step();
    assert_eq!(
        net.signals(dc).unwrap(),
        &[sig("d", 3), sig("e", 4), sig("f", 4)]
    );
    assert_eq!(net.signals(dc2).unwrap(), &[sig("d", 3)]);
}

#[test]
fn invalid_combinator_does_not_disturb_neighbours() {
    let mut net = Network::new();
    let src = net.add_constant(vec![sig("a", 2)]);
    let broken = net.add_decider_with(DeciderConfig::new(
        Operand::Constant(1),
        Comparator::Gt,
        Operand::Constant(0),
        Operand::Every,
        true,
    ));
    let healthy = net.add_decider_with(pass_through());
    net.connect(src, broken).unwrap();
    net.connect(src, healthy).unwrap();
    net.connect(broken, healthy).unwrap();

    net.step();
    net.step();
    assert!(net.signals(broken).unwrap().is_empty());
    assert_eq!(net.signals(healthy).unwrap(), &[sig("a", 2)]);
}

struct Sensor {
    readings: Vec<Signal>,
}

impl Source for Sensor {
    fn signals(&self) -> &[Signal] {
        &self.readings
    }
}

#[test]
fn external_sources_feed_combinators() {
    let mut net = Network::new();
    let sensor = net.add_external(Sensor {
        readings: vec![sig("t", 40), sig("t", 5)],
    });
    let alarm = net.add_decider_with(DeciderConfig::new(
        Operand::signal("t"),
        Comparator::Gte,
        Operand::Constant(45),
        Operand::signal("alarm"),
        false,
    ));
    net.connect(sensor, alarm).unwrap();
    net.step();
    assert_eq!(net.signals(alarm).unwrap(), &[sig("alarm", 1)]);
}
