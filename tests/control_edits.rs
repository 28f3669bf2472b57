use decider_net::control::ControlMsg;
use decider_net::decider::{Comparator, DeciderConfig, Operand};
use decider_net::graph::{Network, NetworkError, NodeId};
use decider_net::runtime::Runtime;
use decider_net::signal::{Signal, SignalId};

fn sig(name: &str, value: i32) -> Signal {
    Signal::new(SignalId::virtual_signal(name), value)
}

#[test]
fn queued_edits_apply_before_the_next_step() {
    let mut net = Network::new();
    let src = net.add_constant(vec![sig("a", 3)]);
    let dc = net.add_decider();
    net.connect(src, dc).unwrap();

    let (mut runtime, mut control) = Runtime::new_with_control(net);
    runtime.step();
    assert!(runtime.network().signals(dc).unwrap().is_empty());

    control
        .send(ControlMsg::SetLeft {
            node: dc,
            operand: Some(Operand::signal("a")),
        })
        .unwrap();
    control
        .send(ControlMsg::SetComparator {
            node: dc,
            comparator: Some(Comparator::Eq),
        })
        .unwrap();
    control
        .send(ControlMsg::SetRight {
            node: dc,
            operand: Some(Operand::Constant(3)),
        })
        .unwrap();
    control
        .send(ControlMsg::SetOutput {
            node: dc,
            operand: Some(Operand::signal("ok")),
        })
        .unwrap();
    // Still invalid until the flag arrives
    assert!(runtime.network().signals(dc).unwrap().is_empty());
    control
        .send(ControlMsg::SetCopyCount {
            node: dc,
            copy: Some(false),
        })
        .unwrap();

    let failed = runtime.step();
    assert!(failed.is_empty());
    assert_eq!(runtime.network().signals(dc).unwrap(), &[sig("ok", 1)]);

    control
        .send(ControlMsg::SetSignals {
            node: src,
            signals: vec![sig("a", 4)],
        })
        .unwrap();
    runtime.step();
    assert!(runtime.network().signals(dc).unwrap().is_empty());
}

#[test]
fn failed_edits_are_reported_not_fatal() {
    let mut net = Network::new();
    let src = net.add_constant(vec![sig("a", 1)]);
    let dc = net.add_decider_with(DeciderConfig::new(
        Operand::Every,
        Comparator::Gt,
        Operand::Constant(0),
        Operand::Every,
        true,
    ));
    net.connect(src, dc).unwrap();

    let (mut runtime, mut control) = Runtime::new_with_control(net);
    control
        .send(ControlMsg::Connect { from: src, to: dc })
        .unwrap();
    control
        .send(ControlMsg::ClearConfig { node: NodeId(99) })
        .unwrap();

    let failed = runtime.step();
    assert_eq!(failed.len(), 2);
    assert_eq!(
        failed[0].1,
        NetworkError::AlreadyConnected { from: src, to: dc }
    );
    assert_eq!(failed[1].1, NetworkError::InvalidNode(NodeId(99)));
    assert_eq!(runtime.network().signals(dc).unwrap(), &[sig("a", 1)]);

    control
        .send(ControlMsg::Disconnect { from: src, to: dc })
        .unwrap();
    runtime.step();
    assert!(runtime.network().signals(dc).unwrap().is_empty());
}

#[test]
fn blueprint_config_drives_a_network() {
    let config = DeciderConfig::from_json(
        r#"{
            "first_signal": {"type": "item", "name": "iron-plate"},
            "constant": 100,
            "comparator": "≥",
            "output_signal": {"type": "virtual", "name": "signal-everything"},
            "copy_count_from_input": false
        }"#,
    )
    .unwrap();

    let mut net = Network::new();
    let chest = net.add_constant(vec![
        Signal::new(SignalId::item("iron-plate"), 120),
        Signal::new(SignalId::item("copper-plate"), 7),
    ]);
    let dc = net.add_decider_with(config.clone());
    net.connect(chest, dc).unwrap();
    net.step();
    assert_eq!(
        net.signals(dc).unwrap(),
        &[
            Signal::new(SignalId::item("iron-plate"), 1),
            Signal::new(SignalId::item("copper-plate"), 1),
        ]
    );

    let round = DeciderConfig::from_json(&config.to_json().unwrap()).unwrap();
    assert_eq!(round, config);
}
