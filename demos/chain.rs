//! Loads two combinators from blueprint JSON and shows one step of latency per hop.

use decider_net::decider::DeciderConfig;
use decider_net::dsl::NetworkBuilder;
use decider_net::runtime::{run_steps, Runtime};
use decider_net::signal::{Signal, SignalId};

const FILTER: &str = r#"{
    "first_signal": {"type": "virtual", "name": "signal-each"},
    "second_signal": {"type": "virtual", "name": "signal-C"},
    "comparator": ">",
    "output_signal": {"type": "virtual", "name": "signal-each"},
    "copy_count_from_input": true
}"#;

const SMALL: &str = r#"{
    "first_signal": {"type": "virtual", "name": "signal-each"},
    "constant": 4,
    "comparator": "<",
    "output_signal": {"type": "virtual", "name": "signal-each"},
    "copy_count_from_input": true
}"#;

fn sig(name: &str, value: i32) -> Signal {
    Signal::new(SignalId::virtual_signal(name), value)
}

fn main() {
    env_logger::init();

    let filter = DeciderConfig::from_json(FILTER).unwrap();
    let small = DeciderConfig::from_json(SMALL).unwrap();

    let mut builder = NetworkBuilder::new();
    builder
        .constant_named(
            "chest",
            vec![sig("signal-A", -1), sig("signal-C", 2), sig("signal-D", 3), sig("signal-E", 4)],
        )
        .unwrap();
    builder.decider_named("filter", Some(filter)).unwrap();
    builder.decider_named("small", Some(small)).unwrap();
    builder.connect_named("chest", "filter").unwrap();
    builder.connect_named("filter", "small").unwrap();
    let probe = builder.handle("small").unwrap().0;
    let net = builder.build();

    let mut runtime = Runtime::new(net);
    for (step, out) in run_steps(&mut runtime, probe, 3).unwrap().iter().enumerate() {
        let rendered: Vec<String> = out.iter().map(|s| format!("{}={}", s.id, s.value)).collect();
        println!("step {}: small = [{}]", step + 1, rendered.join(", "));
    }
}
