use criterion::{black_box, criterion_group, criterion_main, Criterion};
use decider_net::decider::{Comparator, DeciderConfig, Operand};
use decider_net::graph::Network;
use decider_net::signal::{Signal, SignalId};

fn wide_source(width: usize) -> Vec<Signal> {
    (0..width)
        .map(|i| Signal::new(SignalId::virtual_signal(format!("s{}", i)), i as i32 + 1))
        .collect()
}

fn bench_single_step(c: &mut Criterion) {
    let mut net = Network::new();
    let src = net.add_constant(wide_source(64));
    let dc = net.add_decider_with(DeciderConfig::new(
        Operand::Each,
        Comparator::Gt,
        Operand::Constant(16),
        Operand::Each,
        true,
    ));
    net.connect(src, dc).unwrap();

    c.bench_function("step_each_64", |b| {
        b.iter(|| {
            net.step();
            black_box(net.signals(dc).unwrap());
        })
    });
}

fn bench_chain(c: &mut Criterion) {
    // Worst-case network: a long pass-through chain closed into a loop
    let mut net = Network::new();
    let src = net.add_constant(wide_source(16));
    let first = net.add_decider_with(DeciderConfig::new(
        Operand::Every,
        Comparator::Gte,
        Operand::Constant(0),
        Operand::Every,
        true,
    ));
    net.connect(src, first).unwrap();
    let mut prev = first;
    for _ in 0..32 {
        let next = net.add_decider_with(DeciderConfig::new(
            Operand::Any,
            Comparator::Gt,
            Operand::Constant(0),
            Operand::Every,
            true,
        ));
        net.connect(prev, next).unwrap();
        prev = next;
    }
    net.connect(prev, first).unwrap();

    c.bench_function("step_chain_32x100", |b| {
        b.iter(|| {
            for _ in 0..100 {
                net.step();
            }
            black_box(net.signals(prev).unwrap());
        })
    });
}

criterion_group!(benches, bench_single_step, bench_chain);
criterion_main!(benches);
