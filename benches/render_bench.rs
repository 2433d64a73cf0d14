use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tonegraph::dsl::{noise, sample_and_hold, sawtooth, sine, square, Patch};
use tonegraph::units::UnitExt;
use tonegraph::{Graph, NodeType, RenderConfig};

fn bench_render_patch(c: &mut Criterion) {
    let signal = 0.5 * sawtooth(440.0.hz() + 100.0 * sine(1.0.hz()))
        + 0.25 * square(220.0.hz() + 50.0 * sample_and_hold(10.0.hz(), noise()));
    let mut patch = Patch::compile(&signal).unwrap();
    let config = RenderConfig::with_duration(0.1.sec());

    c.bench_function("render_patch_4410", |b| {
        b.iter(|| black_box(patch.render(black_box(&config)).unwrap()))
    });
}

fn bench_shared_fan_in(c: &mut Criterion) {
    // One oscillator read by every level of a 32-deep sum chain.
    let mut graph = Graph::new();
    let freq = graph.add_node(NodeType::Constant { value: 110.0 }, &[]).unwrap();
    let lfo = graph
        .add_node(
            NodeType::Oscillator {
                shape: tonegraph::waveform::Waveform::Sine,
            },
            &[freq],
        )
        .unwrap();
    let mut acc = lfo;
    for _ in 0..32 {
        acc = graph.add_node(NodeType::Sum, &[acc, lfo]).unwrap();
    }
    let rate = 44100.0.hz();
    graph.reset(acc).unwrap();

    c.bench_function("shared_fan_in_advance_1024", |b| {
        b.iter(|| {
            for _ in 0..1024 {
                black_box(graph.advance(acc, rate).unwrap());
            }
        })
    });
}

criterion_group!(benches, bench_render_patch, bench_shared_fan_in);
criterion_main!(benches);
