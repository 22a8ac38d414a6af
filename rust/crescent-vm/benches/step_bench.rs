use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use crescent_core::{Program, Topology, Value};
use crescent_vm::{Machine, OperationTable, LONDON_HOME};
use std::sync::Arc;

fn network(table: &OperationTable) -> Arc<Topology> {
    let mut builder = Topology::builder(LONDON_HOME);
    for (station, _) in table.iter() {
        builder = builder.station(station.clone(), ["Tube"]);
    }
    Arc::new(builder.build().expect("bench network"))
}

/// Peels one number per pass off a comma-separated countdown.
const COUNTDOWN: &str = "\
Take Tube Line to Parsons Green
Take Tube Line to Temple
Take Tube Line to Parsons Green
Take Tube Line to Parsons Green
Take Tube Line to Angel
Take Tube Line to Marble Arch
Take Tube Line to Mornington Crescent
";

fn countdown_input(n: usize) -> String {
    (0..=n)
        .rev()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn step_benchmark(c: &mut Criterion) {
    let table = Arc::new(OperationTable::london());
    let topology = network(&table);
    let program = Arc::new(Program::load(COUNTDOWN));

    let mut group = c.benchmark_group("countdown");
    for n in [10usize, 100, 1000] {
        let input = countdown_input(n);
        group.bench_with_input(BenchmarkId::new("run", n), &input, |b, input| {
            b.iter(|| {
                let mut m = Machine::new(
                    Arc::clone(&program),
                    Arc::clone(&topology),
                    Arc::clone(&table),
                    Value::from(input.as_str()),
                );
                m.run().expect("countdown runs home");
                black_box(m.output)
            });
        });
    }
    group.finish();
}

fn load_benchmark(c: &mut Criterion) {
    let script = COUNTDOWN.repeat(200);
    c.bench_function("load_1400_lines", |b| {
        b.iter(|| black_box(Program::load(black_box(&script))))
    });
}

criterion_group!(benches, step_benchmark, load_benchmark);
criterion_main!(benches);
