fn main() {
    divan::main();
}

#[divan::bench]
fn collect_short(bencher: divan::Bencher) {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../testfiles/short.demlog");
    let data = std::fs::read(path).unwrap();

    bencher.bench(|| {
        collector::collect(
            collector::replay::ReplayEngine::new(divan::black_box(&data)),
            "bench".to_owned(),
            collector::Config::default(),
            |_| {},
        )
    });
}

#[divan::bench(args = [8, 64, 256])]
fn smoke_match(bencher: divan::Bencher, throws: usize) {
    bencher
        .with_inputs(|| {
            let mut correlator = collector::grenades::GrenadeCorrelator::new(None);
            for i in 0..throws {
                correlator.on_throw(
                    &collector::engine::GrenadeThrow {
                        entity_id: i as i32,
                        kind: model::GrenadeType::Smoke,
                        thrower: Some(1),
                        x: i as f64 * 17.0,
                        y: i as f64 * 11.0,
                    },
                    i as i32,
                    i as f64 / 64.0,
                );
            }
            correlator
        })
        .bench_values(|mut correlator| {
            correlator.on_smoke_start(500.0, 300.0, 1_000, 20.0);
            correlator.finish()
        });
}

#[divan::bench(args = [64, 512, 4096])]
fn downsample(bencher: divan::Bencher, len: usize) {
    bencher
        .with_inputs(|| {
            (0..len)
                .map(|i| model::TrajectoryPoint {
                    time_in_round: i as f64 / 64.0,
                    x: (i as f64).sin() * 500.0,
                    y: (i as f64).cos() * 500.0,
                })
                .collect::<Vec<_>>()
        })
        .bench_values(|points| collector::trajectory::downsample(points, 10));
}
