use criterion::{black_box, criterion_group, criterion_main, Criterion};
use polygon_coverage::{
    FixedFootprintSensor, Point, Polygon, PolygonStripmapPlanner, PolygonWithHoles, Settings,
};
use std::sync::Arc;

fn planner() -> PolygonStripmapPlanner {
    let polygon = PolygonWithHoles::new(
        Polygon::from_f64(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]).unwrap(),
        vec![Polygon::from_f64(&[(1.5, 1.5), (2.5, 1.5), (2.5, 2.5), (1.5, 2.5)]).unwrap()],
    )
    .unwrap();
    let sensor = Arc::new(FixedFootprintSensor::new(1.0, 0.2));
    PolygonStripmapPlanner::new(Settings::new(polygon, sensor))
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep_plan");
    group.sample_size(10);

    group.bench_function("setup", |b| {
        b.iter(|| {
            let mut planner = planner();
            planner.setup().unwrap();
            black_box(&planner);
        });
    });

    let mut ready = planner();
    ready.setup().unwrap();
    let start = Point::from_f64(0.0, 0.0).unwrap();
    let goal = Point::from_f64(4.0, 4.0).unwrap();

    group.bench_function("solve", |b| {
        b.iter(|| {
            let waypoints = ready.solve(black_box(&start), black_box(&goal)).unwrap();
            black_box(waypoints);
        });
    });

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
