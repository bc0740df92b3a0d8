//! Benchmarks for contour generation and figure rendering.
//!
//! Run with: cargo bench --package renderer --bench contour_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ndarray::Array2;
use projection::ProjectionKind;
use renderer::contour::{connect_segments, contour_grid, generate_all_contours, march_squares, nice_levels};
use renderer::{png, Figure, GridSpec, RenderConfig, TransformMode};

/// Intensity-like field with longitudinal structure on a global grid.
fn global_field(nlats: usize, nlons: usize) -> (Array2<f64>, Array2<f64>, Array2<f64>) {
    let lats = Array2::from_shape_fn((nlats, nlons), |(i, _)| -90.0 + 180.0 * i as f64 / (nlats - 1) as f64);
    let lons = Array2::from_shape_fn((nlats, nlons), |(_, j)| -180.0 + 360.0 * j as f64 / (nlons - 1) as f64);
    let mut values = Array2::zeros((nlats, nlons));
    for ((i, j), v) in values.indexed_iter_mut() {
        let lat: f64 = lats[[i, j]];
        let lon: f64 = lons[[i, j]];
        let s = lat.to_radians().sin();
        *v = 30_000.0 * (1.0 + 3.0 * s * s).sqrt() + 4_000.0 * (2.0 * lon.to_radians()).cos() * lat.to_radians().cos();
    }
    (lats, lons, values)
}

fn bench_march_squares(c: &mut Criterion) {
    let mut group = c.benchmark_group("march_squares");
    for (nlats, nlons) in [(91, 181), (181, 361), (361, 721)] {
        let (_, _, values) = global_field(nlats, nlons);
        group.throughput(Throughput::Elements((nlats * nlons) as u64));
        group.bench_with_input(
            BenchmarkId::new("single_level", format!("{}x{}", nlats, nlons)),
            &values,
            |b, values| b.iter(|| march_squares(black_box(&values.view()), black_box(45_000.0))),
        );
    }
    group.finish();
}

fn bench_connect_segments(c: &mut Criterion) {
    let (_, _, values) = global_field(181, 361);
    let segments = march_squares(&values.view(), 45_000.0);
    c.bench_function("connect_segments/181x361", |b| {
        b.iter(|| connect_segments(black_box(&segments), 45_000.0))
    });
}

fn bench_all_levels(c: &mut Criterion) {
    let mut group = c.benchmark_group("all_levels");
    let (lats, lons, values) = global_field(181, 361);
    let levels = nice_levels(20_000.0, 70_000.0, 7);

    for smoothing in [0u32, 2] {
        group.bench_with_input(BenchmarkId::new("index_space", smoothing), &smoothing, |b, &s| {
            b.iter(|| generate_all_contours(black_box(&values.view()), &levels, s))
        });
    }
    group.bench_function("curvilinear", |b| {
        b.iter(|| contour_grid(&lons.view(), &lats.view(), black_box(&values.view()), &levels, 0))
    });
    group.finish();
}

fn bench_render_figure(c: &mut Criterion) {
    let (lats, lons, values) = global_field(181, 361);
    let config = RenderConfig::for_units("nT");

    let mut group = c.benchmark_group("render_figure");
    group.sample_size(10);
    group.bench_function("mollweide_1000px", |b| {
        b.iter(|| {
            let mut fig = Figure::new(1000, 1000).unwrap();
            let id = fig
                .subplot2grid(&GridSpec::new(1, 1), (0, 0), 1, 1, ProjectionKind::mollweide())
                .unwrap();
            fig.axes_mut(id)
                .unwrap()
                .contour(&lons.view(), &lats.view(), &values.view(), TransformMode::DuringDrawing, &config)
                .unwrap();
            let pixmap = fig.render().unwrap();
            png::encode_pixmap(black_box(&pixmap)).unwrap()
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_march_squares,
    bench_connect_segments,
    bench_all_levels,
    bench_render_figure
);
criterion_main!(benches);
