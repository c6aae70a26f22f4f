use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use vademecum::atlas::{Atlas, AtlasOptions, parse_atlas};
use vademecum::config::Config;
use vademecum::connector::{AngleMetric, place_connectors};
use vademecum::geometry::{GeoPoint, PanelRect, ScreenBox};
use vademecum::projection::{MapView, Projection, ViewSize};
use vademecum::render::render_svg;
use vademecum::scene::{SceneOptions, compute_scene};

const AMERICAS_SMALL: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/americas_small.json"
));

/// A synthetic atlas of `count` small square countries on a grid.
fn grid_atlas_source(count: usize) -> String {
    let mut out = String::from("{\"type\":\"FeatureCollection\",\"features\":[");
    let side = (count as f64).sqrt().ceil() as usize;
    for i in 0..count {
        let lng = -160.0 + (i % side.max(1)) as f64 * 4.0;
        let lat = -50.0 + (i / side.max(1)) as f64 * 4.0;
        if i > 0 {
            out.push(',');
        }
        out.push_str(&format!(
            "{{\"type\":\"Feature\",\"properties\":{{\"name_it\":\"Paese {i}\",\"iso_a2\":\"P{i}\"}},\
             \"geometry\":{{\"type\":\"Polygon\",\"coordinates\":[[[{lng},{lat}],[{},{lat}],[{},{}],[{lng},{}],[{lng},{lat}]]]}}}}",
            lng + 3.0,
            lng + 3.0,
            lat + 3.0,
            lat + 3.0
        ));
    }
    out.push_str("]}");
    out
}

fn load(input: &str) -> Atlas {
    parse_atlas(input, &AtlasOptions::default()).expect("parse failed")
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    let grid = grid_atlas_source(400);
    for (name, input) in [("americas_small", AMERICAS_SMALL), ("grid_400", grid.as_str())] {
        group.bench_with_input(BenchmarkId::from_parameter(name), input, |b, data| {
            b.iter(|| {
                let atlas = load(black_box(data));
                black_box(atlas.len());
            });
        });
    }
    group.finish();
}

fn bench_connectors(c: &mut Criterion) {
    let mut group = c.benchmark_group("connectors");
    let view = MapView::new(GeoPoint::new(12.0, -75.0), 2.25, ViewSize::new(2560.0, 1440.0));
    let panel = PanelRect::from_box(&ScreenBox::new(1690.0, 240.0, 480.0, 480.0)).inset_vertical(1.0);
    for metric in [AngleMetric::Absolute, AngleMetric::Circular] {
        let centroid = view.to_screen(GeoPoint::new(18.1, -77.3));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{metric:?}")),
            &metric,
            |b, metric| {
                b.iter(|| {
                    let pair = place_connectors(black_box(centroid), &panel, &view, *metric);
                    black_box(pair.secondary.tag);
                });
            },
        );
    }
    group.finish();
}

fn bench_scene(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene");
    let atlas = load(AMERICAS_SMALL);
    let config = Config::default();
    for country in ["Giamaica", "Brasile", "Uruguay"] {
        let options = SceneOptions::highlight(country);
        group.bench_with_input(BenchmarkId::from_parameter(country), &options, |b, options| {
            b.iter(|| {
                let scene = compute_scene(black_box(&atlas), &config, options).expect("scene failed");
                black_box(scene.shapes.len());
            });
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_svg");
    let config = Config::default();
    let grid = grid_atlas_source(400);
    for (name, input, country) in [
        ("americas_small", AMERICAS_SMALL, "Trinidad e Tobago"),
        ("grid_400", grid.as_str(), "Paese 210"),
    ] {
        let atlas = load(input);
        let scene = compute_scene(&atlas, &config, &SceneOptions::highlight(country)).expect("scene failed");
        group.bench_with_input(BenchmarkId::from_parameter(name), &scene, |b, scene| {
            b.iter(|| {
                let svg = render_svg(black_box(scene), &config.style, config.export.crop.as_ref());
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_connectors, bench_scene, bench_render);
criterion_main!(benches);
