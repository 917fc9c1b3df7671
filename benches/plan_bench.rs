use cdm_erd::error::WarningCollector;
use cdm_erd::report::PlanReport;
use cdm_erd::schema::DependencyMap;
use cdm_erd::style::{ColorPicker, Palette, PaletteMode};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use test_data_gen::{Generator, GeneratorConfig, Scale};

fn graph_pairs(layers: usize, width: usize) -> Vec<(String, Vec<String>)> {
    let mut config = GeneratorConfig::from_scale(Scale::Large);
    config.layers = layers;
    config.entities_per_layer = width;
    Generator::with_config(42, config).generate().to_pairs()
}

fn bench_build_and_level(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_and_level");

    for (layers, width) in [(4, 25), (8, 125), (12, 500)] {
        let pairs = graph_pairs(layers, width);
        let entities = pairs.len();

        group.throughput(Throughput::Elements(entities as u64));
        group.bench_with_input(
            BenchmarkId::new("from_pairs+level_sort", format!("{}_entities", entities)),
            &pairs,
            |b, pairs| {
                b.iter(|| {
                    let mut warnings = WarningCollector::new();
                    let map = DependencyMap::from_pairs(pairs.iter().cloned(), &mut warnings);
                    black_box(map.level_sort().unwrap())
                });
            },
        );
    }

    group.finish();
}

fn bench_level_only(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_sort");

    for (layers, width) in [(8, 125), (12, 500)] {
        let mut warnings = WarningCollector::new();
        let map = DependencyMap::from_pairs(graph_pairs(layers, width), &mut warnings);

        group.throughput(Throughput::Elements(map.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("level_sort", format!("{}_entities", map.len())),
            &map,
            |b, map| b.iter(|| black_box(map.level_sort().unwrap())),
        );
    }

    group.finish();
}

fn bench_report(c: &mut Criterion) {
    let mut warnings = WarningCollector::new();
    let map = DependencyMap::from_pairs(graph_pairs(12, 500), &mut warnings);
    let plan = map.level_sort().unwrap();
    let ids: Vec<_> = map.iter().map(|(id, _)| id.clone()).collect();
    let mut picker = ColorPicker::new(PaletteMode::Hashed, 0);
    let palette = Palette::assign(&ids, &mut picker, &Default::default());

    c.bench_function("report_text_6000_entities", |b| {
        b.iter(|| black_box(PlanReport::build(&plan, &palette).to_text()))
    });
}

criterion_group!(benches, bench_build_and_level, bench_level_only, bench_report);
criterion_main!(benches);
