use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::fs;
use std::path::PathBuf;

use benches::synthetic_source;
use engine::{
    analyze_file_risk, scan_file, sweep_workspace, CancellationToken, HeatmapPolicy, NoProgress,
    QuickCheckPolicy, SweepConfig,
};
use loader::Catalog;

fn bench_scan_file(c: &mut Criterion) {
    let catalog = Catalog::builtin();
    let mut group = c.benchmark_group("scan_file");
    for lines in [100, 1_000, 10_000] {
        let text = synthetic_source(lines);
        group.bench_with_input(BenchmarkId::from_parameter(lines), &text, |b, text| {
            b.iter(|| scan_file("bench.js", black_box(text), catalog))
        });
    }
    group.finish();
}

fn bench_file_risk(c: &mut Criterion) {
    let catalog = Catalog::builtin();
    let text = synthetic_source(1_000);
    let heatmap = HeatmapPolicy::default();
    let quick = QuickCheckPolicy::default();
    c.bench_function("file_risk_heatmap", |b| {
        b.iter(|| analyze_file_risk("bench.js", black_box(&text), catalog, &heatmap, 10))
    });
    c.bench_function("file_risk_quick", |b| {
        b.iter(|| analyze_file_risk("bench.js", black_box(&text), catalog, &quick, 10))
    });
}

fn bench_sweep(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("tempdir");
    let files: Vec<PathBuf> = (0..200)
        .map(|i| {
            let sub = dir.path().join(format!("pkg{}", i % 10));
            fs::create_dir_all(&sub).expect("create dir");
            let path = sub.join(format!("file{i}.js"));
            fs::write(&path, synthetic_source(200)).expect("write fixture");
            path
        })
        .collect();
    let catalog = Catalog::builtin();

    let mut group = c.benchmark_group("sweep_workspace");
    group.sample_size(20);
    for threads in [1, 4] {
        let cfg = SweepConfig {
            threads,
            ..SweepConfig::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(threads), &cfg, |b, cfg| {
            b.iter(|| {
                sweep_workspace(
                    dir.path(),
                    black_box(&files),
                    catalog,
                    cfg,
                    &CancellationToken::new(),
                    &NoProgress,
                )
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_scan_file, bench_file_risk, bench_sweep);
criterion_main!(benches);
