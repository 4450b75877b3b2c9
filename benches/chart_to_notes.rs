//! Benchmark for converting StepMania charts into tap notes.

use criterion::{Criterion, Throughput};
use steptap::{
    config::SymbolPolicy,
    convert::{step_types, tap_notes},
};

struct ChartFile {
    name: String,
    source: String,
}

fn scan_chart_files() -> Vec<ChartFile> {
    let dir = "tests/files";

    std::fs::read_dir(dir)
        .expect("Failed to read directory")
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "sm"))
        .filter_map(|path| {
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(String::from)?;

            let source = std::fs::read_to_string(&path).expect("Failed to load test file");

            Some(ChartFile { name, source })
        })
        .collect()
}

fn bench_chart_to_notes(c: &mut Criterion) {
    let files = scan_chart_files();
    let mut group = c.benchmark_group("chart_to_notes");

    for file in &files {
        group.throughput(Throughput::Bytes(file.source.len() as u64));
        for step_type in step_types(&file.source).step_types {
            group.bench_function(format!("{}/{}", file.name, step_type), |b| {
                b.iter(|| {
                    tap_notes(
                        std::hint::black_box(&file.source),
                        std::hint::black_box(&step_type),
                        SymbolPolicy::Ignore,
                    )
                });
            });
        }
    }

    group.finish();
}

fn main() {
    let mut criterion = Criterion::default();
    bench_chart_to_notes(&mut criterion);
}
