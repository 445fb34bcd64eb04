use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use markright_engine::host::{Document, Edit};
use markright_engine::text::split_lines;
use markright_engine::{PreviewRenderer, SourcePosition, scan};
mod common;

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");
    group.sample_size(20);

    for size in [10, 100, 1000] {
        let content = common::generate_markdown_content(size);
        let lines = split_lines(&content);
        group.bench_with_input(BenchmarkId::new("regions", size), &lines, |b, lines| {
            b.iter(|| std::hint::black_box(scan(std::hint::black_box(lines))));
        });
    }

    let prose = common::generate_prose(1000);
    let lines = split_lines(&prose);
    group.bench_function("prose_only", |b| {
        b.iter(|| std::hint::black_box(scan(std::hint::black_box(&lines))));
    });

    group.finish();
}

fn bench_preview(c: &mut Criterion) {
    let mut group = c.benchmark_group("preview");
    group.sample_size(10);

    let content = common::generate_markdown_content(100);
    let renderer = PreviewRenderer::default();
    group.bench_function("render", |b| {
        b.iter(|| std::hint::black_box(renderer.render(std::hint::black_box(&content))));
    });

    group.finish();
}

/// A keystroke on a large document: apply the edit, then rescan.
fn bench_edit_then_rescan(c: &mut Criterion) {
    let mut group = c.benchmark_group("edit");
    group.sample_size(10);

    let content = common::generate_large_document();
    group.bench_function("insert_and_rescan", |b| {
        b.iter_batched(
            || Document::new(&content),
            |mut doc| {
                doc.apply(Edit::Insert {
                    at: SourcePosition::new(4, 0),
                    text: "x".into(),
                })
                .unwrap();
                std::hint::black_box(scan(&doc.lines()))
            },
            criterion::BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_scan, bench_preview, bench_edit_then_rescan);
criterion_main!(benches);
