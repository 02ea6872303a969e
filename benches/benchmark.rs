//! Performance benchmarks for rs-harvest.
//!
//! Run with: `cargo bench`
//!
//! Benchmarks include:
//! - Fragment validation over a mix of comments and UI chrome
//! - Full extraction passes over synthetic comment threads of growing size

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rs_harvest::{is_valid_content, Aggregator, Options, SnapshotPage};

const FRAGMENTS: &[&str] = &[
    "Great giveaway!",
    "Like",
    "Reply",
    "2h",
    "@alice",
    "Pick me please!! @bob @carol",
    "Liked by dana and 120 others",
    "•",
    "View all 48 comments",
    "Me encanta ❤️",
];

/// A thread of `n` comments; every fifth one has no author link.
fn synthetic_thread(n: usize) -> String {
    let mut html = String::from("<html><body><article><section></section><ul>");
    for i in 0..n {
        if i % 5 == 4 {
            html.push_str(&format!(
                "<li><div><div><div><span>anonymous comment {i}</span></div></div><span>Reply</span></div></li>"
            ));
        } else {
            html.push_str(&format!(
                r#"<li><div><a href="/user{i}/" role="link">user{i}</a><div><div><span>Count me in, entry {i}</span></div></div><span>1h</span></div></li>"#
            ));
        }
    }
    html.push_str("</ul></article></body></html>");
    html
}

fn bench_validator(c: &mut Criterion) {
    c.bench_function("validate_fragments", |b| {
        b.iter(|| {
            FRAGMENTS
                .iter()
                .filter(|text| is_valid_content(black_box(text)))
                .count()
        });
    });
}

fn bench_extraction(c: &mut Criterion) {
    let runtime = match tokio::runtime::Builder::new_current_thread().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to build runtime: {e}");
            return;
        }
    };

    let mut group = c.benchmark_group("extract_thread");
    for size in [50usize, 200, 500] {
        let html = synthetic_thread(size);
        group.throughput(Throughput::Elements(size as u64));

        for (name, options) in [("enhanced", Options::default()), ("basic", Options::basic())] {
            group.bench_with_input(BenchmarkId::new(name, size), &html, |b, html| {
                b.iter(|| {
                    let page = SnapshotPage::new([html.as_str()]);
                    runtime.block_on(async {
                        let aggregator = Aggregator::new(&options);
                        black_box(aggregator.extract(&page).await.map(|r| r.items.len()))
                    })
                });
            });
        }
    }
    group.finish();
}

fn bench_candidate_probe(c: &mut Criterion) {
    let runtime = match tokio::runtime::Builder::new_current_thread().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to build runtime: {e}");
            return;
        }
    };

    let page = SnapshotPage::new([synthetic_thread(500)]);
    let options = Options::default();
    let aggregator = Aggregator::new(&options);

    c.bench_function("count_candidates_500", |b| {
        b.iter(|| runtime.block_on(aggregator.count_candidates(black_box(&page))));
    });
}

criterion_group!(benches, bench_validator, bench_extraction, bench_candidate_probe);
criterion_main!(benches);
