//! Benchmark: `jsontok::JsonTokenizer` over inputs delivered in pieces.
#![allow(missing_docs)]

use std::time::Duration;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use jsontok::{JsonTokenizer, ReaderOptions, chunk_utils::ChunkedReader};

/// A document of one long string property, exactly `target_len` bytes long.
fn make_string_payload(target_len: usize) -> String {
    let overhead = "{\"data\":\"\"}".len();
    assert!(target_len >= overhead, "target_len must be >= {overhead}");

    let mut s = String::with_capacity(target_len);
    s.push_str("{\"data\":\"");
    s.extend(std::iter::repeat_n('a', target_len - overhead));
    s.push_str("\"}");
    s
}

/// An array of small records, dominated by structure and numbers.
fn make_records_payload(records: usize) -> String {
    let mut s = String::from("[");
    for i in 0..records {
        if i > 0 {
            s.push(',');
        }
        s.push_str(&format!(
            r#"{{"id":{i},"score":{}.5,"ok":true,"tags":["a","b"]}}"#,
            i * 7
        ));
    }
    s.push(']');
    s
}

/// Reads `payload` to the end, `chunk` bytes per fetch, and returns the
/// number of tokens.
fn run_tokenizer(payload: &str, chunk: usize, options: &ReaderOptions) -> usize {
    let mut reader = JsonTokenizer::from_reader_with_options(
        ChunkedReader::new(payload.as_bytes(), chunk),
        options.clone(),
    );
    let mut produced = 0usize;
    while reader.read().expect("valid JSON") {
        produced += 1;
    }
    produced
}

fn bench_tokenizer(c: &mut Criterion) {
    let options = ReaderOptions::default();
    let payloads = [
        ("string", make_string_payload(100_000)),
        ("records", make_records_payload(2_000)),
    ];

    let mut group = c.benchmark_group("tokenizer_chunked");
    for (name, payload) in &payloads {
        for &chunk in &[16usize, 1_024, 65_536] {
            group.bench_with_input(BenchmarkId::new(*name, chunk), &chunk, |b, &chunk| {
                b.iter(|| black_box(run_tokenizer(black_box(payload), chunk, &options)));
            });
        }
    }
    group.finish();
}

fn criterion() -> Criterion {
    let mut c = Criterion::default();
    if cfg!(feature = "bench-fast") {
        c = c
            .warm_up_time(Duration::from_millis(10))
            .measurement_time(Duration::from_millis(100))
            .sample_size(10);
    } else {
        c = c
            .warm_up_time(Duration::from_secs(3))
            .measurement_time(Duration::from_secs(8));
    }
    c
}

criterion_group! { name = benches; config = criterion(); targets = bench_tokenizer }
criterion_main!(benches);
