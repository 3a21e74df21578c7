// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Criterion benchmarks for word filter performance

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use wordfilter::{FilterConfig, FilterContext, FilterRegistry};

const FILLERS: &[&str] = &[" ", "*", ".", "-", "~"];

fn create_test_words(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("banned{}phrase{}", i % 97, i))
        .collect()
}

fn create_test_context(count: usize) -> FilterContext {
    let mut ctx = FilterContext::new(FilterConfig {
        ignore_case: true,
        ..Default::default()
    });
    ctx.insert_phrases(&create_test_words(count)).unwrap();
    ctx.insert_phrases(&["bad", "word", "屏蔽词"]).unwrap();
    ctx.insert_fillers(FILLERS).unwrap();
    ctx
}

fn bench_bulk_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_insert");

    for size in [100, 1000, 10000].iter() {
        let words = create_test_words(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &words, |b, words| {
            b.iter(|| {
                let mut ctx = FilterContext::default();
                ctx.insert_phrases(black_box(words)).unwrap();
                ctx
            })
        });
    }

    group.finish();
}

fn bench_check_clean_text(c: &mut Criterion) {
    let ctx = create_test_context(1000);
    let text = "This is just normal text without any banned phrases whatsoever. \
                It contains nothing that should be detected. Just plain English text.";

    c.bench_function("check_clean_text", |b| b.iter(|| ctx.check(black_box(text))));
}

fn bench_check_obfuscated(c: &mut Criterion) {
    let ctx = create_test_context(1000);
    let text = "this is a b.a.d w-o-r-d and a 屏 蔽 词 in one sentence";

    c.bench_function("check_obfuscated", |b| b.iter(|| ctx.check(black_box(text))));
}

fn bench_filter_obfuscated(c: &mut Criterion) {
    let ctx = create_test_context(1000);
    let text = "this is a b.a.d w-o-r-d and a 屏 蔽 词 in one sentence";

    c.bench_function("filter_obfuscated", |b| {
        b.iter(|| ctx.filter(black_box(text)))
    });
}

fn bench_large_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("large_text_filter");
    let ctx = create_test_context(1000);

    for size in [100, 1000, 5000].iter() {
        let mut text = String::new();
        for i in 0..*size {
            text.push_str(&format!(
                "Line {}: some text with a B A D word and banned{}phrase{}\n",
                i,
                i % 97,
                i % 1000
            ));
        }

        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| ctx.filter(black_box(text)))
        });
    }

    group.finish();
}

fn bench_registry_check(c: &mut Criterion) {
    let registry = FilterRegistry::new();
    registry.create(1, FilterConfig::default()).unwrap();
    registry.insert_phrases(1, &create_test_words(1000)).unwrap();
    registry.insert_fillers(1, FILLERS).unwrap();
    let text = "Customer wrote banned3phrase100 in the notes field";

    c.bench_function("registry_check", |b| {
        b.iter(|| registry.check(1, black_box(text)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_bulk_insert,
    bench_check_clean_text,
    bench_check_obfuscated,
    bench_filter_obfuscated,
    bench_large_text,
    bench_registry_check,
);

criterion_main!(benches);
