//! Benchmarks for the rule DSL parser.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ruleforge_dsl::{parse_document, parse_rule};

fn bench_parse_rule(c: &mut Criterion) {
    let lines = [
        ("atom", "DOMAIN-SUFFIX,example.com"),
        ("atom_options", "IP-CIDR,10.0.0.0/8,no-resolve"),
        ("escaped", r"URL-REGEX,^https?://a\,b/.*$"),
        (
            "logical",
            "AND,((OR,((DOMAIN,a.com),(DOMAIN-SUFFIX,b.com))),(NOT,((DST-PORT,80))))",
        ),
    ];

    let mut group = c.benchmark_group("parse_rule");
    for (name, line) in lines {
        group.bench_with_input(BenchmarkId::from_parameter(name), line, |b, l| {
            b.iter(|| parse_rule(black_box(l)))
        });
    }
    group.finish();
}

fn bench_parse_document(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_document");
    for size in [100usize, 1_000, 10_000] {
        let text: String = (0..size)
            .map(|i| match i % 4 {
                0 => format!("DOMAIN-SUFFIX,host{i}.example.com\n"),
                1 => format!("IP-CIDR,10.{}.0.0/16,no-resolve\n", i % 256),
                2 => format!("AND,((DOMAIN-KEYWORD,k{i}),(DST-PORT,443))\n"),
                _ => "# comment\n".to_string(),
            })
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, t| {
            b.iter(|| parse_document(black_box(t)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse_rule, bench_parse_document);
criterion_main!(benches);
