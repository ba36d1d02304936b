use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ucs_language_server::{is_integer, validate_document, ValidationSettings};

/// Generate test content with specific validation scenarios
fn generate_validation_content(lines: usize, scenario: &str) -> Vec<String> {
    let mut content = Vec::with_capacity(lines);

    match scenario {
        "all_valid" => {
            for i in 0..lines {
                content.push(format!("{}\tMessage number {}", i, i));
            }
        }
        "duplicate_ids" => {
            // Every ID appears ten times
            for i in 0..lines {
                content.push(format!("{}\tMessage number {}", i % (lines / 10).max(1), i));
            }
        }
        "duplicate_messages" => {
            for i in 0..lines {
                content.push(format!("{}\tShared message {}", i, i % 50));
            }
        }
        "mixed_errors" => {
            for i in 0..lines {
                match i % 10 {
                    0..=5 => content.push(format!("{}\tMessage number {}", i, i)),
                    6 => content.push(String::new()),
                    7 => content.push(format!("{} missing tab", i)),
                    8 => content.push(format!("0{}\tLeading zero", i)),
                    9 => content.push(format!("{}\t  ", i)),
                    _ => unreachable!(),
                }
            }
        }
        _ => {
            for i in 0..lines {
                content.push(format!("{}\t{}", i, i));
            }
        }
    }

    content
}

/// Benchmark validation with different error densities
fn bench_validation_error_density(c: &mut Criterion) {
    let settings = ValidationSettings::default();
    let scenarios = ["all_valid", "duplicate_ids", "duplicate_messages", "mixed_errors"];

    let mut group = c.benchmark_group("validation_error_density");

    for scenario in scenarios {
        let content_lines = generate_validation_content(5000, scenario);
        let content = content_lines.join("\n");

        group.throughput(Throughput::Elements(content_lines.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("scenario", scenario),
            &content,
            |b, content| {
                b.iter(|| {
                    let result = validate_document(black_box(content), black_box(&settings));
                    black_box(result)
                })
            },
        );
    }

    group.finish();
}

/// Benchmark validation scalability with different file sizes
fn bench_validation_scalability(c: &mut Criterion) {
    let settings = ValidationSettings::default();
    let file_sizes = [100, 1_000, 10_000, 50_000];

    let mut group = c.benchmark_group("validation_scalability");

    for size in file_sizes {
        let content = generate_validation_content(size, "mixed_errors").join("\n");

        group.throughput(Throughput::Bytes(content.len() as u64));
        group.bench_with_input(BenchmarkId::new("size", size), &content, |b, content| {
            b.iter(|| {
                let result = validate_document(black_box(content), black_box(&settings));
                black_box(result)
            })
        });
    }

    group.finish();
}

fn bench_integer_lexer(c: &mut Criterion) {
    let ids: Vec<String> = (0..1000)
        .map(|i| match i % 4 {
            0 => i.to_string(),
            1 => format!("0{}", i),
            2 => format!("{}a", i),
            _ => "9".repeat(64),
        })
        .collect();

    c.bench_function("is_integer_mixed", |b| {
        b.iter(|| ids.iter().filter(|id| is_integer(black_box(id))).count())
    });
}

criterion_group!(
    validation_benches,
    bench_validation_error_density,
    bench_validation_scalability,
    bench_integer_lexer
);

criterion_main!(validation_benches);
