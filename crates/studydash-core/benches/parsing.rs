use criterion::{black_box, criterion_group, criterion_main, Criterion};

use studydash_core::validator::{parse_model_output, strip_fences};

fn bench_strip_fences(c: &mut Criterion) {
    let mut group = c.benchmark_group("strip_fences");

    let fenced = "```json\n{\"type\":\"chat\",\"reply\":\"hi\"}\n```";
    let clean = r#"{"type":"chat","reply":"hi"}"#;

    group.bench_function("fenced", |b| b.iter(|| strip_fences(black_box(fenced))));
    group.bench_function("clean", |b| b.iter(|| strip_fences(black_box(clean))));

    group.finish();
}

fn bench_parse_model_output(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_model_output");

    let chat = "```json\n{\"type\":\"chat\",\"reply\":\"Plants turn light into sugar.\"}\n```";
    let quiz = generate_quiz_json(5);
    let large_quiz = generate_quiz_json(100);
    let garbage = "Sure! Here is a quiz about the water cycle, hope you enjoy it.";

    group.bench_function("chat", |b| {
        b.iter(|| parse_model_output(black_box(chat)))
    });

    group.bench_function("quiz_5", |b| {
        b.iter(|| parse_model_output(black_box(&quiz)))
    });

    group.bench_function("quiz_100", |b| {
        b.iter(|| parse_model_output(black_box(&large_quiz)))
    });

    group.bench_function("fallback", |b| {
        b.iter(|| parse_model_output(black_box(garbage)))
    });

    group.finish();
}

fn generate_quiz_json(n: usize) -> String {
    let questions: Vec<String> = (0..n)
        .map(|i| {
            format!(
                r#"{{"question":"Question {i}?","options":["A{i}","B{i}","C{i}","D{i}"],"correct":"A{i}"}}"#
            )
        })
        .collect();
    format!(
        "```json\n{{\"type\":\"quiz\",\"subject\":\"Bench\",\"questions\":[{}]}}\n```",
        questions.join(",")
    )
}

criterion_group!(benches, bench_strip_fences, bench_parse_model_output);
criterion_main!(benches);
