use criterion::{black_box, criterion_group, criterion_main, Criterion};
use spartan_games::models::{default_rules, InputType, SubmissionValue};
use spartan_games::services::scoring::score;

fn benchmark_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("score_submission");

    group.bench_function("number_with_teammate", |b| {
        b.iter(|| {
            score(
                black_box(10.0),
                black_box(15),
                InputType::Number,
                black_box(&SubmissionValue::Number(2.5)),
                true,
                black_box(1.0),
            )
        })
    });

    group.bench_function("text_entry", |b| {
        let value = SubmissionValue::Text("Spartan Sprint".to_string());
        b.iter(|| {
            score(
                black_box(10.0),
                black_box(15),
                InputType::Text,
                black_box(&value),
                false,
                black_box(1.0),
            )
        })
    });

    group.bench_function("boolean_checked", |b| {
        b.iter(|| {
            score(
                black_box(10.0),
                black_box(15),
                InputType::Boolean,
                black_box(&SubmissionValue::Boolean(true)),
                false,
                black_box(1.0),
            )
        })
    });

    group.finish();
}

fn benchmark_score_default_table(c: &mut Criterion) {
    let rules = default_rules("2026-08-24T00:00:00Z");

    c.bench_function("score_whole_default_table", |b| {
        b.iter(|| {
            for r in &rules {
                let value = match r.input_type {
                    InputType::Number => SubmissionValue::Number(3.0),
                    InputType::Text => SubmissionValue::Text("entry".to_string()),
                    InputType::Boolean => SubmissionValue::Boolean(true),
                };
                let _ = score(
                    black_box(r.points_per_unit),
                    black_box(r.teammate_bonus),
                    r.input_type,
                    &value,
                    false,
                    1.0,
                );
            }
        })
    });
}

criterion_group!(benches, benchmark_score, benchmark_score_default_table);
criterion_main!(benches);
