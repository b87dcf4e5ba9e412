use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_toml_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("toml_parsing");

    // Generate question set TOML strings of various sizes
    let small_toml = generate_question_set_toml(5);
    let medium_toml = generate_question_set_toml(50);
    let large_toml = generate_question_set_toml(200);

    group.bench_function("5_questions", |b| {
        b.iter(|| {
            quizflow_core::parser::parse_question_set_str(
                black_box(&small_toml),
                black_box("bench.toml".as_ref()),
            )
        })
    });

    group.bench_function("50_questions", |b| {
        b.iter(|| {
            quizflow_core::parser::parse_question_set_str(
                black_box(&medium_toml),
                black_box("bench.toml".as_ref()),
            )
        })
    });

    group.bench_function("200_questions", |b| {
        b.iter(|| {
            quizflow_core::parser::parse_question_set_str(
                black_box(&large_toml),
                black_box("bench.toml".as_ref()),
            )
        })
    });

    group.finish();
}

fn bench_flow_building(c: &mut Criterion) {
    let set = quizflow_core::parser::parse_question_set_str(
        &generate_question_set_toml(200),
        "bench.toml".as_ref(),
    )
    .expect("bench question set parses");

    c.bench_function("flow_from_200_flat_questions", |b| {
        b.iter(|| quizflow_core::Flow::from_question_set(black_box(&set)))
    });
}

fn generate_question_set_toml(n: usize) -> String {
    let mut s = String::new();
    s.push_str(
        r#"[question_set]
id = "bench"
name = "Benchmark"
"#,
    );
    for i in 0..n {
        let category = i % 7;
        if i % 2 == 0 {
            s.push_str(&format!(
                r#"
[[questions]]
id = {i}
prompt = "Question {i}"
type = "single"
category = "category-{category}"
options = ["a", "b", "c"]
correct_answer = "b"
"#
            ));
        } else {
            s.push_str(&format!(
                r#"
[[questions]]
id = {i}
prompt = "Question {i}"
type = "text"
category = "category-{category}"
keywords = ["budget", "schedule", "share"]
"#
            ));
        }
    }
    s
}

criterion_group!(benches, bench_toml_parsing, bench_flow_building);
criterion_main!(benches);
