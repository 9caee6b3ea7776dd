use criterion::{Criterion, criterion_group, criterion_main};
use repo_query::{
    condition::Condition,
    method_name,
    translate::{self, Dialect},
    value::Value,
};
use strum::IntoEnumIterator;

fn condition() -> Condition {
    let plan = method_name::parse("findByNameStartingWithOrAgeBetweenAndTagsInAndActiveNot")
        .expect("a valid name");
    plan.instantiate(&[
        "Ada".into(),
        Value::Int(20),
        Value::Int(30),
        vec!["x", "y", "z"].into(),
        true.into(),
    ])
    .expect("a condition")
}

fn criterion_benchmark(c: &mut Criterion) {
    let condition = condition();
    for dialect in Dialect::iter() {
        c.bench_function(&format!("translate to {dialect}"), |b| {
            b.iter(|| translate::translate(dialect, &condition, &[]))
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
