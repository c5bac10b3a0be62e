use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mparith_math::{add, div, exp, get_current, mul, ladder, Context, Kind, NumericValue, Real};

fn dispatch_benchmark(c: &mut Criterion) {
    c.bench_function("ladder selection", |b| {
        b.iter(|| ladder(black_box(Kind::Rational), black_box(Kind::Real)))
    });

    c.bench_function("current context lookup", |b| b.iter(|| black_box(get_current())));
}

fn arithmetic_benchmark(c: &mut Criterion) {
    let x = NumericValue::Real(Real::from_f64(1.5));
    let third = NumericValue::rational(1, 3).unwrap();

    c.bench_function("integer addition", |b| {
        let mut ctx = Context::new();
        b.iter(|| add(black_box(12345), black_box(67890), Some(&mut ctx)))
    });

    c.bench_function("real times small integer", |b| {
        let mut ctx = Context::new();
        b.iter(|| mul(black_box(&x), black_box(7), Some(&mut ctx)))
    });

    c.bench_function("real plus rational", |b| {
        let mut ctx = Context::new();
        b.iter(|| add(black_box(&x), black_box(&third), Some(&mut ctx)))
    });

    c.bench_function("integer true division at 256 bits", |b| {
        let mut ctx = Context::new();
        ctx.set_precision(256).unwrap();
        b.iter(|| div(black_box(1), black_box(3), Some(&mut ctx)))
    });

    c.bench_function("exp with implicit context", |b| b.iter(|| exp(black_box(&x), None)));
}

criterion_group!(benches, dispatch_benchmark, arithmetic_benchmark);
criterion_main!(benches);
