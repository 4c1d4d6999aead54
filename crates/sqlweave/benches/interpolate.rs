use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sqlweave::{Arg, SqlBuilder, sql};

/// `select col0, col1, ... from ${t} where col0 = ? and col1 in (?) ...`
/// with every other argument a three-element list.
fn build_select(n: usize) -> SqlBuilder {
    let columns: Vec<String> = (0..n).map(|i| format!("col{i}")).collect();
    let mut q = sql("select ${cols} from ${t} where 1=1");
    for i in 0..n {
        if i % 2 == 0 {
            q.append_args(&format!("and col{i} = ?"), [Arg::from(i as i64)]);
        } else {
            q.append_args(&format!("and col{i} in (?)"), [Arg::from(vec![1_i64, 2, 3])]);
        }
    }
    q.bind_list("cols", columns)
        .and_then(|q| q.bind("t", "public.items"))
        .expect("valid bindings");
    q
}

fn bench_to_sql(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpolate/to_sql");

    for n in [1, 5, 10, 50, 100] {
        let q = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &q, |b, q| {
            b.iter(|| black_box(q.to_sql()));
        });
    }

    group.finish();
}

fn bench_debug_string(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpolate/debug_string");

    for n in [1, 10, 100] {
        let q = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &q, |b, q| {
            b.iter(|| black_box(q.to_debug_string()));
        });
    }

    group.finish();
}

fn bench_expand_large_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpolate/expand_list");

    for n in [5, 20, 100, 500] {
        let values: Vec<i64> = (0..n).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| {
                let mut q = sql!("select * from t where id in (?)", values.clone());
                black_box(q.prepare())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_to_sql,
    bench_debug_string,
    bench_expand_large_list
);
criterion_main!(benches);
