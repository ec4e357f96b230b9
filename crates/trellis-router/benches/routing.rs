//! Lookup cost for the segment trie.
//!
//! `cargo bench -p trellis-router`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use http::Method;
use trellis_router::Router;

/// A table of `n` routes split evenly across static, one-capture and
/// two-capture shapes, plus one catch-all.
fn table(n: usize) -> Router<usize> {
    let mut router = Router::new();
    let per_shape = n / 3;
    for i in 0..per_shape {
        let shapes = [
            format!("/api/v1/resource{i}"),
            format!("/api/v1/resource{i}/:id"),
            format!("/api/v1/org/:org/resource{i}/:id"),
        ];
        for (shape, pattern) in shapes.iter().enumerate() {
            router
                .add_route(Method::GET, pattern, shape * per_shape + i)
                .expect("generated patterns are valid");
        }
    }
    router
        .add_route(Method::GET, "/static/*filepath", n)
        .expect("catch-all is valid");
    router
}

fn lookups(c: &mut Criterion) {
    let router = table(100);
    let cases = [
        ("static", "/api/v1/resource20"),
        ("param", "/api/v1/resource25/12345"),
        ("two_params", "/api/v1/org/acme-corp/resource10/12345"),
        ("wildcard", "/static/js/vendor/app.min.js"),
        ("miss", "/api/v1/nonexistent/path/deep"),
    ];

    let mut group = c.benchmark_group("lookup");
    for (name, path) in cases {
        group.bench_function(name, |b| {
            b.iter(|| black_box(router.get_route(&Method::GET, black_box(path))));
        });
    }
    group.finish();
}

fn table_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_size");
    for n in [10, 100, 1000] {
        let router = table(n);
        let deepest = format!("/api/v1/org/acme/resource{}/42", n / 6);
        group.bench_with_input(BenchmarkId::from_parameter(n), &deepest, |b, path| {
            b.iter(|| black_box(router.get_route(&Method::GET, path)));
        });
    }
    group.finish();
}

criterion_group!(benches, lookups, table_size);
criterion_main!(benches);
