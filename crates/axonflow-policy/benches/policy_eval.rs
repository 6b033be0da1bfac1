//! Policy engine throughput, mirroring the shape of the gate's own
//! policy-check benchmarks but driving the real catalog and cache
//! instead of a toy string match.
//!
//! Run with: cargo bench

use axonflow_policy::catalog::{SYSTEM_DYNAMIC_POLICIES, SYSTEM_STATIC_POLICIES};
use axonflow_policy::repository::{InMemoryPolicyStore, PolicyRow};
use axonflow_policy::PolicyEngine;
use axonflow_types::TenantId;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::runtime::Runtime;

fn seeded_engine() -> PolicyEngine {
    let mut store = InMemoryPolicyStore::default();
    store.system.extend(SYSTEM_STATIC_POLICIES.iter().cloned().map(PolicyRow::Static));
    store.system.extend(SYSTEM_DYNAMIC_POLICIES.iter().cloned().map(PolicyRow::Dynamic));
    let store = Arc::new(store);
    PolicyEngine::new(store.clone(), store)
}

fn benchmark_cold_cache_load(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    c.bench_function("get_effective_cold_cache", |b| {
        b.iter_batched(
            seeded_engine,
            |engine| rt.block_on(async { engine.get_effective(&TenantId::from("acme"), None).await.unwrap() }),
            criterion::BatchSize::SmallInput,
        );
    });
}

fn benchmark_evaluate(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let engine = seeded_engine();
    let tenant = TenantId::from("acme");

    // prime the tenant cache outside the timed loop.
    rt.block_on(async { engine.get_effective(&tenant, None).await.unwrap() });

    let mut group = c.benchmark_group("evaluate_first_match");
    let inputs = vec![
        ("benign", "transfer 100 to account 55"),
        ("sqli", "SELECT * FROM users; DROP TABLE users;--"),
        ("pii_ssn", "customer ssn is 123-45-6789, proceed with refund"),
    ];

    for (name, input) in inputs {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(name), &input, |b, &input| {
            b.iter(|| rt.block_on(async { engine.evaluate(&tenant, None, black_box(input)).await.unwrap() }));
        });
    }
    group.finish();
}

fn benchmark_evaluate_all(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let engine = seeded_engine();
    let tenant = TenantId::from("acme");
    let context = HashMap::new();

    rt.block_on(async { engine.get_effective(&tenant, None).await.unwrap() });

    c.bench_function("evaluate_all_warm_cache", |b| {
        b.iter(|| {
            rt.block_on(async {
                engine
                    .evaluate_all(&tenant, None, black_box("SELECT * FROM orders WHERE id = 1"), "sql", &context)
                    .await
                    .unwrap()
            })
        });
    });
}

criterion_group!(benches, benchmark_cold_cache_load, benchmark_evaluate, benchmark_evaluate_all);
criterion_main!(benches);
