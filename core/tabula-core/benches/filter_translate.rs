// Filter translation and in-memory scan benchmarks
//
// Section 1: condition tree -> filter string
// Section 2: filtered scan through the adapter

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::sync::Arc;
use tabula_core::{
    Condition, DataType, InMemoryTableService, InsertOptions, ModelDefinition, ModelInstance,
    ModelRegistry, Query, TableAdapter, translate,
};

fn wide_and(width: usize) -> Condition {
    Condition::and(
        (0..width)
            .map(|i| Condition::eq(format!("field{i}"), i as i64))
            .collect(),
    )
}

fn nested(depth: usize) -> Condition {
    let mut cond = Condition::like("name", "%abc%");
    for i in 0..depth {
        let sibling = Condition::is_in(format!("f{i}"), vec![1, 2, 3]);
        cond = if i % 2 == 0 {
            Condition::or(vec![cond, sibling, Condition::gt("age", i as i64)])
        } else {
            Condition::and(vec![cond, sibling])
        };
    }
    cond
}

// ═══════════════════════════════════════════════════════════════════════════
// Section 1: translation
// ═══════════════════════════════════════════════════════════════════════════

fn bench_translate(c: &mut Criterion) {
    let mut group = c.benchmark_group("translate");

    for width in [4, 32, 256] {
        let cond = wide_and(width);
        group.bench_with_input(BenchmarkId::new("wide_and", width), &cond, |b, cond| {
            b.iter(|| translate(black_box(cond)).unwrap().to_filter_string())
        });
    }

    for depth in [2, 8, 16] {
        let cond = nested(depth);
        group.bench_with_input(BenchmarkId::new("nested", depth), &cond, |b, cond| {
            b.iter(|| translate(black_box(cond)).unwrap().to_filter_string())
        });
    }

    let members: Vec<i64> = (0..100).collect();
    let cond = Condition::is_in("id", members);
    group.bench_function("in_100", |b| {
        b.iter(|| translate(black_box(&cond)).unwrap().to_filter_string())
    });

    group.finish();
}

// ═══════════════════════════════════════════════════════════════════════════
// Section 2: scan
// ═══════════════════════════════════════════════════════════════════════════

fn bench_scan(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let registry = Arc::new(ModelRegistry::new());
    registry.register(
        ModelDefinition::new("Person")
            .property("name", DataType::String)
            .property("age", DataType::Int),
    );
    let adapter = TableAdapter::new(InMemoryTableService::new(), registry);

    rt.block_on(async {
        adapter.create_table("Person").await.unwrap();
        let people: Vec<ModelInstance> = (0..1_000)
            .map(|i| {
                ModelInstance::new("Person")
                    .with_id(format!("p{i:04}"))
                    .set("name", format!("name{i}"))
                    .set("age", (i % 90) as i64)
            })
            .collect();
        adapter
            .insert(people, &InsertOptions::default())
            .await
            .unwrap();
    });

    let query = Query::new("Person").filter(Condition::and(vec![
        Condition::ge("age", 30),
        Condition::like("name", "name1%"),
    ]));

    c.bench_function("scan_1000", |b| {
        b.to_async(&rt)
            .iter(|| async { adapter.load(black_box(&query)).await.unwrap() })
    });
}

criterion_group!(benches, bench_translate, bench_scan);
criterion_main!(benches);
