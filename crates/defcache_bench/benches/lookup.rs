//! Indexed lookup benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use defcache_bench::{fuels, item_id, tags};
use defcache_core::{InvalidationBroadcaster, InvalidationCause};
use defcache_defs::{DataManager, Fuel, ItemDefinition, ItemStack, TagRegistry};
use std::sync::Arc;

fn manager(count: usize, items: usize) -> (Arc<TagRegistry>, DataManager<Fuel>) {
    let broadcaster = InvalidationBroadcaster::shared();
    let tag_registry = Arc::new(TagRegistry::new(&broadcaster));
    tag_registry.replace(tags(items)).unwrap();
    let manager = DataManager::new(&broadcaster, &tag_registry);
    manager
        .replace(fuels(count, items), InvalidationCause::DataReload)
        .unwrap();
    (tag_registry, manager)
}

/// Benchmark indexed lookups against a linear scan of the same data.
fn bench_lookup_vs_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");

    for count in [64, 512, 4096].iter() {
        let items = count / 2;
        let (tag_registry, manager) = manager(*count, items);
        let stacks: Vec<ItemStack> = (0..items).map(|i| ItemStack::of(item_id(i))).collect();
        manager.summary().unwrap();

        group.throughput(Throughput::Elements(stacks.len() as u64));
        group.bench_with_input(BenchmarkId::new("indexed", count), &stacks, |b, stacks| {
            b.iter(|| {
                for stack in stacks {
                    black_box(manager.get(black_box(stack)).unwrap());
                }
            });
        });

        let values = manager.values().unwrap();
        group.bench_with_input(BenchmarkId::new("linear_scan", count), &stacks, |b, stacks| {
            let snapshot = tag_registry.snapshot();
            b.iter(|| {
                for stack in stacks {
                    black_box(values.iter().find(|fuel| fuel.matches(black_box(stack), &snapshot)));
                }
            });
        });
    }

    group.finish();
}

/// Benchmark the first lookup after an invalidation.
fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("rebuild");

    for count in [64, 512, 4096].iter() {
        let (_tags, manager) = manager(*count, count / 2);
        let stack = ItemStack::of(item_id(0));

        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| {
                manager.index().invalidate();
                black_box(manager.get(&stack).unwrap());
            });
        });
    }

    group.finish();
}

/// Benchmark broadcasting to many subscribed indexes.
fn bench_notify(c: &mut Criterion) {
    let mut group = c.benchmark_group("notify");

    for subscribers in [1, 16, 256].iter() {
        let broadcaster = InvalidationBroadcaster::shared();
        let tag_registry = Arc::new(TagRegistry::new(&broadcaster));
        let managers: Vec<DataManager<Fuel>> = (0..*subscribers)
            .map(|_| DataManager::new(&broadcaster, &tag_registry))
            .collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(subscribers),
            subscribers,
            |b, _| {
                b.iter(|| broadcaster.notify(black_box(InvalidationCause::Manual)));
            },
        );
        drop(managers);
    }

    group.finish();
}

criterion_group!(benches, bench_lookup_vs_scan, bench_rebuild, bench_notify);
criterion_main!(benches);
