//! Sync packet benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use defcache_bench::fuels;
use defcache_defs::{decode_packet, encode_packet, Fuel};
use std::sync::Arc;

/// Benchmark encoding and decoding fuel packets.
fn bench_packets(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync_packet");

    for count in [16, 256, 4096].iter() {
        let definitions: Vec<Arc<Fuel>> =
            fuels(*count, count / 2).into_iter().map(Arc::new).collect();
        let packet = encode_packet(&definitions).unwrap();

        group.throughput(Throughput::Bytes(packet.len() as u64));
        group.bench_with_input(BenchmarkId::new("encode", count), &definitions, |b, definitions| {
            b.iter(|| black_box(encode_packet(black_box(definitions)).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("decode", count), &packet, |b, packet| {
            b.iter(|| black_box(decode_packet::<Fuel>(black_box(packet)).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_packets);
criterion_main!(benches);
