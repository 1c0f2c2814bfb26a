use criterion::*;
use std::collections::HashMap;
use std::sync::Arc;
use synchronized_map::{ConcurrentMap, ExecutionContext};


fn populated(len: usize) -> ConcurrentMap<usize> {
    let context = Arc::new(ExecutionContext::new("bench.throughput"));
    let initial: HashMap<String, usize> = (0..len).map(|i| (i.to_string(), i)).collect();
    ConcurrentMap::with_context_and_map(context, initial)
}

fn concurrent_reads(map: &ConcurrentMap<usize>, ops: usize){
    let len = map.count();
    map.context().concurrent_perform(ops, |i| {
        black_box(map.get(&(i % len).to_string()));
    });
}

fn concurrent_writes(map: &ConcurrentMap<usize>, ops: usize){
    let len = map.count();
    map.context().concurrent_perform(ops, |i| {
        map.put_or_update((i % len).to_string(), i);
    });
}

fn concurrent_merges(map: &ConcurrentMap<usize>, ops: usize){
    map.context().concurrent_perform(ops / 100, |i| {
        map.merge((0..100).map(|k| (k.to_string(), i)));
    });
}


fn bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("map-throughput");
    let map = populated(1000);
    for ops in [100000u64].iter() {
            group.throughput(Throughput::Elements(*ops));
            group.bench_with_input(BenchmarkId::new("reads", ops), ops, 
                |b, ops| b.iter(|| concurrent_reads(&map, *ops as usize)));

            group.bench_with_input(BenchmarkId::new("writes", ops), ops, 
                |b, ops| b.iter(|| concurrent_writes(&map, *ops as usize)));

            group.bench_with_input(BenchmarkId::new("merges", ops), ops, 
                |b, ops| b.iter(|| concurrent_merges(&map, *ops as usize)));
        }

    group.finish();
}

criterion_group!(benches, bench);
criterion_main!(benches);
