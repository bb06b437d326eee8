// Append and read benchmarks for string segments

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;
use std::sync::Arc;
use strseg::{
    BufferManager, ColumnFetchState, DiskOverflowWriter, InMemoryBlockManager, SegmentOptions, StringSegment,
    StringVector,
};

fn random_strings(count: usize, max_len: usize) -> Vec<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count)
        .map(|_| {
            let len = rng.random_range(0..max_len);
            (0..len).map(|_| rng.random_range(b'a'..=b'z')).collect()
        })
        .collect()
}

fn new_segment() -> StringSegment {
    let store = Arc::new(InMemoryBlockManager::new(strseg::config::DEFAULT_BLOCK_SIZE));
    let bm = Arc::new(BufferManager::new(store));
    StringSegment::new(bm, SegmentOptions::default(), 0).unwrap()
}

fn benchmark_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("append");

    for max_len in [16, 64, 256].iter() {
        let values = random_strings(1000, *max_len);
        let refs: Vec<Option<&[u8]>> = values.iter().map(|v| Some(v.as_slice())).collect();

        group.throughput(Throughput::Elements(refs.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(max_len), &refs, |b, refs| {
            b.iter(|| {
                let mut segment = new_segment();
                let appended = segment.append(refs).unwrap();
                segment.finalize_append().unwrap();
                black_box(appended);
            });
        });
    }

    group.finish();
}

fn benchmark_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");

    let values = random_strings(5000, 32);
    let refs: Vec<Option<&[u8]>> = values.iter().map(|v| Some(v.as_slice())).collect();
    let mut segment = new_segment();
    let count = segment.append(&refs).unwrap();
    segment.finalize_append().unwrap();

    group.throughput(Throughput::Elements(count as u64));
    group.bench_function("sequential", |b| {
        b.iter(|| {
            let state = segment.init_scan().unwrap();
            let mut result = StringVector::with_len(count);
            segment.scan(&state, count, &mut result).unwrap();
            black_box(result);
        });
    });

    group.bench_function("fetch_row", |b| {
        let mut rng = StdRng::seed_from_u64(7);
        b.iter(|| {
            let mut state = ColumnFetchState::new();
            let mut result = StringVector::with_len(1);
            let row = rng.random_range(0..count as u64);
            segment.fetch_row(&mut state, row, &mut result, 0).unwrap();
            black_box(result);
        });
    });

    group.finish();
}

fn benchmark_overflow(c: &mut Criterion) {
    let mut group = c.benchmark_group("overflow");
    let value = b"large overflow value ".repeat(1000);

    group.throughput(Throughput::Bytes(value.len() as u64));
    group.bench_function("memory_chain", |b| {
        let mut segment = new_segment();
        segment.append(&[Some(value.as_slice())]).unwrap();
        let location = segment.locate_row(0).unwrap();
        b.iter(|| black_box(segment.read_overflow(location.block_id, location.offset).unwrap()));
    });

    group.bench_function("disk_gzip", |b| {
        let store = Arc::new(InMemoryBlockManager::new(strseg::config::DEFAULT_BLOCK_SIZE));
        let bm = Arc::new(BufferManager::new(store));
        let options = SegmentOptions::default();
        let writer = Box::new(DiskOverflowWriter::new(bm.clone(), options.overflow_compression));
        let mut segment = StringSegment::with_overflow_writer(bm, options, 0, writer).unwrap();
        segment.append(&[Some(value.as_slice())]).unwrap();
        segment.flush_overflow().unwrap();
        let location = segment.locate_row(0).unwrap();
        b.iter(|| black_box(segment.read_overflow(location.block_id, location.offset).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, benchmark_append, benchmark_scan, benchmark_overflow);
criterion_main!(benches);
