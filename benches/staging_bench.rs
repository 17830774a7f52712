//! Benchmarks for confbuf.
//!
//! Run with:
//!     cargo bench

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

use confbuf::{BufferConfig, StagingBuffer};

fn bench_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("round_trip");

    // Different write sizes against the default chunk size
    for write_size in [16usize, 256, 1024, 4096] {
        let total = 1024 * 1024;
        let data: Vec<u8> = (0..write_size).map(|i| (i * 7 + 13) as u8).collect();
        let mut out = vec![0u8; write_size];

        group.throughput(Throughput::Bytes(total as u64));
        group.bench_function(format!("exact_{}b", write_size), |b| {
            let mut buf = StagingBuffer::new(BufferConfig::default().with_max_chunks(usize::MAX));
            b.iter(|| {
                for _ in 0..total / write_size {
                    buf.reserve_write(write_size, false)
                        .unwrap()
                        .copy_from_slice(black_box(&data[..]));
                    black_box(buf.read_into(&mut out));
                }
            });
        });

        group.bench_function(format!("append_{}b", write_size), |b| {
            let mut buf = StagingBuffer::new(BufferConfig::default().with_max_chunks(usize::MAX));
            b.iter(|| {
                for _ in 0..total / write_size {
                    black_box(buf.append(black_box(&data[..])).unwrap());
                }
                while !buf.peek_read(usize::MAX).is_empty() {}
            });
        });
    }

    group.finish();
}

fn bench_back_pressure(c: &mut Criterion) {
    let mut group = c.benchmark_group("back_pressure");
    let data = vec![0xABu8; 64];

    // Fill to the bound, then drain, repeatedly
    group.bench_function("fill_drain_4x1k", |b| {
        let mut buf = StagingBuffer::new(BufferConfig::default());
        b.iter(|| {
            while buf.append(black_box(&data[..])).is_ok() {}
            while !buf.peek_read(black_box(100)).is_empty() {}
        });
    });

    group.finish();
}

criterion_group!(benches, bench_round_trip, bench_back_pressure);
criterion_main!(benches);
