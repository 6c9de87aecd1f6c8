//! Benchmarks for the byte-at-a-time hot path.

use criterion::{Criterion, criterion_group, criterion_main};
use oxibyte_core::CompressionLevel;
use oxibyte_stream::{InputStream, OutputStream};
use std::hint::black_box;

const SIZE: usize = 1 << 20;

fn bench_push(c: &mut Criterion) {
    c.bench_function("push_1mb_memory", |b| {
        b.iter(|| {
            let mut out = OutputStream::new();
            for i in 0..SIZE {
                out.push(i as u8).unwrap();
            }
            black_box(out.finish_into_vec().unwrap())
        })
    });

    c.bench_function("push_1mb_compressed", |b| {
        b.iter(|| {
            let mut out = OutputStream::with_level(CompressionLevel::FAST);
            for i in 0..SIZE {
                out.push(i as u8).unwrap();
            }
            black_box(out.finish_into_vec().unwrap())
        })
    });
}

fn bench_next(c: &mut Criterion) {
    let data: Vec<u8> = (0..SIZE).map(|i| i as u8).collect();

    c.bench_function("next_1mb_memory", |b| {
        b.iter(|| {
            let mut stream = InputStream::from_slice(&data);
            let mut sum = 0u64;
            while !stream.is_eof().unwrap() {
                sum += u64::from(stream.next());
            }
            black_box(sum)
        })
    });
}

criterion_group!(benches, bench_push, bench_next);
criterion_main!(benches);
