//! Criterion benchmarks for the DEFLATE engine.
//!
//! Run with:
//!   cargo bench --bench deflate
//!
//! Synthetic corpora only: a word-soup text chunk (match-heavy) and a
//! high-entropy chunk (literal-heavy), compressed at the three
//! representative levels (fast / default / best).

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use zflate::deflate_to_vec;

fn xorshift(state: &mut u64) -> u64 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    *state = x;
    x
}

fn text_chunk(len: usize) -> Vec<u8> {
    const WORDS: [&str; 16] = [
        "window", "deflate", "huffman", "stream", "block", "literal", "match", "distance",
        "length", "hash", "chain", "lazy", "stored", "static", "dynamic", "checksum",
    ];
    let mut state = 0x5EEDu64;
    let mut out = Vec::with_capacity(len + 16);
    while out.len() < len {
        out.extend_from_slice(WORDS[(xorshift(&mut state) % 16) as usize].as_bytes());
        out.push(b' ');
    }
    out.truncate(len);
    out
}

fn entropy_chunk(len: usize) -> Vec<u8> {
    let mut state = 0xE27B0u64;
    (0..len).map(|_| (xorshift(&mut state) >> 32) as u8).collect()
}

fn bench_deflate_levels(c: &mut Criterion) {
    let mut group = c.benchmark_group("deflate_levels");

    for &chunk_size in &[65_536usize, 262_144] {
        let text = text_chunk(chunk_size);
        let entropy = entropy_chunk(chunk_size);

        for &level in &[1u32, 6, 9] {
            group.throughput(Throughput::Bytes(chunk_size as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("text_level_{level}"), chunk_size),
                &text,
                |b, data| b.iter(|| deflate_to_vec(data, level).unwrap()),
            );
            group.throughput(Throughput::Bytes(chunk_size as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("entropy_level_{level}"), chunk_size),
                &entropy,
                |b, data| b.iter(|| deflate_to_vec(data, level).unwrap()),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_deflate_levels);
criterion_main!(benches);
