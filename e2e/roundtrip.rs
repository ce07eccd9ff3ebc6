//! E2E Test Suite: Round-Trip
//!
//! Compresses deterministic PRNG corpora at every level and strategy, then
//! inflates the result with an independent decoder (`miniz_oxide`) and
//! checks byte-exact recovery. Also covers determinism, bounded
//! termination, and total-in accounting.

extern crate zflate;

use miniz_oxide::inflate::decompress_to_vec;
use zflate::{deflate_to_vec, deflate_to_vec_with, DeflateEngine, Strategy};

// ─────────────────────────────────────────────────────────────────────────────
// Deterministic corpora
// ─────────────────────────────────────────────────────────────────────────────

fn xorshift(state: &mut u64) -> u64 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    *state = x;
    x
}

/// English-ish word soup: compressible, with enough repetition to exercise
/// the match finder at every level.
fn text_corpus(len: usize, seed: u64) -> Vec<u8> {
    const WORDS: [&str; 16] = [
        "window", "deflate", "huffman", "stream", "block", "literal", "match", "distance",
        "length", "hash", "chain", "lazy", "stored", "static", "dynamic", "checksum",
    ];
    let mut state = seed | 1;
    let mut out = Vec::with_capacity(len + 16);
    while out.len() < len {
        let w = WORDS[(xorshift(&mut state) % WORDS.len() as u64) as usize];
        out.extend_from_slice(w.as_bytes());
        out.push(b' ');
        if xorshift(&mut state) % 13 == 0 {
            out.push(b'\n');
        }
    }
    out.truncate(len);
    out
}

/// High-entropy bytes: nearly incompressible, stresses the literal path and
/// the stored-vs-huffman block decision.
fn binary_corpus(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed | 1;
    (0..len).map(|_| (xorshift(&mut state) >> 32) as u8).collect()
}

/// Structured low-entropy bytes: long runs and periodic patterns, the
/// worst case for chain walking.
fn patterned_corpus(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed | 1;
    let mut out = Vec::with_capacity(len + 64);
    while out.len() < len {
        match xorshift(&mut state) % 3 {
            0 => {
                let b = (xorshift(&mut state) >> 8) as u8;
                let run = 3 + (xorshift(&mut state) % 500) as usize;
                out.extend(std::iter::repeat(b).take(run));
            }
            1 => {
                let period = 1 + (xorshift(&mut state) % 9) as usize;
                let reps = 2 + (xorshift(&mut state) % 60) as usize;
                let unit: Vec<u8> = (0..period)
                    .map(|_| (xorshift(&mut state) >> 16) as u8)
                    .collect();
                for _ in 0..reps {
                    out.extend_from_slice(&unit);
                }
            }
            _ => {
                let n = 1 + (xorshift(&mut state) % 40) as usize;
                for _ in 0..n {
                    out.push((xorshift(&mut state) >> 24) as u8);
                }
            }
        }
    }
    out.truncate(len);
    out
}

fn assert_roundtrip(data: &[u8], level: u32, what: &str) {
    let compressed = deflate_to_vec(data, level).expect("compression should succeed");
    let decompressed = decompress_to_vec(&compressed).unwrap_or_else(|e| {
        panic!("inflate failed for {what} at level {level}: {e:?}");
    });
    assert_eq!(
        decompressed, data,
        "round-trip mismatch for {what} at level {level} ({} bytes)",
        data.len()
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Round-trips across levels and corpora
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn roundtrip_text_all_levels() {
    for &len in &[0usize, 1, 2, 100, 4_096, 65_536, 200_000] {
        let data = text_corpus(len, 0xDEC0DE);
        for level in 0..=9 {
            assert_roundtrip(&data, level, "text corpus");
        }
    }
}

#[test]
fn roundtrip_incompressible_all_levels() {
    for &len in &[1usize, 513, 70_000] {
        let data = binary_corpus(len, 0xFEED);
        for level in 0..=9 {
            assert_roundtrip(&data, level, "binary corpus");
        }
    }
}

#[test]
fn roundtrip_patterned_all_levels() {
    for &len in &[300usize, 10_000, 150_000] {
        let data = patterned_corpus(len, 0xBEEF);
        for level in 0..=9 {
            assert_roundtrip(&data, level, "patterned corpus");
        }
    }
}

#[test]
fn roundtrip_one_mebibyte_spans_many_window_slides() {
    let data = patterned_corpus(1 << 20, 0xCAFE);
    for level in [0u32, 1, 6, 9] {
        assert_roundtrip(&data, level, "1 MiB corpus");
    }
}

#[test]
fn roundtrip_all_strategies() {
    let data = text_corpus(50_000, 0x5EED);
    for level in [1u32, 6, 9] {
        for strategy in [Strategy::Default, Strategy::Filtered, Strategy::HuffmanOnly] {
            let compressed =
                deflate_to_vec_with(&data, level, strategy, None).expect("compression");
            let decompressed = decompress_to_vec(&compressed)
                .unwrap_or_else(|e| panic!("inflate failed for {strategy:?}: {e:?}"));
            assert_eq!(
                decompressed, data,
                "round-trip mismatch at level {level} with {strategy:?}"
            );
        }
    }
}

#[test]
fn huffman_only_still_compresses_text() {
    // No back-references at all, but literal statistics alone should beat
    // the identity encoding on text.
    let data = text_corpus(40_000, 0xA11CE);
    let compressed =
        deflate_to_vec_with(&data, 6, Strategy::HuffmanOnly, None).expect("compression");
    assert!(compressed.len() < data.len());
    assert_eq!(decompress_to_vec(&compressed).expect("inflate"), data);
}

// ─────────────────────────────────────────────────────────────────────────────
// Determinism
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn identical_configurations_produce_identical_output() {
    let data = text_corpus(80_000, 0xD0D0);
    for level in [0u32, 3, 6, 9] {
        let a = deflate_to_vec(&data, level).expect("compression");
        let b = deflate_to_vec(&data, level).expect("compression");
        assert_eq!(a, b, "nondeterministic output at level {level}");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Termination and accounting
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn finish_loop_terminates_in_bounded_steps() {
    let data = patterned_corpus(400_000, 0x7E57);
    let mut engine = DeflateEngine::new();
    engine.set_input(&data).expect("fresh engine takes input");

    let mut out = Vec::new();
    let mut chunk = [0u8; 8192];
    let mut calls = 0usize;
    loop {
        calls += 1;
        assert!(
            calls < data.len() / 1024 + 64,
            "deflate loop did not terminate in O(n) steps"
        );
        let more = engine.deflate(true, true);
        loop {
            let n = engine.pending_flush(&mut chunk);
            if n == 0 {
                break;
            }
            out.extend_from_slice(&chunk[..n]);
        }
        if !more {
            break;
        }
    }
    // The final call reported no further progress and everything decodes.
    assert!(engine.pending_is_flushed());
    assert_eq!(decompress_to_vec(&out).expect("inflate"), data);
    assert_eq!(engine.total_in(), data.len() as u64);
}

#[test]
fn total_in_counts_every_consumed_byte() {
    let data = text_corpus(123_457, 0x70A1);
    let mut engine = DeflateEngine::new();
    let mut out = Vec::new();
    let mut chunk = [0u8; 4096];

    for piece in data.chunks(10_000) {
        engine.set_input(piece).expect("previous input consumed");
        while !engine.needs_input() {
            engine.deflate(false, false);
            loop {
                let n = engine.pending_flush(&mut chunk);
                if n == 0 {
                    break;
                }
                out.extend_from_slice(&chunk[..n]);
            }
        }
    }
    loop {
        let more = engine.deflate(true, true);
        loop {
            let n = engine.pending_flush(&mut chunk);
            if n == 0 {
                break;
            }
            out.extend_from_slice(&chunk[..n]);
        }
        if !more {
            break;
        }
    }

    assert_eq!(engine.total_in(), data.len() as u64);
    assert_eq!(decompress_to_vec(&out).expect("inflate"), data);
}
