//! E2E Test Suite: Wire-Format Scenarios
//!
//! Pinned, externally-observable behaviors: the empty stream, tiny inputs
//! with known checksums, run-length compression, stored-block framing at
//! level 0 (including the oversized-slab two-call finish), and the
//! level-1-vs-level-9 size ordering on a large text corpus.

extern crate zflate;

use miniz_oxide::inflate::decompress_to_vec;
use zflate::{deflate_to_vec, DeflateEngine};

fn xorshift(state: &mut u64) -> u64 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    *state = x;
    x
}

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
    }
    out.truncate(len);
    out
}

fn drive(engine: &mut DeflateEngine, input: &[u8]) -> Vec<u8> {
    engine.set_input(input).expect("input accepted");
    let mut out = Vec::new();
    let mut chunk = [0u8; 4096];
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
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario 1: empty input
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn empty_input_emits_one_empty_final_block() {
    let mut engine = DeflateEngine::new();
    let out = drive(&mut engine, b"");
    assert_eq!(out, vec![0x03, 0x00], "empty fixed-Huffman final block");
    assert_eq!(engine.adler(), 0x0000_0001);
    assert!(decompress_to_vec(&out).expect("inflate").is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario 2: a single byte
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn single_byte_roundtrip_and_checksum() {
    let mut engine = DeflateEngine::new();
    let out = drive(&mut engine, b"a");
    assert_eq!(decompress_to_vec(&out).expect("inflate"), b"a");
    assert_eq!(engine.adler(), 0x0062_0062);
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario 3: a ten-byte run
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn short_run_becomes_literal_plus_backreference() {
    let input = b"aaaaaaaaaa";
    let out = deflate_to_vec(input, 6).expect("compression");
    assert_eq!(decompress_to_vec(&out).expect("inflate"), input);
    // One literal, one length-9/distance-1 reference, EOB: strictly fewer
    // bits than the 80 raw input bits. As a static block that is 30 bits.
    assert!(
        out.len() * 8 < input.len() * 8,
        "run must compress below 8 bits/byte, got {} bytes",
        out.len()
    );
    assert_eq!(out[0] & 0b111, 0b011, "final static-Huffman block expected");
    assert_eq!(out.len(), 4);
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario 4: 64 KiB of zeros at maximum compression
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn zeros_compress_to_under_one_hundred_bytes() {
    let input = vec![0u8; 64 * 1024];
    let out = deflate_to_vec(&input, 9).expect("compression");
    assert!(out.len() < 100, "64 KiB of zeros took {} bytes", out.len());
    assert_eq!(decompress_to_vec(&out).expect("inflate"), input);
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario 5: level ordering on a large text corpus
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn level_nine_beats_level_one_on_text() {
    let data = text_corpus(256 * 1024, 0xB00C);
    let fast = deflate_to_vec(&data, 1).expect("compression");
    let best = deflate_to_vec(&data, 9).expect("compression");
    assert!(
        best.len() < fast.len(),
        "level 9 ({}) must be strictly smaller than level 1 ({})",
        best.len(),
        fast.len()
    );
    assert_eq!(decompress_to_vec(&fast).expect("inflate"), data);
    assert_eq!(decompress_to_vec(&best).expect("inflate"), data);
}

// ─────────────────────────────────────────────────────────────────────────────
// Level 0: stored-block framing
// ─────────────────────────────────────────────────────────────────────────────

/// Walk a byte-aligned stored-block stream, returning the concatenated
/// payloads. Panics on malformed framing.
fn parse_stored_stream(mut data: &[u8]) -> Vec<u8> {
    let mut payload = Vec::new();
    loop {
        let header = data[0];
        assert_eq!(header & 0b110, 0, "BTYPE must be 00 in a stored stream");
        let last = header & 1 == 1;
        let len = u16::from_le_bytes([data[1], data[2]]) as usize;
        let nlen = u16::from_le_bytes([data[3], data[4]]);
        assert_eq!(!(len as u16), nlen, "NLEN must be the complement of LEN");
        payload.extend_from_slice(&data[5..5 + len]);
        data = &data[5 + len..];
        if last {
            assert!(data.is_empty(), "trailing bytes after the final block");
            return payload;
        }
    }
}

#[test]
fn level_zero_emits_only_stored_blocks() {
    let data = text_corpus(150_000, 0x51ED);
    let out = deflate_to_vec(&data, 0).expect("compression");
    assert_eq!(parse_stored_stream(&out), data);
    assert_eq!(decompress_to_vec(&out).expect("inflate"), data);
}

#[test]
fn oversized_stored_slab_finishes_on_a_later_call() {
    // A slab bigger than one stored block can carry: the first deflate call
    // truncates and reports further progress even though finish was
    // requested; a later call emits the final block.
    let data = vec![0x42u8; 70_000];
    let mut engine = DeflateEngine::new();
    engine.set_level(0).expect("level 0");
    engine.set_input(&data).expect("input accepted");

    let mut out = Vec::new();
    let mut chunk = [0u8; 16 * 1024];
    let first = engine.deflate(true, true);
    assert!(first, "truncated stored slab must report further progress");
    let mut calls = 1;
    loop {
        loop {
            let n = engine.pending_flush(&mut chunk);
            if n == 0 {
                break;
            }
            out.extend_from_slice(&chunk[..n]);
        }
        if !engine.deflate(true, true) {
            break;
        }
        calls += 1;
        assert!(calls < 16, "stored finish must complete in a few calls");
    }
    loop {
        let n = engine.pending_flush(&mut chunk);
        if n == 0 {
            break;
        }
        out.extend_from_slice(&chunk[..n]);
    }
    assert!(calls >= 1);
    assert_eq!(parse_stored_stream(&out), data);
}
