//! E2E Test Suite: Streaming API
//!
//! Chunked input via `set_input`/`needs_input`, cooperative output draining
//! through small slices, checksum prefix behavior, `reset` reuse, and
//! mid-stream `set_level` switches.

extern crate zflate;

use miniz_oxide::inflate::decompress_to_vec;
use zflate::{deflate_to_vec, DeflateEngine, DeflateError};

fn xorshift(state: &mut u64) -> u64 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    *state = x;
    x
}

fn mixed_corpus(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed | 1;
    let mut out = Vec::with_capacity(len + 64);
    while out.len() < len {
        if xorshift(&mut state) % 2 == 0 {
            let b = (xorshift(&mut state) >> 8) as u8;
            out.extend(std::iter::repeat(b).take(4 + (xorshift(&mut state) % 96) as usize));
        } else {
            for _ in 0..16 {
                out.push((xorshift(&mut state) >> 24) as u8);
            }
        }
    }
    out.truncate(len);
    out
}

/// Reference Adler-32 (RFC 1950) for cross-checking the engine's accessor.
fn adler32_reference(data: &[u8]) -> u32 {
    const MOD: u32 = 65_521;
    let mut a: u32 = 1;
    let mut b: u32 = 0;
    for chunk in data.chunks(5_552) {
        for &byte in chunk {
            a += u32::from(byte);
            b += a;
        }
        a %= MOD;
        b %= MOD;
    }
    (b << 16) | a
}

fn drain_into(engine: &mut DeflateEngine, out: &mut Vec<u8>, chunk: &mut [u8]) {
    loop {
        let n = engine.pending_flush(chunk);
        if n == 0 {
            break;
        }
        out.extend_from_slice(&chunk[..n]);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Chunked input equals one-shot output
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn chunked_input_matches_one_shot_output() {
    let data = mixed_corpus(200_000, 0xC0FFEE);
    let one_shot = deflate_to_vec(&data, 6).expect("compression");

    for chunk_size in [1usize, 7, 997, 65_536] {
        let mut engine = DeflateEngine::new();
        let mut out = Vec::new();
        let mut sink = [0u8; 4096];
        for piece in data.chunks(chunk_size) {
            engine.set_input(piece).expect("input consumed before restage");
            while !engine.needs_input() {
                engine.deflate(false, false);
                drain_into(&mut engine, &mut out, &mut sink);
            }
        }
        loop {
            let more = engine.deflate(true, true);
            drain_into(&mut engine, &mut out, &mut sink);
            if !more {
                break;
            }
        }
        assert_eq!(
            out, one_shot,
            "chunked ({chunk_size}-byte pieces) and one-shot streams must be identical"
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tiny output slices
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn seven_byte_output_slices_lose_nothing() {
    let data = mixed_corpus(60_000, 0x0DD);
    let mut engine = DeflateEngine::new();
    engine.set_input(&data).expect("input accepted");

    let mut out = Vec::new();
    let mut sink = [0u8; 7];
    loop {
        let more = engine.deflate(true, true);
        drain_into(&mut engine, &mut out, &mut sink);
        if !more {
            break;
        }
    }
    assert_eq!(decompress_to_vec(&out).expect("inflate"), data);
}

// ─────────────────────────────────────────────────────────────────────────────
// Input staging contract
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn restaging_unconsumed_input_is_an_error() {
    let mut engine = DeflateEngine::new();
    engine.set_input(b"first slice of input").expect("fresh engine");
    assert_eq!(
        engine.set_input(b"second"),
        Err(DeflateError::InvalidState),
        "unconsumed input must be rejected"
    );
    // Consume, then restaging succeeds.
    let mut sink = [0u8; 1024];
    while !engine.needs_input() {
        engine.deflate(false, false);
        engine.pending_flush(&mut sink);
    }
    engine.set_input(b"second").expect("consumed input can be replaced");
}

// ─────────────────────────────────────────────────────────────────────────────
// Checksum prefixes
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn adler_matches_reference_at_every_chunk_boundary() {
    let data = mixed_corpus(40_000, 0xADE);
    let mut engine = DeflateEngine::new();
    let mut consumed = 0usize;
    let mut sink = [0u8; 4096];

    for piece in data.chunks(3_331) {
        engine.set_input(piece).expect("staged");
        while !engine.needs_input() {
            engine.deflate(false, false);
            while engine.pending_flush(&mut sink) > 0 {}
        }
        consumed += piece.len();
        assert_eq!(
            engine.adler(),
            adler32_reference(&data[..consumed]),
            "checksum diverged after {consumed} bytes"
        );
    }
    assert_eq!(engine.total_in(), data.len() as u64);
}

#[test]
fn reset_adler_clears_only_the_checksum() {
    let mut engine = DeflateEngine::new();
    engine.set_input(b"checksummed prefix").expect("staged");
    let mut sink = [0u8; 1024];
    while !engine.needs_input() {
        engine.deflate(false, false);
        engine.pending_flush(&mut sink);
    }
    assert_ne!(engine.adler(), 1);
    engine.reset_adler();
    assert_eq!(engine.adler(), 1);
    assert_eq!(engine.total_in(), 18, "total_in must survive reset_adler");
}

// ─────────────────────────────────────────────────────────────────────────────
// Reset and reuse
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn reset_reuses_the_engine_for_an_independent_stream() {
    let first = mixed_corpus(30_000, 0xAA);
    let second = mixed_corpus(30_000, 0xBB);

    let mut engine = DeflateEngine::new();
    let mut sink = [0u8; 4096];

    engine.set_input(&first).expect("staged");
    let mut out1 = Vec::new();
    loop {
        let more = engine.deflate(true, true);
        drain_into(&mut engine, &mut out1, &mut sink);
        if !more {
            break;
        }
    }

    engine.reset();
    engine.set_input(&second).expect("staged after reset");
    let mut out2 = Vec::new();
    loop {
        let more = engine.deflate(true, true);
        drain_into(&mut engine, &mut out2, &mut sink);
        if !more {
            break;
        }
    }

    assert_eq!(decompress_to_vec(&out1).expect("inflate"), first);
    assert_eq!(decompress_to_vec(&out2).expect("inflate"), second);
    assert_eq!(out2, deflate_to_vec(&second, 6).expect("compression"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Mid-stream level switches
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn switching_levels_mid_stream_still_decodes() {
    let head = mixed_corpus(50_000, 0x111);
    let tail = mixed_corpus(50_000, 0x222);

    // Cross every function boundary: slow → fast → stored → slow.
    for (from, to) in [(9u32, 1u32), (1, 0), (0, 6), (6, 4)] {
        let mut engine = DeflateEngine::new();
        engine.set_level(from).expect("level");
        let mut out = Vec::new();
        let mut sink = [0u8; 4096];

        engine.set_input(&head).expect("staged");
        while !engine.needs_input() {
            engine.deflate(false, false);
            drain_into(&mut engine, &mut out, &mut sink);
        }

        engine.set_level(to).expect("level switch");
        drain_into(&mut engine, &mut out, &mut sink);

        engine.set_input(&tail).expect("staged");
        loop {
            let more = engine.deflate(true, true);
            drain_into(&mut engine, &mut out, &mut sink);
            if !more {
                break;
            }
        }

        let mut expected = head.clone();
        expected.extend_from_slice(&tail);
        assert_eq!(
            decompress_to_vec(&out).unwrap_or_else(|e| panic!(
                "inflate failed after {from}→{to} switch: {e:?}"
            )),
            expected,
            "stream corrupted by {from}→{to} level switch"
        );
    }
}
