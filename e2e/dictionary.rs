//! E2E Test Suite: Preset Dictionaries
//!
//! A dictionary primes the sliding window before any input, so early bytes
//! can match into it. The decoder side is emulated by pre-seeding
//! `miniz_oxide`'s output window with the same dictionary — the raw-DEFLATE
//! equivalent of `inflateSetDictionary`.

extern crate zflate;

use miniz_oxide::inflate::core::{decompress, inflate_flags, DecompressorOxide};
use miniz_oxide::inflate::TINFLStatus;
use zflate::{deflate_to_vec, deflate_to_vec_with, DeflateEngine, Strategy};

/// Inflate a raw DEFLATE stream whose back-references may reach into
/// `dict`, by starting the output cursor after a pre-seeded copy of it.
fn inflate_with_dictionary(dict: &[u8], data: &[u8], max_out: usize) -> Vec<u8> {
    let mut state = DecompressorOxide::new();
    let mut out = vec![0u8; dict.len() + max_out];
    out[..dict.len()].copy_from_slice(dict);
    let (status, _consumed, written) = decompress(
        &mut state,
        data,
        &mut out,
        dict.len(),
        inflate_flags::TINFL_FLAG_USING_NON_WRAPPING_OUTPUT_BUF,
    );
    assert_eq!(
        status,
        TINFLStatus::Done,
        "primed inflate must accept the stream"
    );
    out[dict.len()..dict.len() + written].to_vec()
}

/// Reference Adler-32 (RFC 1950).
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

fn xorshift(state: &mut u64) -> u64 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    *state = x;
    x
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario 6: dictionary priming
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn primed_dictionary_roundtrips_and_matches_into_it() {
    let dict = b"the ";
    let payload = b"the quick brown fox";

    let with_dict =
        deflate_to_vec_with(payload, 6, Strategy::Default, Some(dict)).expect("compression");
    let decoded = inflate_with_dictionary(dict, &with_dict, payload.len() + 64);
    assert_eq!(decoded, payload);

    // The leading "the " must have become a back-reference into the
    // dictionary region, so the primed stream is strictly smaller than an
    // unprimed one.
    let without_dict = deflate_to_vec(payload, 6).expect("compression");
    assert!(
        with_dict.len() < without_dict.len(),
        "dictionary must shorten the stream ({} vs {})",
        with_dict.len(),
        without_dict.len()
    );
}

#[test]
fn dictionary_counts_into_the_checksum() {
    let dict = b"shared prefix material";
    let payload = b"shared prefix material, reused verbatim";

    let mut engine = DeflateEngine::new();
    engine.set_dictionary(dict);
    engine.set_input(payload).expect("staged");
    let mut out = Vec::new();
    let mut sink = [0u8; 1024];
    loop {
        let more = engine.deflate(true, true);
        loop {
            let n = engine.pending_flush(&mut sink);
            if n == 0 {
                break;
            }
            out.extend_from_slice(&sink[..n]);
        }
        if !more {
            break;
        }
    }

    // Adler-32 covers dictionary bytes first, then the payload — the order
    // they entered the window.
    let mut both = dict.to_vec();
    both.extend_from_slice(payload);
    assert_eq!(engine.adler(), adler32_reference(&both));
    // But total_in counts only staged input.
    assert_eq!(engine.total_in(), payload.len() as u64);

    assert_eq!(
        inflate_with_dictionary(dict, &out, payload.len() + 64),
        payload
    );
}

#[test]
fn oversized_dictionary_keeps_only_its_tail() {
    // Build a dictionary larger than the matcher's reach; only its last
    // MAX_DIST bytes can ever be referenced, and the engine must truncate
    // accordingly.
    const MAX_DIST: usize = 32_506;
    let mut state = 0x1D1C7u64;
    let dict: Vec<u8> = (0..40_000)
        .map(|_| b'a' + (xorshift(&mut state) % 26) as u8)
        .collect();
    let payload: Vec<u8> = dict[dict.len() - 1_000..].to_vec();

    let compressed =
        deflate_to_vec_with(&payload, 9, Strategy::Default, Some(&dict)).expect("compression");

    // A decoder primed with the retained tail accepts the stream.
    let tail = &dict[dict.len() - MAX_DIST..];
    let decoded = inflate_with_dictionary(tail, &compressed, payload.len() + 64);
    assert_eq!(decoded, payload);
}

#[test]
fn dictionary_output_decodes_to_payload_alone() {
    // Window independence: the stream produced after priming decodes to
    // exactly the payload — dictionary bytes never appear in the output.
    let dict: Vec<u8> = b"abcdefgh".repeat(512);
    let payload: Vec<u8> = b"abcdefgh".repeat(300);

    for level in [1u32, 6, 9] {
        let compressed = deflate_to_vec_with(&payload, level, Strategy::Default, Some(&dict))
            .expect("compression");
        let decoded = inflate_with_dictionary(&dict, &compressed, payload.len() + 64);
        assert_eq!(decoded, payload, "level {level}");
    }
}

#[test]
fn tiny_dictionary_is_checksummed_but_not_indexed() {
    // Below MIN_MATCH there is nothing to hash; the bytes still count into
    // the checksum.
    let mut engine = DeflateEngine::new();
    engine.set_dictionary(b"ab");
    assert_eq!(engine.adler(), adler32_reference(b"ab"));

    engine.set_input(b"abababab").expect("staged");
    let mut out = Vec::new();
    let mut sink = [0u8; 256];
    loop {
        let more = engine.deflate(true, true);
        loop {
            let n = engine.pending_flush(&mut sink);
            if n == 0 {
                break;
            }
            out.extend_from_slice(&sink[..n]);
        }
        if !more {
            break;
        }
    }
    // No window priming happened, so a plain inflate must accept it.
    assert_eq!(
        miniz_oxide::inflate::decompress_to_vec(&out).expect("inflate"),
        b"abababab"
    );
}
