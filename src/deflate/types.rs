//! DEFLATE engine constants, per-level parameters, and the public error type.
//!
//! Every numeric constant here is fixed by RFC 1951 (or by the zlib design
//! the engine follows) and must not be changed: the hash geometry, the match
//! bounds, and the window size together define the wire contract that a
//! compliant inflater reverses.

use core::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Window and hash geometry (RFC 1951 §2, zlib deflate)
// ─────────────────────────────────────────────────────────────────────────────

/// Half-size of the sliding window. The window buffer itself is `2 * WSIZE`
/// so that a full history plus the current lookahead fit without copying on
/// every byte.
pub const WSIZE: usize = 32_768;

/// Mask for reducing a window position into the `prev` chain table.
pub const WMASK: usize = WSIZE - 1;

pub const HASH_BITS: usize = 15;
pub const HASH_SIZE: usize = 1 << HASH_BITS; // 32768
pub const HASH_MASK: usize = HASH_SIZE - 1;

/// Per-byte shift of the rolling three-byte hash:
/// `ceil(HASH_BITS / MIN_MATCH) = 5`.
pub const HASH_SHIFT: usize = (HASH_BITS + MIN_MATCH - 1) / MIN_MATCH;

// ─────────────────────────────────────────────────────────────────────────────
// Match bounds (RFC 1951 §3.2.5)
// ─────────────────────────────────────────────────────────────────────────────

/// Shortest back-reference the format can express.
pub const MIN_MATCH: usize = 3;

/// Longest back-reference the format can express.
pub const MAX_MATCH: usize = 258;

/// Minimum lookahead required before match search may run: room for a
/// maximal match, a following minimal one, and the hash read past it.
pub const MIN_LOOKAHEAD: usize = MAX_MATCH + MIN_MATCH + 1; // 262

/// Largest distance the matcher will emit. Smaller than `WSIZE` so that a
/// match found just before a window slide stays addressable after it.
pub const MAX_DIST: usize = WSIZE - MIN_LOOKAHEAD; // 32506

/// Distance beyond which a minimum-length match is not worth its cost:
/// a far distance code plus extra bits can exceed three literals.
pub const TOO_FAR: usize = 4096;

// ─────────────────────────────────────────────────────────────────────────────
// Buffer sizing
// ─────────────────────────────────────────────────────────────────────────────

/// Byte capacity of the pending output buffer.
pub const PENDING_BUF_SIZE: usize = 1 << 16;

/// Largest stored-block payload: bounded both by the 16-bit `LEN` field and
/// by the pending buffer minus the 5-byte stored-block header.
pub const MAX_BLOCK_SIZE: usize = if 65_535 < PENDING_BUF_SIZE - 5 {
    65_535
} else {
    PENDING_BUF_SIZE - 5
};

// ─────────────────────────────────────────────────────────────────────────────
// Alphabet sizes (RFC 1951 §3.2.5–3.2.7)
// ─────────────────────────────────────────────────────────────────────────────

/// Literal/length alphabet size: 256 literals, end-of-block, 29 length codes.
pub const LITERAL_NUM: usize = 286;

/// End-of-block symbol in the literal/length alphabet.
pub const EOB_SYMBOL: usize = 256;

/// Distance alphabet size.
pub const DIST_NUM: usize = 30;

/// Code-length alphabet size (symbols 0–15 plus the repeat codes 16/17/18).
pub const BITLEN_NUM: usize = 19;

/// Maximum code length for the literal/length and distance alphabets.
pub const MAX_BITS: usize = 15;

/// Maximum code length for the code-length alphabet.
pub const MAX_BL_BITS: usize = 7;

/// Symbol-buffer capacity of the Huffman tally stage. When either buffer
/// fills, the current block is closed and emitted.
pub const BUF_SIZE: usize = 1 << 14;

// ─────────────────────────────────────────────────────────────────────────────
// Per-level parameters (zlib canonical table)
// ─────────────────────────────────────────────────────────────────────────────

/// Which of the three compression state machines a level runs.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CompressionFunction {
    /// Level 0: raw stored blocks, no matching.
    Stored,
    /// Levels 1–3: greedy matching, no lazy evaluation.
    Fast,
    /// Levels 4–9: lazy matching (defer each match by one byte).
    Slow,
}

/// Match-search tuning for one compression level.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Once the deferred match reaches this length, quarter the chain budget.
    pub good_length: usize,
    /// Fast: longest match still worth per-byte hash insertion.
    /// Slow: longest match length that still triggers lazy evaluation.
    pub max_lazy: usize,
    /// Stop searching as soon as a match of this length is found.
    pub nice_length: usize,
    /// Maximum number of hash-chain links walked per search.
    pub max_chain: usize,
    pub func: CompressionFunction,
}

/// Level → parameter table. Index is the compression level (0–9).
#[rustfmt::skip]
pub static CONFIGURATION_TABLE: [Config; 10] = [
    Config { good_length:  0, max_lazy:   0, nice_length:   0, max_chain:    0, func: CompressionFunction::Stored }, /* 0: store only */
    Config { good_length:  4, max_lazy:   4, nice_length:   8, max_chain:    4, func: CompressionFunction::Fast   }, /* 1: maximum speed */
    Config { good_length:  4, max_lazy:   5, nice_length:  16, max_chain:    8, func: CompressionFunction::Fast   }, /* 2 */
    Config { good_length:  4, max_lazy:   6, nice_length:  32, max_chain:   32, func: CompressionFunction::Fast   }, /* 3 */
    Config { good_length:  4, max_lazy:   4, nice_length:  16, max_chain:   16, func: CompressionFunction::Slow   }, /* 4: lazy matching from here on */
    Config { good_length:  8, max_lazy:  16, nice_length:  32, max_chain:   32, func: CompressionFunction::Slow   }, /* 5 */
    Config { good_length:  8, max_lazy:  16, nice_length: 128, max_chain:  128, func: CompressionFunction::Slow   }, /* 6: default */
    Config { good_length:  8, max_lazy:  32, nice_length: 128, max_chain:  256, func: CompressionFunction::Slow   }, /* 7 */
    Config { good_length: 32, max_lazy: 128, nice_length: 258, max_chain: 1024, func: CompressionFunction::Slow   }, /* 8 */
    Config { good_length: 32, max_lazy: 258, nice_length: 258, max_chain: 4096, func: CompressionFunction::Slow   }, /* 9: maximum compression */
];

// ─────────────────────────────────────────────────────────────────────────────
// Strategy
// ─────────────────────────────────────────────────────────────────────────────

/// Tuning hint for data whose statistics the default heuristics mishandle.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Strategy {
    /// Normal operation.
    #[default]
    Default,
    /// For data produced by a filter/predictor: favour literals, accept only
    /// longer matches (short ones rarely survive filtering).
    Filtered,
    /// Huffman coding only; emit no back-references at all.
    HuffmanOnly,
}

// ─────────────────────────────────────────────────────────────────────────────
// Error type
// ─────────────────────────────────────────────────────────────────────────────

/// Errors returned by the engine's fallible public operations.
///
/// Compression itself cannot fail: `deflate` is a total function of the
/// engine state and its input. Only caller-contract violations are
/// reportable, and a failed operation leaves the engine unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeflateError {
    /// `set_input` was called while previous input is still unconsumed.
    InvalidState,
    /// `set_level` was called with a level outside `0..=9`.
    InvalidLevel,
}

impl DeflateError {
    /// Stable textual name for the error.
    pub fn error_name(&self) -> &'static str {
        match self {
            DeflateError::InvalidState => "previous input was not completely processed",
            DeflateError::InvalidLevel => "compression level must be in 0..=9",
        }
    }
}

impl fmt::Display for DeflateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.error_name())
    }
}

impl std::error::Error for DeflateError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_constants_match_the_rfc_geometry() {
        assert_eq!(HASH_SHIFT, 5);
        assert_eq!(MIN_LOOKAHEAD, 262);
        assert_eq!(MAX_DIST, 32_506);
        assert_eq!(MAX_BLOCK_SIZE, 65_531);
    }

    #[test]
    fn level_table_function_split() {
        assert_eq!(CONFIGURATION_TABLE[0].func, CompressionFunction::Stored);
        for level in 1..=3 {
            assert_eq!(CONFIGURATION_TABLE[level].func, CompressionFunction::Fast);
        }
        for level in 4..=9 {
            assert_eq!(CONFIGURATION_TABLE[level].func, CompressionFunction::Slow);
        }
    }
}
