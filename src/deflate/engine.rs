//! DEFLATE driver: input staging, window fill, level/strategy handling, and
//! the three compression state machines.
//!
//! The engine is single-threaded and non-suspending: `deflate` is a pure
//! state transformation, and output flow control is cooperative — the caller
//! drains the pending buffer between calls. A typical drive loop:
//!
//! ```
//! use zflate::DeflateEngine;
//!
//! let mut engine = DeflateEngine::new();
//! engine.set_input(b"example payload").unwrap();
//! let mut out = Vec::new();
//! let mut chunk = [0u8; 512];
//! loop {
//!     let more = engine.deflate(true, true);
//!     loop {
//!         let n = engine.pending_flush(&mut chunk);
//!         if n == 0 {
//!             break;
//!         }
//!         out.extend_from_slice(&chunk[..n]);
//!     }
//!     if !more {
//!         break;
//!     }
//! }
//! ```
//!
//! The engine emits raw DEFLATE blocks only; the zlib header and trailing
//! Adler-32 belong to the wrapper outside this crate, which reads the
//! running checksum via [`DeflateEngine::adler`].

use crate::adler32::Adler32;

use super::huffman::HuffmanState;
use super::pending::PendingBuffer;
use super::types::{
    CompressionFunction, Config, DeflateError, Strategy, CONFIGURATION_TABLE, HASH_SIZE,
    MAX_BLOCK_SIZE, MAX_DIST, MIN_LOOKAHEAD, MIN_MATCH, TOO_FAR, WSIZE,
};

/// Default compression level when none is set explicitly.
const DEFAULT_LEVEL: usize = 6;

/// The DEFLATE compression engine.
///
/// Owns the sliding window, the hash chains, the Huffman coder, and the
/// pending output buffer. Exclusive ownership is the concurrency contract;
/// dropping the engine mid-stream leaks nothing.
pub struct DeflateEngine {
    /// Sliding history plus current lookahead.
    pub(super) window: Box<[u8]>,
    /// `head[h]`: most recent position whose three bytes hash to `h`; 0 = none.
    pub(super) head: Box<[u16]>,
    /// `prev[p & WMASK]`: previous position with the same hash as `p`; 0 ends
    /// the chain.
    pub(super) prev: Box<[u16]>,

    /// Position under consideration for output. Starts at 1 (0 is the chain
    /// sentinel).
    pub(super) strstart: usize,
    /// First position of the not-yet-emitted block; negative after a slide
    /// overtakes it.
    pub(super) block_start: isize,
    /// Valid bytes starting at `strstart`.
    pub(super) lookahead: usize,
    /// Start of the last match found by `find_longest_match`.
    pub(super) match_start: usize,
    /// Its length; rests at `MIN_MATCH - 1` between matches.
    pub(super) match_len: usize,
    /// Lazy mode: a literal at `strstart - 1` is deferred.
    pub(super) prev_available: bool,
    /// Rolling two-byte hash prefix for the next `insert_string`.
    pub(super) insert_hash: usize,

    // Active level parameters.
    pub(super) good_length: usize,
    pub(super) max_lazy: usize,
    pub(super) nice_length: usize,
    pub(super) max_chain: usize,
    compr_func: CompressionFunction,
    strategy: Strategy,

    // Input holding area.
    input: Vec<u8>,
    input_off: usize,
    input_end: usize,
    total_in: u64,

    adler: Adler32,
    pending: PendingBuffer,
    huffman: HuffmanState,
}

impl DeflateEngine {
    /// Construct an engine at the default level (6) and default strategy.
    pub fn new() -> Self {
        let config = &CONFIGURATION_TABLE[DEFAULT_LEVEL];
        Self {
            window: vec![0u8; 2 * WSIZE].into_boxed_slice(),
            head: vec![0u16; HASH_SIZE].into_boxed_slice(),
            prev: vec![0u16; WSIZE].into_boxed_slice(),
            strstart: 1,
            block_start: 1,
            lookahead: 0,
            match_start: 0,
            match_len: MIN_MATCH - 1,
            prev_available: false,
            insert_hash: 0,
            good_length: config.good_length,
            max_lazy: config.max_lazy,
            nice_length: config.nice_length,
            max_chain: config.max_chain,
            compr_func: config.func,
            strategy: Strategy::Default,
            input: Vec::new(),
            input_off: 0,
            input_end: 0,
            total_in: 0,
            adler: Adler32::new(),
            pending: PendingBuffer::new(),
            huffman: HuffmanState::new(),
        }
    }

    // ── Input ────────────────────────────────────────────────────────────────

    /// Stage the next input slice.
    ///
    /// Fails with [`DeflateError::InvalidState`] — leaving the engine
    /// untouched — if the previous input has not been fully consumed yet
    /// (check [`needs_input`] first).
    ///
    /// [`needs_input`]: DeflateEngine::needs_input
    pub fn set_input(&mut self, buf: &[u8]) -> Result<(), DeflateError> {
        if self.input_off < self.input_end {
            return Err(DeflateError::InvalidState);
        }
        self.input.clear();
        self.input.extend_from_slice(buf);
        self.input_off = 0;
        self.input_end = buf.len();
        Ok(())
    }

    /// True once the staged input has been fully consumed into the window.
    pub fn needs_input(&self) -> bool {
        self.input_off == self.input_end
    }

    /// Prime the window with a preset dictionary.
    ///
    /// Checksums all of `dict`, keeps its last `MAX_DIST` bytes in the
    /// window, and seeds the hash chains so the first real bytes can match
    /// into it. Caller contract: only before any input has been compressed.
    pub fn set_dictionary(&mut self, dict: &[u8]) {
        debug_assert!(
            self.strstart == 1 && self.lookahead == 0,
            "dictionary must be set before any input"
        );
        self.adler.update(dict);
        if dict.len() < MIN_MATCH {
            return;
        }
        let dict = if dict.len() > MAX_DIST {
            &dict[dict.len() - MAX_DIST..]
        } else {
            dict
        };
        let len = dict.len();
        self.window[self.strstart..self.strstart + len].copy_from_slice(dict);

        self.update_hash();
        // Only positions with all three hash bytes inside the dictionary can
        // be inserted; the final two cannot form a hash.
        for _ in 0..len - 2 {
            self.insert_string();
            self.strstart += 1;
        }
        self.strstart += 2;
        self.block_start = self.strstart as isize;
    }

    // ── Configuration ────────────────────────────────────────────────────────

    /// Select a compression level in `0..=9`.
    ///
    /// If the new level runs a different compression function, the current
    /// block is first closed (non-final) in the manner the active function
    /// requires, so the already-tallied symbols go out under the parameters
    /// that produced them.
    pub fn set_level(&mut self, level: u32) -> Result<(), DeflateError> {
        let config: &Config = CONFIGURATION_TABLE
            .get(level as usize)
            .ok_or(DeflateError::InvalidLevel)?;

        if config.func != self.compr_func {
            match self.compr_func {
                CompressionFunction::Stored => {
                    if (self.strstart as isize) > self.block_start {
                        debug_assert!(self.block_start >= 0);
                        let start = self.block_start as usize;
                        self.huffman.flush_stored_block(
                            &mut self.pending,
                            &self.window,
                            start,
                            self.strstart - start,
                            false,
                        );
                        self.block_start = self.strstart as isize;
                    }
                }
                CompressionFunction::Fast => {
                    if (self.strstart as isize) > self.block_start {
                        let len = (self.strstart as isize - self.block_start) as usize;
                        self.huffman.flush_block(
                            &mut self.pending,
                            &self.window,
                            self.block_start,
                            len,
                            false,
                        );
                        self.block_start = self.strstart as isize;
                    }
                }
                CompressionFunction::Slow => {
                    if self.prev_available {
                        self.huffman.tally_lit(self.window[self.strstart - 1]);
                    }
                    if (self.strstart as isize) > self.block_start {
                        let len = (self.strstart as isize - self.block_start) as usize;
                        self.huffman.flush_block(
                            &mut self.pending,
                            &self.window,
                            self.block_start,
                            len,
                            false,
                        );
                        self.block_start = self.strstart as isize;
                    }
                    self.prev_available = false;
                    self.match_len = MIN_MATCH - 1;
                }
            }
            self.compr_func = config.func;
        }

        self.good_length = config.good_length;
        self.max_lazy = config.max_lazy;
        self.nice_length = config.nice_length;
        self.max_chain = config.max_chain;
        Ok(())
    }

    /// Select the matching strategy for subsequent input.
    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.strategy = strategy;
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    // ── Lifecycle and accessors ──────────────────────────────────────────────

    /// Return to just-constructed state (keeping the current level and
    /// strategy).
    pub fn reset(&mut self) {
        self.huffman.reset();
        self.pending.reset();
        self.adler.reset();
        self.head.fill(0);
        self.prev.fill(0);
        self.strstart = 1;
        self.block_start = 1;
        self.lookahead = 0;
        self.match_start = 0;
        self.match_len = MIN_MATCH - 1;
        self.prev_available = false;
        self.insert_hash = 0;
        self.input.clear();
        self.input_off = 0;
        self.input_end = 0;
        self.total_in = 0;
    }

    /// Running Adler-32 over every byte that has entered the window
    /// (dictionary included).
    pub fn adler(&self) -> u32 {
        self.adler.value()
    }

    /// Restore the checksum to its initial value without touching the rest
    /// of the state.
    pub fn reset_adler(&mut self) {
        self.adler.reset();
    }

    /// Total bytes consumed from staged input.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    // ── Output draining ──────────────────────────────────────────────────────

    /// Move pending output bytes into `out`; returns the count copied.
    pub fn pending_flush(&mut self, out: &mut [u8]) -> usize {
        self.pending.flush(out)
    }

    /// True when no whole output bytes are waiting.
    pub fn pending_is_flushed(&self) -> bool {
        self.pending.is_flushed()
    }

    // ── The driver ───────────────────────────────────────────────────────────

    /// Run the active compression function until it can make no further
    /// progress or the pending buffer holds output.
    ///
    /// `flush` requests that all buffered input be emitted once the staged
    /// input is consumed; `finish` additionally marks the last emitted block
    /// final. Returns true while further progress is possible — drive with
    /// `finish = true` until it returns false.
    pub fn deflate(&mut self, flush: bool, finish: bool) -> bool {
        // A block is only ever written into a drained buffer; with output
        // still waiting there is nothing to do but report progress.
        if !self.pending.is_flushed() {
            return true;
        }
        let mut progress;
        let mut can_flush;
        loop {
            self.fill_window();
            can_flush = flush && self.needs_input();
            progress = match self.compr_func {
                CompressionFunction::Stored => self.deflate_stored(can_flush, finish),
                CompressionFunction::Fast => self.deflate_fast(can_flush, finish),
                CompressionFunction::Slow => self.deflate_slow(can_flush, finish),
            };
            if !(self.pending.is_flushed() && progress) {
                break;
            }
        }
        if finish && can_flush && !progress {
            // The final block is written; pad its trailing bits to a byte so
            // the caller can drain the whole stream.
            self.pending.align_to_byte();
        }
        progress
    }

    /// Slide the window if it is full, then move staged input into the
    /// lookahead until it reaches `MIN_LOOKAHEAD` or input runs dry. Every
    /// byte copied is checksummed and counted.
    fn fill_window(&mut self) {
        if self.strstart >= WSIZE + MAX_DIST {
            self.slide_window();
        }
        while self.lookahead < MIN_LOOKAHEAD && self.input_off < self.input_end {
            let free = 2 * WSIZE - self.lookahead - self.strstart;
            let more = free.min(self.input_end - self.input_off);
            let src = &self.input[self.input_off..self.input_off + more];
            let dst_start = self.strstart + self.lookahead;
            self.window[dst_start..dst_start + more].copy_from_slice(src);
            self.adler.update(src);
            self.input_off += more;
            self.total_in += more as u64;
            self.lookahead += more;
        }
        if self.lookahead >= MIN_MATCH {
            self.update_hash();
        }
    }

    // ── Compression functions ────────────────────────────────────────────────

    /// Level 0: accumulate raw bytes and emit stored blocks.
    ///
    /// A slab larger than `MAX_BLOCK_SIZE` is truncated and emitted
    /// non-final even under `finish`; the remainder (and the final-block
    /// flag) goes out on a subsequent call. Decoders accept either framing.
    fn deflate_stored(&mut self, flush: bool, finish: bool) -> bool {
        if !flush && self.lookahead == 0 {
            return false;
        }
        self.strstart += self.lookahead;
        self.lookahead = 0;

        let mut stored_len = (self.strstart as isize - self.block_start) as usize;
        let must_slide = self.block_start < WSIZE as isize && stored_len >= MAX_DIST;
        if stored_len >= MAX_BLOCK_SIZE || must_slide || flush {
            // Final only on the flush path (input fully consumed); a block
            // forced out mid-stream by size or an impending slide is never
            // the last one.
            let mut last_block = finish && flush;
            if stored_len > MAX_BLOCK_SIZE {
                stored_len = MAX_BLOCK_SIZE;
                last_block = false;
            }
            debug_assert!(self.block_start >= 0, "stored block slid out of the window");
            let start = self.block_start as usize;
            self.huffman.flush_stored_block(
                &mut self.pending,
                &self.window,
                start,
                stored_len,
                last_block,
            );
            self.block_start += stored_len as isize;
            return !last_block;
        }
        true
    }

    /// Levels 1–3: greedy matching. Every match found is taken immediately.
    fn deflate_fast(&mut self, flush: bool, finish: bool) -> bool {
        if self.lookahead < MIN_LOOKAHEAD && !flush {
            return false;
        }
        while self.lookahead >= MIN_LOOKAHEAD || flush {
            if self.lookahead == 0 {
                // Everything is tallied; close out.
                let len = (self.strstart as isize - self.block_start) as usize;
                self.huffman.flush_block(
                    &mut self.pending,
                    &self.window,
                    self.block_start,
                    len,
                    finish,
                );
                self.block_start = self.strstart as isize;
                return false;
            }
            if self.strstart >= 2 * WSIZE - MIN_LOOKAHEAD {
                self.slide_window();
            }

            let mut hash_head = 0;
            if self.lookahead >= MIN_MATCH {
                hash_head = self.insert_string();
            }

            if hash_head != 0
                && self.strategy != Strategy::HuffmanOnly
                && self.strstart - hash_head <= MAX_DIST
                && self.find_longest_match(hash_head)
            {
                self.huffman
                    .tally_dist(self.strstart - self.match_start, self.match_len);
                self.lookahead -= self.match_len;

                if self.match_len <= self.max_lazy && self.lookahead >= MIN_MATCH {
                    // Short match: index every covered position.
                    for _ in 0..self.match_len - 1 {
                        self.strstart += 1;
                        self.insert_string();
                    }
                    self.strstart += 1;
                } else {
                    // Long match: skip ahead and re-seed the rolling hash.
                    self.strstart += self.match_len;
                    if self.lookahead >= MIN_MATCH - 1 {
                        self.update_hash();
                    }
                }
                self.match_len = MIN_MATCH - 1;
            } else {
                self.huffman.tally_lit(self.window[self.strstart]);
                self.strstart += 1;
                self.lookahead -= 1;
            }

            if self.huffman.is_full() {
                let last_block = finish && self.lookahead == 0;
                let len = (self.strstart as isize - self.block_start) as usize;
                self.huffman.flush_block(
                    &mut self.pending,
                    &self.window,
                    self.block_start,
                    len,
                    last_block,
                );
                self.block_start = self.strstart as isize;
                return !last_block;
            }
        }
        true
    }

    /// Levels 4–9: lazy matching. Each match is deferred one byte to see
    /// whether a strictly longer one starts at the next position.
    fn deflate_slow(&mut self, flush: bool, finish: bool) -> bool {
        if self.lookahead < MIN_LOOKAHEAD && !flush {
            return false;
        }
        while self.lookahead >= MIN_LOOKAHEAD || flush {
            if self.lookahead == 0 {
                if self.prev_available {
                    self.huffman.tally_lit(self.window[self.strstart - 1]);
                    self.prev_available = false;
                }
                let len = (self.strstart as isize - self.block_start) as usize;
                self.huffman.flush_block(
                    &mut self.pending,
                    &self.window,
                    self.block_start,
                    len,
                    finish,
                );
                self.block_start = self.strstart as isize;
                return false;
            }
            if self.strstart >= 2 * WSIZE - MIN_LOOKAHEAD {
                self.slide_window();
            }

            let prev_match = self.match_start;
            let mut prev_len = self.match_len;

            if self.lookahead >= MIN_MATCH {
                let hash_head = self.insert_string();
                if hash_head != 0
                    && self.strategy != Strategy::HuffmanOnly
                    && self.strstart - hash_head <= MAX_DIST
                    && self.find_longest_match(hash_head)
                {
                    // Heuristic discard: a minimal match far away (or any
                    // short match under Filtered) costs more than literals.
                    if self.match_len <= 5
                        && (self.strategy == Strategy::Filtered
                            || (self.match_len == MIN_MATCH
                                && self.strstart - self.match_start > TOO_FAR))
                    {
                        self.match_len = MIN_MATCH - 1;
                    }
                }
            }

            if prev_len >= MIN_MATCH && self.match_len <= prev_len {
                // The deferred match wins; emit it at strstart - 1.
                self.huffman
                    .tally_dist(self.strstart - 1 - prev_match, prev_len);
                // Index the remaining covered positions (two are already in).
                prev_len -= 2;
                loop {
                    self.strstart += 1;
                    self.lookahead -= 1;
                    if self.lookahead >= MIN_MATCH {
                        self.insert_string();
                    }
                    prev_len -= 1;
                    if prev_len == 0 {
                        break;
                    }
                }
                self.strstart += 1;
                self.lookahead -= 1;
                self.prev_available = false;
                self.match_len = MIN_MATCH - 1;
            } else {
                if self.prev_available {
                    self.huffman.tally_lit(self.window[self.strstart - 1]);
                }
                self.prev_available = true;
                self.strstart += 1;
                self.lookahead -= 1;
            }

            if self.huffman.is_full() {
                let mut len = (self.strstart as isize - self.block_start) as usize;
                if self.prev_available {
                    len -= 1; // the deferred byte belongs to the next block
                }
                let last_block = finish && self.lookahead == 0 && !self.prev_available;
                self.huffman.flush_block(
                    &mut self.pending,
                    &self.window,
                    self.block_start,
                    len,
                    last_block,
                );
                self.block_start += len as isize;
                return !last_block;
            }
        }
        true
    }
}

impl Default for DeflateEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// One-shot convenience API
// ─────────────────────────────────────────────────────────────────────────────

/// Compress `input` in one call at the given level.
pub fn deflate_to_vec(input: &[u8], level: u32) -> Result<Vec<u8>, DeflateError> {
    deflate_to_vec_with(input, level, Strategy::Default, None)
}

/// Compress `input` in one call with full control over strategy and an
/// optional preset dictionary.
pub fn deflate_to_vec_with(
    input: &[u8],
    level: u32,
    strategy: Strategy,
    dictionary: Option<&[u8]>,
) -> Result<Vec<u8>, DeflateError> {
    let mut engine = DeflateEngine::new();
    engine.set_level(level)?;
    engine.set_strategy(strategy);
    if let Some(dict) = dictionary {
        engine.set_dictionary(dict);
    }
    engine.set_input(input)?;

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
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_input_rejects_unconsumed_input() {
        let mut e = DeflateEngine::new();
        e.set_input(b"pending bytes").unwrap();
        assert!(!e.needs_input());
        assert_eq!(e.set_input(b"more"), Err(DeflateError::InvalidState));
        // The failed call must not have disturbed the staged input.
        while e.deflate(true, true) {
            let mut sink = [0u8; 256];
            e.pending_flush(&mut sink);
        }
        assert_eq!(e.total_in(), 13);
    }

    #[test]
    fn set_level_rejects_out_of_range() {
        let mut e = DeflateEngine::new();
        assert_eq!(e.set_level(10), Err(DeflateError::InvalidLevel));
        for level in 0..=9 {
            e.set_level(level).unwrap();
        }
    }

    #[test]
    fn empty_input_finishes_in_two_bytes() {
        // One empty final static block: 0x03 0x00.
        let out = deflate_to_vec(b"", 6).unwrap();
        assert_eq!(out, vec![0x03, 0x00]);
    }

    #[test]
    fn empty_input_level_zero_is_an_empty_stored_block() {
        let out = deflate_to_vec(b"", 0).unwrap();
        // BFINAL=1 BTYPE=00, aligned, LEN=0, NLEN=0xFFFF.
        assert_eq!(out, vec![0x01, 0x00, 0x00, 0xFF, 0xFF]);
    }

    #[test]
    fn adler_tracks_consumed_bytes() {
        let mut e = DeflateEngine::new();
        assert_eq!(e.adler(), 1);
        e.set_input(b"a").unwrap();
        while e.deflate(true, true) {
            let mut sink = [0u8; 64];
            e.pending_flush(&mut sink);
        }
        assert_eq!(e.adler(), 0x0062_0062);
        assert_eq!(e.total_in(), 1);
    }

    #[test]
    fn reset_restores_construction_state() {
        let mut e = DeflateEngine::new();
        e.set_input(b"some input to churn through the engine").unwrap();
        while e.deflate(true, true) {
            let mut sink = [0u8; 256];
            e.pending_flush(&mut sink);
        }
        e.reset();
        assert_eq!(e.adler(), 1);
        assert_eq!(e.total_in(), 0);
        assert!(e.needs_input());
        assert!(e.pending_is_flushed());
        // A fresh run after reset produces the same stream as a new engine.
        e.set_input(b"determinism check").unwrap();
        let mut a = Vec::new();
        let mut chunk = [0u8; 64];
        loop {
            let more = e.deflate(true, true);
            loop {
                let n = e.pending_flush(&mut chunk);
                if n == 0 {
                    break;
                }
                a.extend_from_slice(&chunk[..n]);
            }
            if !more {
                break;
            }
        }
        let b = deflate_to_vec(b"determinism check", 6).unwrap();
        assert_eq!(a, b);
    }
}
