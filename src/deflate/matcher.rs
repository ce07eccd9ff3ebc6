//! Match-finding core: the three-byte rolling hash, the `head`/`prev` chain
//! tables, window sliding, and the longest-match search.
//!
//! Window positions are stored as `u16` with 0 reserved as the chain
//! sentinel — the engine starts at `strstart = 1` so position 0 can never be
//! a real entry. After a slide, every table entry is rebased by `WSIZE` with
//! underflow clamped to the sentinel, which implicitly terminates chains
//! that reach positions older than the new window start.

use super::engine::DeflateEngine;
use super::types::{
    HASH_MASK, HASH_SHIFT, MAX_DIST, MAX_MATCH, MIN_LOOKAHEAD, MIN_MATCH, WMASK, WSIZE,
};

impl DeflateEngine {
    /// Re-seed the rolling hash with the two bytes at `strstart`. The third
    /// byte of the mix is folded in by the next [`insert_string`].
    ///
    /// [`insert_string`]: DeflateEngine::insert_string
    #[inline]
    pub(super) fn update_hash(&mut self) {
        self.insert_hash = ((self.window[self.strstart] as usize) << HASH_SHIFT)
            ^ self.window[self.strstart + 1] as usize;
    }

    /// Insert the three-byte string at `strstart` into the hash chains.
    ///
    /// Finishes the rolling mix with `window[strstart + 2]`, threads the
    /// previous head through `prev`, and returns it (0 = no predecessor).
    #[inline]
    pub(super) fn insert_string(&mut self) -> usize {
        let hash = ((self.insert_hash << HASH_SHIFT)
            ^ self.window[self.strstart + MIN_MATCH - 1] as usize)
            & HASH_MASK;
        let head = self.head[hash] as usize;
        self.prev[self.strstart & WMASK] = head as u16;
        self.head[hash] = self.strstart as u16;
        self.insert_hash = hash;
        head
    }

    /// Slide the upper half of the window down and rebase every position.
    ///
    /// Requires `strstart >= WSIZE`. Entries that would rebase below 1
    /// clamp to the 0 sentinel, cutting their chains off at the new window
    /// boundary.
    pub(super) fn slide_window(&mut self) {
        debug_assert!(self.strstart >= WSIZE, "window slid before it was full");
        self.window.copy_within(WSIZE..2 * WSIZE, 0);
        self.match_start = self.match_start.saturating_sub(WSIZE);
        self.strstart -= WSIZE;
        self.block_start -= WSIZE as isize;

        for entry in self.head.iter_mut() {
            let pos = *entry as usize;
            *entry = if pos >= WSIZE { (pos - WSIZE) as u16 } else { 0 };
        }
        for entry in self.prev.iter_mut() {
            let pos = *entry as usize;
            *entry = if pos >= WSIZE { (pos - WSIZE) as u16 } else { 0 };
        }
    }

    /// Walk the hash chain from `cur` looking for a match at `strstart`
    /// longer than the current `match_len`.
    ///
    /// On success updates `match_start`/`match_len` and returns true.
    /// `match_len` arrives seeded at `MIN_MATCH - 1` (or at the deferred
    /// match's length in lazy mode), which keeps the two sentinel reads
    /// `window[strstart + match_len]` / `window[strstart + match_len - 1]`
    /// in range under the `MIN_LOOKAHEAD` guarantee.
    pub(super) fn find_longest_match(&mut self, mut cur: usize) -> bool {
        let strstart = self.strstart;
        let mut chain = self.max_chain;
        let nice = self.nice_length.min(self.lookahead);
        let mut best_len = self.match_len;
        let mut best_start = self.match_start;
        let limit = strstart.saturating_sub(MAX_DIST);
        // Pairwise extension below may overshoot by one byte, hence the -1.
        let strend = strstart + MAX_MATCH - 1;

        debug_assert!(best_len >= MIN_MATCH - 1);
        debug_assert!(
            strstart <= 2 * WSIZE - MIN_LOOKAHEAD,
            "insufficient lookahead for match search"
        );

        let window = &self.window;
        let mut scan_end1 = window[strstart + best_len - 1];
        let mut scan_end = window[strstart + best_len];

        // Already holding a good deferred match: don't chase the chain hard.
        if best_len >= self.good_length {
            chain >>= 2;
        }

        loop {
            debug_assert!(cur < strstart);

            // Cheap rejection: the candidate can only beat best_len if it
            // agrees at the two bytes just past the current best, and at the
            // first two bytes.
            if window[cur + best_len] == scan_end
                && window[cur + best_len - 1] == scan_end1
                && window[cur] == window[strstart]
                && window[cur + 1] == window[strstart + 1]
            {
                let mut scan = strstart + 2;
                let mut pos = cur + 2;
                loop {
                    if window[scan] != window[pos] {
                        break;
                    }
                    scan += 1;
                    pos += 1;
                    if window[scan] != window[pos] {
                        break;
                    }
                    scan += 1;
                    pos += 1;
                    if scan >= strend {
                        break;
                    }
                }
                let len = scan - strstart;
                if len > best_len {
                    best_start = cur;
                    best_len = len;
                    if best_len >= nice {
                        break;
                    }
                    scan_end1 = window[strstart + best_len - 1];
                    scan_end = window[strstart + best_len];
                }
            }

            cur = self.prev[cur & WMASK] as usize;
            if cur <= limit {
                break;
            }
            chain -= 1;
            if chain == 0 {
                break;
            }
        }

        self.match_start = best_start;
        self.match_len = best_len.min(self.lookahead);
        self.match_len >= MIN_MATCH
    }
}

#[cfg(test)]
mod tests {
    use super::super::engine::DeflateEngine;
    use super::super::types::{MAX_MATCH, MIN_MATCH, WMASK, WSIZE};

    /// Engine with `data` staged at window position 1 and the hash chains
    /// seeded for positions `1..=last_insert`, leaving `strstart` just past
    /// the inserts with the remaining bytes as lookahead.
    fn engine_with_window(data: &[u8], inserts: usize) -> DeflateEngine {
        let mut e = DeflateEngine::new();
        e.window[1..1 + data.len()].copy_from_slice(data);
        e.lookahead = data.len();
        e.update_hash();
        for _ in 0..inserts {
            e.insert_string();
            e.strstart += 1;
            e.lookahead -= 1;
        }
        e
    }

    #[test]
    fn insert_string_threads_the_chain() {
        // "abcabcabc": positions 1, 4, 7 share the hash of "abc".
        let mut e = engine_with_window(b"abcabcabcxyz", 0);
        let heads: Vec<usize> = (0..8)
            .map(|_| {
                let h = e.insert_string();
                e.strstart += 1;
                e.lookahead -= 1;
                h
            })
            .collect();
        assert_eq!(heads[0], 0, "first insert has no predecessor");
        assert_eq!(heads[3], 1, "second \"abc\" chains to the first");
        assert_eq!(heads[6], 4, "third \"abc\" chains to the second");
        assert_eq!(e.prev[7 & WMASK], 4);
        assert_eq!(e.prev[4 & WMASK], 1);
    }

    #[test]
    fn find_longest_match_prefers_the_longer_candidate() {
        // Window: "abcdX...abcdefG...abcdefgh" — searching at the last run
        // must pick the six-byte candidate over the four-byte one.
        let mut data = Vec::new();
        data.extend_from_slice(b"abcdXXXX");
        data.extend_from_slice(b"abcdefGG");
        data.extend_from_slice(b"abcdefghzzzzzzzz");
        let inserts = 16; // index everything before the final run
        let mut e = engine_with_window(&data, inserts);
        assert_eq!(e.strstart, 17);

        let head = e.insert_string();
        assert!(head != 0);
        assert!(e.find_longest_match(head));
        assert_eq!(e.match_start, 9, "match must anchor at \"abcdef\"");
        assert!(e.match_len >= 6);
    }

    #[test]
    fn match_len_is_clamped_to_lookahead() {
        let mut data = vec![b'q'; 64];
        data.extend_from_slice(b"tail");
        let mut e = engine_with_window(&data, 40);
        // Pretend almost no lookahead remains.
        e.lookahead = 4;
        let head = e.insert_string();
        if e.find_longest_match(head) {
            assert!(e.match_len <= 4);
        }
    }

    #[test]
    fn match_never_exceeds_max_match() {
        let data = vec![b'r'; 600];
        let mut e = engine_with_window(&data, 300);
        let head = e.insert_string();
        assert!(e.find_longest_match(head));
        assert!(e.match_len <= MAX_MATCH);
        assert!(e.match_len >= MIN_MATCH);
    }

    #[test]
    fn slide_window_rebases_positions_and_clamps_to_sentinel() {
        let mut e = DeflateEngine::new();
        e.strstart = WSIZE + 100;
        e.block_start = (WSIZE + 50) as isize;
        e.match_start = WSIZE + 90;
        e.head[3] = (WSIZE + 7) as u16; // survives, rebased
        e.head[4] = 123; // older than the slide, clamped
        e.prev[9] = (WSIZE as u16) + 1;
        e.prev[10] = 5;

        e.slide_window();

        assert_eq!(e.strstart, 100);
        assert_eq!(e.block_start, 50);
        assert_eq!(e.match_start, 90);
        assert_eq!(e.head[3], 7);
        assert_eq!(e.head[4], 0);
        assert_eq!(e.prev[9], 1);
        assert_eq!(e.prev[10], 0);
    }
}
