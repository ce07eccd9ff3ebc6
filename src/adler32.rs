//! Thin wrapper around the `adler32` crate providing the rolling Adler-32
//! (RFC 1950) state the engine maintains over every byte that enters the
//! sliding window.
//!
//! The engine never emits the checksum itself — the zlib/PNG wrapper outside
//! the core appends it — so only the running value is exposed.
//!
//! # Parity vectors
//! * empty input → `0x0000_0001` (the RFC 1950 initial value)
//! * `b"a"` → `0x0062_0062`

use adler32::RollingAdler32;

/// Rolling Adler-32 accumulator, initial value 1.
pub struct Adler32 {
    inner: RollingAdler32,
}

impl Adler32 {
    pub fn new() -> Self {
        Self {
            inner: RollingAdler32::new(),
        }
    }

    /// Fold a byte slice into the running checksum.
    #[inline]
    pub fn update(&mut self, buf: &[u8]) {
        self.inner.update_buffer(buf);
    }

    /// Current checksum value.
    #[inline]
    pub fn value(&self) -> u32 {
        self.inner.hash()
    }

    /// Restore the initial value (1).
    pub fn reset(&mut self) {
        self.inner = RollingAdler32::new();
    }
}

impl Default for Adler32 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_value_is_one() {
        assert_eq!(Adler32::new().value(), 1);
    }

    #[test]
    fn single_byte_vector() {
        let mut a = Adler32::new();
        a.update(b"a");
        assert_eq!(a.value(), 0x0062_0062);
    }

    #[test]
    fn wikipedia_vector() {
        let mut a = Adler32::new();
        a.update(b"Wikipedia");
        assert_eq!(a.value(), 0x11E6_0398);
    }

    #[test]
    fn split_updates_match_one_shot() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let mut whole = Adler32::new();
        whole.update(data);
        let mut split = Adler32::new();
        split.update(&data[..7]);
        split.update(&data[7..]);
        assert_eq!(whole.value(), split.value());
    }

    #[test]
    fn reset_restores_initial_value() {
        let mut a = Adler32::new();
        a.update(b"some bytes");
        a.reset();
        assert_eq!(a.value(), 1);
    }
}
