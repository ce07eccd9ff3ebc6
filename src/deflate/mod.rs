//! The DEFLATE compression engine (RFC 1951).
//!
//! Five cooperating components, leaves first:
//!
//! | module    | responsibility                                               |
//! |-----------|--------------------------------------------------------------|
//! | `pending` | bit-level output accumulator, drained by the caller          |
//! | `huffman` | symbol tally, code construction, block emission              |
//! | `matcher` | sliding window hash chains and longest-match search          |
//! | `engine`  | level/strategy handling, window fill, the three compressors  |
//! | `types`   | RFC 1951 constants, per-level parameters, the error type     |
//!
//! Data flows linearly: staged input → window (checksummed on the way) →
//! matcher → Huffman tally → block close → pending buffer → caller.

pub mod engine;
pub mod huffman;
mod matcher;
pub mod pending;
pub mod types;

pub use engine::{deflate_to_vec, deflate_to_vec_with, DeflateEngine};
pub use types::{DeflateError, Strategy};
