// zflate — a DEFLATE (RFC 1951) compression engine

pub mod adler32;
pub mod deflate;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level convenience re-exports for the most common API entry points.
// ─────────────────────────────────────────────────────────────────────────────

/// The streaming compression engine.
pub use deflate::engine::DeflateEngine;

/// One-shot compression at a given level.
pub use deflate::engine::deflate_to_vec;

/// One-shot compression with strategy and preset-dictionary control.
pub use deflate::engine::deflate_to_vec_with;

/// Error type for the engine's fallible operations.
pub use deflate::types::DeflateError;

/// Matching strategy selector.
pub use deflate::types::Strategy;

/// Rolling Adler-32 state (RFC 1950), as maintained by the engine.
pub use adler32::Adler32;
