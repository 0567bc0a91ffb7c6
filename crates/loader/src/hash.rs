//! Content hashing for cache-busting polyfill file names.

use md5::{Digest, Md5};

/// md5 digest of `code`, as lowercase hex.
///
/// Deterministic for identical input bytes; any single-byte change produces a
/// different digest.
pub fn content_hash(code: &str) -> String {
    let digest = Md5::digest(code.as_bytes());
    format!("{digest:x}")
}
