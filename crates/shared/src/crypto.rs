//! Hashing helpers for values stored server side (refresh token ids).

use sha2::{Digest, Sha256};

/// SHA-256 of the input as lowercase hex.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
