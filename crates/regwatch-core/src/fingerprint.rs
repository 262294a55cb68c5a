//! Content fingerprinting for change detection
//!
//! A fingerprint is a hex-encoded SHA-256 digest over the raw bytes of the
//! stored content. No normalization happens here; whatever the store holds is
//! exactly what gets hashed, so the stored fingerprint always matches the
//! stored content.

use sha2::{Digest, Sha256};

/// Compute the fingerprint of a piece of content
///
/// Total and deterministic: the same content yields the same digest across
/// process restarts, and the empty string is a valid input.
pub fn fingerprint(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
