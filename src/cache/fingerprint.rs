// Prompt fingerprinting for cache keys
// Author: kelexine (https://github.com/kelexine)

use sha2::{Digest, Sha256};

/// Length of every fingerprint in hex characters.
pub const FINGERPRINT_LEN: usize = 64;

/// Map prompt text to a fixed-length cache key.
///
/// The key is the lowercase hex SHA-256 of the exact UTF-8 bytes. No
/// normalization is applied: prompts differing only in case, whitespace or
/// Unicode form are distinct entries.
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
