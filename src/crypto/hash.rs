//! SHA-256 helpers

use sha2::{Digest, Sha256};

/// Size of a SHA-256 digest.
pub const SHA256_HASH_SIZE_BYTES: usize = 32;

/// One-shot SHA-256.
#[must_use]
pub fn calc_sha256(data: &[u8]) -> [u8; SHA256_HASH_SIZE_BYTES] {
    Sha256::digest(data).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            hex::encode(calc_sha256(b"testing")),
            "cf80cd8aed482d5d1527d7dc72fceff84e6326592848447d2dc0b0e87dfc9a90"
        );
    }

    #[test]
    fn test_sha256_empty_input() {
        assert_eq!(
            hex::encode(calc_sha256(&[])),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
