//! Digest, encoding and signature errors

use thiserror::Error;

/// Failures raised by hashing helpers, hex encoding and Ed25519 signing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Input has the wrong length for what it claims to be.
    #[error("invalid {what} length: expected {expected} bytes, got {got}")]
    InvalidLength {
        /// Kind of value being checked
        what: &'static str,
        /// Required length
        expected: usize,
        /// Supplied length
        got: usize,
    },

    /// Public key does not belong to the private key it was paired with.
    #[error("public key does not match the private key")]
    KeyMismatch,

    /// Hex string is malformed.
    #[error("invalid hex string: {reason}")]
    InvalidHex {
        /// What is wrong with the input
        reason: &'static str,
    },

    /// Mixed-case hex whose letter casing does not match its checksum.
    #[error("invalid hex checksum")]
    ChecksumMismatch,

    /// Contract name is empty.
    #[error("contract name must not be empty")]
    EmptyContractName,

    /// An external signer failed to produce a key or signature.
    #[error("signer failure: {0}")]
    Signer(String),
}

impl CryptoError {
    pub(crate) fn length(what: &'static str, expected: usize, got: usize) -> Self {
        Self::InvalidLength {
            what,
            expected,
            got,
        }
    }
}
