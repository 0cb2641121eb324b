//! Client error types

use thiserror::Error;

use crate::crypto::CryptoError;
use crate::membuffers::CodecError;

/// Errors raised while building requests or decoding responses.
#[derive(Error, Debug)]
pub enum Error {
    /// Request carries a protocol version other than the supported one
    #[error("expected protocol version {expected}, {found} given")]
    InvalidProtocolVersion {
        /// Supported version
        expected: u32,
        /// Version on the request
        found: u32,
    },

    /// Input value has the wrong size
    #[error("expected {what} length {expected}, {found} given")]
    InvalidLength {
        /// Kind of value being checked
        what: &'static str,
        /// Required length
        expected: usize,
        /// Supplied length
        found: usize,
    },

    /// Response failed the structural scan
    #[error("response is corrupt and cannot be decoded")]
    CorruptResponse,

    /// Packed argument carries a selector outside the known variants
    #[error("received argument {index} has unknown type {tag}")]
    UnknownArgumentType {
        /// Position of the argument in its array
        index: usize,
        /// Selector read from the wire
        tag: u16,
    },

    /// Status field holds the reserved zero value
    #[error("reserved {kind} received")]
    ReservedStatus {
        /// Status family
        kind: &'static str,
    },

    /// Status field holds a value this client does not know
    #[error("unsupported {kind} received: {value}")]
    UnsupportedStatus {
        /// Status family
        kind: &'static str,
        /// Raw value
        value: u16,
    },

    /// Wire format error
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Hashing, key or signature error
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Transport could not deliver the request
    #[error("transport error: {0}")]
    Transport(String),

    /// Node answered with something other than a membuffers response
    #[error("http error: {0}")]
    Http(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
