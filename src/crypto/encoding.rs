//! Checksummed hex
//!
//! Letters are upper-cased when the matching nibble of the SHA-256 of the
//! raw bytes is above 7, so a typo in a mixed-case string is detected.
//! Strings in a single case carry no checksum and are always accepted.

use super::CryptoError;
use super::hash::{SHA256_HASH_SIZE_BYTES, calc_sha256};

const HEX_PREFIX: &str = "0x";
const LOWER_HEX: &[u8; 16] = b"0123456789abcdef";

fn encode_checksummed(data: &[u8]) -> String {
    let hash = calc_sha256(data);
    let mut out = String::with_capacity(HEX_PREFIX.len() + 2 * data.len());
    out.push_str(HEX_PREFIX);
    for (i, nibble) in data.iter().flat_map(|b| [b >> 4, b & 0x0f]).enumerate() {
        let hash_byte = hash[(i / 2) % SHA256_HASH_SIZE_BYTES];
        let hash_nibble = if i % 2 == 0 { hash_byte >> 4 } else { hash_byte & 0x0f };
        let c = char::from(LOWER_HEX[usize::from(nibble)]);
        if c.is_ascii_alphabetic() && hash_nibble > 7 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Encode as `0x`-prefixed checksummed hex.
#[must_use]
pub fn encode_hex(data: &[u8]) -> String {
    encode_checksummed(data)
}

fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Decode hex with an optional `0x` prefix, verifying the checksum when the
/// input mixes cases.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, CryptoError> {
    let digits = s.strip_prefix(HEX_PREFIX).unwrap_or(s);
    if digits.len() % 2 != 0 {
        return Err(CryptoError::InvalidHex {
            reason: "odd number of digits",
        });
    }
    let data = digits
        .as_bytes()
        .chunks_exact(2)
        .map(|pair| Some((nibble(pair[0])? << 4) | nibble(pair[1])?))
        .collect::<Option<Vec<u8>>>()
        .ok_or(CryptoError::InvalidHex {
            reason: "non-hex character",
        })?;

    let uniform = !digits.bytes().any(|c| c.is_ascii_lowercase())
        || !digits.bytes().any(|c| c.is_ascii_uppercase());
    if !uniform && encode_checksummed(&data)[HEX_PREFIX.len()..] != *digits {
        return Err(CryptoError::ChecksumMismatch);
    }
    Ok(data)
}
