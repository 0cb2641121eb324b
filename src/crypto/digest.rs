//! Transaction hashes, transaction ids and addresses

use super::hash::{SHA256_HASH_SIZE_BYTES, calc_sha256};
use super::keys::ED25519_PUBLIC_KEY_SIZE_BYTES;
use super::CryptoError;

/// Size of a client or contract address.
pub const CLIENT_ADDRESS_SIZE_BYTES: usize = 20;

/// Offset inside a SHA-256 digest where the address starts.
pub const CLIENT_ADDRESS_SHA256_OFFSET: usize = SHA256_HASH_SIZE_BYTES - CLIENT_ADDRESS_SIZE_BYTES;

/// Size of the timestamp prefix of a transaction id.
pub const TX_ID_TIMESTAMP_SIZE_BYTES: usize = 8;

/// Size of a transaction id: little-endian timestamp followed by the tx hash.
pub const TX_ID_SIZE_BYTES: usize = TX_ID_TIMESTAMP_SIZE_BYTES + SHA256_HASH_SIZE_BYTES;

/// Hash of an encoded, unsigned transaction.
#[must_use]
pub fn calc_tx_hash(transaction: &[u8]) -> [u8; SHA256_HASH_SIZE_BYTES] {
    calc_sha256(transaction)
}

/// Hash of an encoded, unsigned query.
#[must_use]
pub fn calc_query_hash(query: &[u8]) -> [u8; SHA256_HASH_SIZE_BYTES] {
    calc_sha256(query)
}

/// Build the 40-byte transaction id.
#[must_use]
pub fn generate_tx_id(
    tx_hash: &[u8; SHA256_HASH_SIZE_BYTES],
    timestamp: u64,
) -> [u8; TX_ID_SIZE_BYTES] {
    let mut id = [0u8; TX_ID_SIZE_BYTES];
    id[..TX_ID_TIMESTAMP_SIZE_BYTES].copy_from_slice(&timestamp.to_le_bytes());
    id[TX_ID_TIMESTAMP_SIZE_BYTES..].copy_from_slice(tx_hash);
    id
}

/// Split a transaction id into its hash and timestamp.
pub fn extract_tx_id(tx_id: &[u8]) -> Result<([u8; SHA256_HASH_SIZE_BYTES], u64), CryptoError> {
    if tx_id.len() != TX_ID_SIZE_BYTES {
        return Err(CryptoError::length("tx id", TX_ID_SIZE_BYTES, tx_id.len()));
    }
    let (ts, hash) = tx_id.split_at(TX_ID_TIMESTAMP_SIZE_BYTES);
    let mut ts_bytes = [0u8; TX_ID_TIMESTAMP_SIZE_BYTES];
    ts_bytes.copy_from_slice(ts);
    let mut tx_hash = [0u8; SHA256_HASH_SIZE_BYTES];
    tx_hash.copy_from_slice(hash);
    Ok((tx_hash, u64::from_le_bytes(ts_bytes)))
}

fn address_of(data: &[u8]) -> [u8; CLIENT_ADDRESS_SIZE_BYTES] {
    let mut address = [0u8; CLIENT_ADDRESS_SIZE_BYTES];
    address.copy_from_slice(&calc_sha256(data)[CLIENT_ADDRESS_SHA256_OFFSET..]);
    address
}

/// Address of an Ed25519 public key: the last 20 bytes of its SHA-256.
pub fn calc_client_address_of_ed25519_public_key(
    public_key: &[u8],
) -> Result<[u8; CLIENT_ADDRESS_SIZE_BYTES], CryptoError> {
    if public_key.len() != ED25519_PUBLIC_KEY_SIZE_BYTES {
        return Err(CryptoError::length(
            "public key",
            ED25519_PUBLIC_KEY_SIZE_BYTES,
            public_key.len(),
        ));
    }
    Ok(address_of(public_key))
}

/// Address of a deployed contract, derived from its name.
pub fn contract_name_to_address_as_bytes(
    contract_name: &str,
) -> Result<[u8; CLIENT_ADDRESS_SIZE_BYTES], CryptoError> {
    if contract_name.is_empty() {
        return Err(CryptoError::EmptyContractName);
    }
    Ok(address_of(contract_name.as_bytes()))
}
