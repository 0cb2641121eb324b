//! Hashing, addresses, checksummed hex and Ed25519 signatures

mod digest;
mod encoding;
mod error;
mod hash;
mod keys;
mod signature;

pub use digest::{
    CLIENT_ADDRESS_SHA256_OFFSET, CLIENT_ADDRESS_SIZE_BYTES, TX_ID_SIZE_BYTES,
    TX_ID_TIMESTAMP_SIZE_BYTES, calc_client_address_of_ed25519_public_key, calc_query_hash,
    calc_tx_hash, contract_name_to_address_as_bytes, extract_tx_id, generate_tx_id,
};
pub use encoding::{decode_hex, encode_hex};
pub use error::CryptoError;
pub use hash::{SHA256_HASH_SIZE_BYTES, calc_sha256};
pub use keys::{
    ED25519_PRIVATE_KEY_SIZE_BYTES, ED25519_PUBLIC_KEY_SIZE_BYTES, ED25519_SEED_SIZE_BYTES,
    Ed25519KeyPair,
};
pub use signature::{
    ED25519_SIGNATURE_SIZE_BYTES, LocalSigner, Signer, sign_ed25519, verify_ed25519,
};
