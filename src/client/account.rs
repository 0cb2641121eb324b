//! Accounts and client addresses

use std::fmt;

use crate::crypto::{
    CLIENT_ADDRESS_SIZE_BYTES, ED25519_PRIVATE_KEY_SIZE_BYTES, ED25519_PUBLIC_KEY_SIZE_BYTES,
    Ed25519KeyPair, LocalSigner, calc_client_address_of_ed25519_public_key, decode_hex,
    encode_hex,
};
use crate::protocol::{Error, Result};

/// Key pair together with its checksummed address.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    /// Ed25519 public key
    pub public_key: [u8; ED25519_PUBLIC_KEY_SIZE_BYTES],
    /// Seed followed by the public key
    pub private_key: [u8; ED25519_PRIVATE_KEY_SIZE_BYTES],
    /// `0x`-prefixed checksummed address
    pub address: String,
}

impl Account {
    /// Derive the account of an existing key pair.
    pub fn from_key_pair(keys: &Ed25519KeyPair) -> Result<Self> {
        let address = calc_client_address_of_ed25519_public_key(&keys.public_key)?;
        Ok(Self {
            public_key: keys.public_key,
            private_key: keys.private_key,
            address: encode_hex(&address),
        })
    }

    /// Signer over this account's keys.
    #[must_use]
    pub fn signer(&self) -> LocalSigner {
        LocalSigner::new(Ed25519KeyPair {
            public_key: self.public_key,
            private_key: self.private_key,
        })
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("public_key", &encode_hex(&self.public_key))
            .field("private_key", &"<redacted>")
            .field("address", &self.address)
            .finish()
    }
}

/// Generate a fresh account from OS randomness.
pub fn create_account() -> Result<Account> {
    Account::from_key_pair(&Ed25519KeyPair::generate())
}

/// Parse a checksummed hex address.
pub fn address_to_bytes(address: &str) -> Result<[u8; CLIENT_ADDRESS_SIZE_BYTES]> {
    let bytes = decode_hex(address)?;
    bytes.as_slice().try_into().map_err(|_| Error::InvalidLength {
        what: "address",
        expected: CLIENT_ADDRESS_SIZE_BYTES,
        found: bytes.len(),
    })
}

/// Format a 20-byte address as checksummed hex.
pub fn bytes_to_address(bytes: &[u8]) -> Result<String> {
    if bytes.len() != CLIENT_ADDRESS_SIZE_BYTES {
        return Err(Error::InvalidLength {
            what: "address",
            expected: CLIENT_ADDRESS_SIZE_BYTES,
            found: bytes.len(),
        });
    }
    Ok(encode_hex(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Signer;

    #[test]
    fn test_known_address() {
        let seed: [u8; 32] =
            hex::decode("3b24b5f9e6b1371c3b5de2e402a96930eeafe52111bb4a1b003e5ecad3fab538")
                .unwrap()
                .try_into()
                .unwrap();
        let account = Account::from_key_pair(&Ed25519KeyPair::from_seed(&seed)).unwrap();
        assert_eq!(
            account.address.to_lowercase(),
            "0x2c8f29057e3869e0d316ed80df6c192daf83153f"
        );
        assert_eq!(
            hex::encode(address_to_bytes(&account.address).unwrap()),
            "2c8f29057e3869e0d316ed80df6c192daf83153f"
        );
    }

    #[test]
    fn test_generated_accounts_differ() {
        let a = create_account().unwrap();
        let b = create_account().unwrap();
        assert_ne!(a.public_key, b.public_key);
        assert_eq!(a.signer().public_key().unwrap(), a.public_key);
        assert!(a.address.starts_with("0x"));
    }

    #[test]
    fn test_address_round_trip_and_length() {
        let bytes = [0xAB; 20];
        let address = bytes_to_address(&bytes).unwrap();
        assert_eq!(address_to_bytes(&address).unwrap(), bytes);
        assert!(matches!(
            bytes_to_address(&[0; 19]),
            Err(Error::InvalidLength { found: 19, .. })
        ));
        assert!(matches!(
            address_to_bytes("0x0102"),
            Err(Error::InvalidLength { found: 2, .. })
        ));
    }

    #[test]
    fn test_debug_hides_private_key() {
        let account = create_account().unwrap();
        assert!(format!("{account:?}").contains("<redacted>"));
    }
}
