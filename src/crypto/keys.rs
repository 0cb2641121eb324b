//! Ed25519 key material

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;

use super::CryptoError;

/// Size of an Ed25519 public key.
pub const ED25519_PUBLIC_KEY_SIZE_BYTES: usize = 32;

/// Size of an Ed25519 private key: 32-byte seed followed by the public key.
pub const ED25519_PRIVATE_KEY_SIZE_BYTES: usize = 64;

/// Size of the secret seed at the start of a private key.
pub const ED25519_SEED_SIZE_BYTES: usize =
    ED25519_PRIVATE_KEY_SIZE_BYTES - ED25519_PUBLIC_KEY_SIZE_BYTES;

/// Ed25519 key pair in the 64-byte private key layout used on the wire.
#[derive(Clone, PartialEq, Eq)]
pub struct Ed25519KeyPair {
    /// Public key
    pub public_key: [u8; ED25519_PUBLIC_KEY_SIZE_BYTES],
    /// Seed followed by the public key
    pub private_key: [u8; ED25519_PRIVATE_KEY_SIZE_BYTES],
}

impl Ed25519KeyPair {
    /// Generate a fresh key pair from OS randomness.
    #[must_use]
    pub fn generate() -> Self {
        Self::from_signing_key(&SigningKey::generate(&mut OsRng))
    }

    /// Derive the key pair from a 32-byte seed.
    #[must_use]
    pub fn from_seed(seed: &[u8; ED25519_SEED_SIZE_BYTES]) -> Self {
        Self::from_signing_key(&SigningKey::from_bytes(seed))
    }

    /// Rebuild the key pair from a 64-byte private key.
    pub fn from_private_key(private_key: &[u8]) -> Result<Self, CryptoError> {
        Ok(Self::from_signing_key(&signing_key(private_key)?))
    }

    fn from_signing_key(key: &SigningKey) -> Self {
        let public_key = key.verifying_key().to_bytes();
        let mut private_key = [0u8; ED25519_PRIVATE_KEY_SIZE_BYTES];
        private_key[..ED25519_SEED_SIZE_BYTES].copy_from_slice(&key.to_bytes());
        private_key[ED25519_SEED_SIZE_BYTES..].copy_from_slice(&public_key);
        Self {
            public_key,
            private_key,
        }
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519KeyPair")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Signing key from the seed half of a 64-byte private key.
pub(crate) fn signing_key(private_key: &[u8]) -> Result<SigningKey, CryptoError> {
    if private_key.len() != ED25519_PRIVATE_KEY_SIZE_BYTES {
        return Err(CryptoError::length(
            "private key",
            ED25519_PRIVATE_KEY_SIZE_BYTES,
            private_key.len(),
        ));
    }
    let mut seed = [0u8; ED25519_SEED_SIZE_BYTES];
    seed.copy_from_slice(&private_key[..ED25519_SEED_SIZE_BYTES]);
    Ok(SigningKey::from_bytes(&seed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_private_key_embeds_public_key() {
        let pair = Ed25519KeyPair::generate();
        assert_eq!(&pair.private_key[32..], &pair.public_key);
        assert_eq!(Ed25519KeyPair::from_private_key(&pair.private_key).unwrap(), pair);
    }

    #[test]
    fn test_generated_keys_differ() {
        assert_ne!(
            Ed25519KeyPair::generate().public_key,
            Ed25519KeyPair::generate().public_key
        );
    }

    #[test]
    fn test_known_seed() {
        let seed: [u8; 32] =
            hex::decode("3b24b5f9e6b1371c3b5de2e402a96930eeafe52111bb4a1b003e5ecad3fab538")
                .unwrap()
                .try_into()
                .unwrap();
        let pair = Ed25519KeyPair::from_seed(&seed);
        assert_eq!(
            hex::encode(pair.public_key),
            "92d469d7c004cc0b24a192d9457836bf38effa27536627ef60718b00b0f33152"
        );
    }

    #[test]
    fn test_private_key_length_is_checked() {
        assert!(matches!(
            Ed25519KeyPair::from_private_key(&[0u8; 32]),
            Err(CryptoError::InvalidLength { expected: 64, got: 32, .. })
        ));
    }
}
