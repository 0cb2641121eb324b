//! Ed25519 signing and verification

use ed25519_dalek::{Signature, Signer as _, Verifier as _, VerifyingKey};

use super::CryptoError;
use super::keys::{ED25519_PUBLIC_KEY_SIZE_BYTES, Ed25519KeyPair, signing_key};

/// Size of an Ed25519 signature.
pub const ED25519_SIGNATURE_SIZE_BYTES: usize = 64;

/// Sign `data` with a 64-byte private key.
pub fn sign_ed25519(
    private_key: &[u8],
    data: &[u8],
) -> Result<[u8; ED25519_SIGNATURE_SIZE_BYTES], CryptoError> {
    Ok(signing_key(private_key)?.sign(data).to_bytes())
}

/// Check an Ed25519 signature.
///
/// A public key of the wrong length is an error; a signature that is
/// malformed or does not match is `Ok(false)`.
pub fn verify_ed25519(
    public_key: &[u8],
    data: &[u8],
    signature: &[u8],
) -> Result<bool, CryptoError> {
    let public_key: &[u8; ED25519_PUBLIC_KEY_SIZE_BYTES] = public_key.try_into().map_err(|_| {
        CryptoError::length("public key", ED25519_PUBLIC_KEY_SIZE_BYTES, public_key.len())
    })?;
    let Ok(signature) = <&[u8; ED25519_SIGNATURE_SIZE_BYTES]>::try_from(signature) else {
        return Ok(false);
    };
    let Ok(key) = VerifyingKey::from_bytes(public_key) else {
        return Ok(false);
    };
    Ok(key.verify(data, &Signature::from_bytes(signature)).is_ok())
}

/// Source of the signer public key and of Ed25519 signatures.
///
/// Implemented by [`LocalSigner`] for in-memory keys; hardware or remote
/// signers implement it to keep private keys out of process.
pub trait Signer {
    /// Public key embedded in every signed envelope.
    fn public_key(&self) -> Result<[u8; ED25519_PUBLIC_KEY_SIZE_BYTES], CryptoError>;

    /// Sign a transaction hash.
    fn sign_ed25519(&self, data: &[u8]) -> Result<[u8; ED25519_SIGNATURE_SIZE_BYTES], CryptoError>;
}

/// Signer backed by an in-memory key pair.
#[derive(Debug, Clone)]
pub struct LocalSigner {
    keys: Ed25519KeyPair,
}

impl LocalSigner {
    /// Wrap an existing key pair.
    #[must_use]
    pub const fn new(keys: Ed25519KeyPair) -> Self {
        Self { keys }
    }

    /// Build from raw key bytes. The public key must be the one derived from
    /// the seed half of the private key.
    pub fn from_keys(public_key: &[u8], private_key: &[u8]) -> Result<Self, CryptoError> {
        if public_key.len() != ED25519_PUBLIC_KEY_SIZE_BYTES {
            return Err(CryptoError::length(
                "public key",
                ED25519_PUBLIC_KEY_SIZE_BYTES,
                public_key.len(),
            ));
        }
        let keys = Ed25519KeyPair::from_private_key(private_key)?;
        if keys.public_key[..] != *public_key {
            return Err(CryptoError::KeyMismatch);
        }
        Ok(Self::new(keys))
    }
}

impl Signer for LocalSigner {
    fn public_key(&self) -> Result<[u8; ED25519_PUBLIC_KEY_SIZE_BYTES], CryptoError> {
        Ok(self.keys.public_key)
    }

    fn sign_ed25519(&self, data: &[u8]) -> Result<[u8; ED25519_SIGNATURE_SIZE_BYTES], CryptoError> {
        sign_ed25519(&self.keys.private_key, data)
    }
}

impl<S: Signer + ?Sized> Signer for &S {
    fn public_key(&self) -> Result<[u8; ED25519_PUBLIC_KEY_SIZE_BYTES], CryptoError> {
        (**self).public_key()
    }

    fn sign_ed25519(&self, data: &[u8]) -> Result<[u8; ED25519_SIGNATURE_SIZE_BYTES], CryptoError> {
        (**self).sign_ed25519(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUBLIC_KEY: &str = "92d469d7c004cc0b24a192d9457836bf38effa27536627ef60718b00b0f33152";
    const PRIVATE_KEY: &str = "3b24b5f9e6b1371c3b5de2e402a96930eeafe52111bb4a1b003e5ecad3fab53892d469d7c004cc0b24a192d9457836bf38effa27536627ef60718b00b0f33152";
    const MESSAGE: &[u8] = b"this is what we want to sign";

    #[test]
    fn test_sign_known_vector() {
        let sig = sign_ed25519(&hex::decode(PRIVATE_KEY).unwrap(), MESSAGE).unwrap();
        assert_eq!(
            hex::encode(sig),
            "cadd1dd49179d81da8dfb6ff76f4d506470c5c608f0478a74ec1e2819f9639a3cc58bbdfb36a5e02c19763c1df164508a49731a076f047412f10e14840c46b01"
        );
    }

    #[test]
    fn test_verify_detects_tampering() {
        let pk = hex::decode(PUBLIC_KEY).unwrap();
        let mut sig = sign_ed25519(&hex::decode(PRIVATE_KEY).unwrap(), MESSAGE).unwrap();
        assert!(verify_ed25519(&pk, MESSAGE, &sig).unwrap());
        assert!(!verify_ed25519(&pk, b"this is what we want to sign!", &sig).unwrap());
        sig[0] = sig[0].wrapping_add(1);
        assert!(!verify_ed25519(&pk, MESSAGE, &sig).unwrap());
    }

    #[test]
    fn test_verify_malformed_inputs() {
        let pk = hex::decode(PUBLIC_KEY).unwrap();
        assert!(!verify_ed25519(&pk, MESSAGE, &[0u8; 10]).unwrap());
        assert!(verify_ed25519(&pk[..31], MESSAGE, &[0u8; 64]).is_err());
    }

    #[test]
    fn test_sign_rejects_short_private_key() {
        assert!(sign_ed25519(&[0u8; 63], MESSAGE).is_err());
    }

    #[test]
    fn test_local_signer() {
        let signer = LocalSigner::from_keys(
            &hex::decode(PUBLIC_KEY).unwrap(),
            &hex::decode(PRIVATE_KEY).unwrap(),
        )
        .unwrap();
        assert_eq!(hex::encode(signer.public_key().unwrap()), PUBLIC_KEY);
        let sig = signer.sign_ed25519(MESSAGE).unwrap();
        assert!(verify_ed25519(&signer.public_key().unwrap(), MESSAGE, &sig).unwrap());
    }

    #[test]
    fn test_local_signer_rejects_foreign_public_key() {
        let other = Ed25519KeyPair::from_seed(&[9; 32]);
        assert_eq!(
            LocalSigner::from_keys(&other.public_key, &hex::decode(PRIVATE_KEY).unwrap())
                .unwrap_err(),
            CryptoError::KeyMismatch
        );
        assert!(matches!(
            LocalSigner::from_keys(&[0u8; 31], &hex::decode(PRIVATE_KEY).unwrap()),
            Err(CryptoError::InvalidLength { what: "public key", .. })
        ));
    }
}
