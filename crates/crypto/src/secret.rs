//! Private key scalar container with automatic memory zeroing.

use k256::ecdsa::SigningKey;
use rand::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// Decrypted byte material, zeroized on drop.
///
/// Used for plaintext coming out of the keystore. The inner bytes are only
/// reachable through `expose_secret()`.
pub type SecretBytes = secrecy::SecretBox<Vec<u8>>;

/// secp256k1 private key scalar (32 bytes).
///
/// The bytes are zeroized when the value is dropped, on every exit path.
/// Range validation (`0 < scalar < n`) happens at the curve boundary:
/// [`crate::secp256k1::to_public`] and [`crate::secp256k1::sign`] reject
/// out-of-range scalars with `InvalidSecretKey`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret {
    inner: [u8; 32],
}

impl Secret {
    /// Generate a fresh random secret.
    ///
    /// The scalar comes from the curve library's rejection sampling, so it
    /// is always in `(0, n)`.
    pub fn random<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        let key = SigningKey::random(rng);
        Self {
            inner: key.to_bytes().into(),
        }
    }

    /// Wrap raw scalar bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { inner: bytes }
    }

    /// Parse from hex, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|_| CryptoError::InvalidSecretKey)?;
        let inner: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidSecretKey)?;
        Ok(Self { inner })
    }

    /// Raw scalar bytes.
    ///
    /// The returned reference should be used immediately and not stored;
    /// the bytes are zeroized when this `Secret` is dropped.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.inner
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secret")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
