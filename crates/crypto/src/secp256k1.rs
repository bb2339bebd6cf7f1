//! secp256k1 curve operations in the Ethereum signature convention.
//!
//! Built on the `k256` crate: recoverable ECDSA with RFC 6979 deterministic
//! nonces, SEC1 point encoding, and low-S normalization at the signing
//! boundary. `k256` is pure Rust, so there is no process-wide context to
//! initialize or tear down.

use k256::{
    ecdsa::{
        signature::hazmat::PrehashVerifier, RecoveryId, Signature as EcdsaSignature, SigningKey,
        VerifyingKey,
    },
    elliptic_curve::sec1::ToEncodedPoint,
};
use rand::{CryptoRng, RngCore};

use crate::address::public_to_address;
use crate::error::CryptoError;
use crate::secret::Secret;
use crate::signature::Signature;
use crate::types::{Address, Hash256, Public, PublicCompressed};

fn signing_key(secret: &Secret) -> Result<SigningKey, CryptoError> {
    SigningKey::from_slice(secret.as_bytes()).map_err(|_| CryptoError::InvalidSecretKey)
}

/// Serialize a verifying key as X || Y, dropping the 0x04 SEC1 prefix.
fn serialize_uncompressed(key: &VerifyingKey) -> Public {
    let point = key.to_encoded_point(false);
    Public::from_slice(&point.as_bytes()[1..])
}

/// Derive the uncompressed public key (X || Y) for a secret.
///
/// Fails with `InvalidSecretKey` if the scalar is zero or not below the
/// group order.
pub fn to_public(secret: &Secret) -> Result<Public, CryptoError> {
    let key = signing_key(secret)?;
    Ok(serialize_uncompressed(key.verifying_key()))
}

/// Decompress a 33-byte SEC1 public key into the X || Y form.
pub fn decompress(public: &PublicCompressed) -> Result<Public, CryptoError> {
    let key = VerifyingKey::from_sec1_bytes(public.as_slice())
        .map_err(|_| CryptoError::InvalidPublicKey)?;
    Ok(serialize_uncompressed(&key))
}

/// Derive the compressed public key: 0x02 prefix if Y is even, else 0x03.
pub fn to_public_compressed(secret: &Secret) -> Result<PublicCompressed, CryptoError> {
    let key = signing_key(secret)?;
    let point = key.verifying_key().to_encoded_point(true);
    Ok(PublicCompressed::from_slice(point.as_bytes()))
}

/// Sign a 32-byte message hash, producing a recoverable signature.
///
/// The result is low-S normalized: if `s > n/2` it is replaced by `n - s`
/// and the recovery id parity flips, so `s <= n/2` and `v` is 0 or 1.
pub fn sign(secret: &Secret, hash: &Hash256) -> Result<Signature, CryptoError> {
    let key = signing_key(secret)?;
    let (sig, recovery_id) = key
        .sign_prehash_recoverable(hash.as_slice())
        .map_err(|_| CryptoError::InvalidSignature)?;
    let (sig, recovery_id) = match sig.normalize_s() {
        Some(normalized) => (
            normalized,
            RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced()),
        ),
        None => (sig, recovery_id),
    };
    Ok(Signature::from_parts(
        &sig.to_bytes().into(),
        recovery_id.to_byte(),
    ))
}

/// Recover the signer's public key from a signature over `hash`.
///
/// Fails with `InvalidSignature` when `v > 3`, when `r || s` does not
/// parse, or when no point can be recovered.
pub fn recover(sig: &Signature, hash: &Hash256) -> Result<Public, CryptoError> {
    let recovery_id = RecoveryId::from_byte(sig.v()).ok_or(CryptoError::InvalidSignature)?;
    let parsed = EcdsaSignature::from_slice(sig.rs()).map_err(|_| CryptoError::InvalidSignature)?;
    let key = VerifyingKey::recover_from_prehash(hash.as_slice(), &parsed, recovery_id)
        .map_err(|_| CryptoError::InvalidSignature)?;
    Ok(serialize_uncompressed(&key))
}

/// Check that `sig` over `hash` was produced by `public`.
///
/// Implemented as recover-and-compare; an all-zero public key never
/// verifies.
pub fn verify(public: &Public, sig: &Signature, hash: &Hash256) -> bool {
    if public.is_zero() {
        return false;
    }
    matches!(recover(sig, hash), Ok(recovered) if recovered == *public)
}

/// Standard (non-recoverable) ECDSA verification of a 64-byte `r || s`
/// signature against a compressed public key.
pub fn verify_compressed(public: &PublicCompressed, sig: &[u8; 64], hash: &Hash256) -> bool {
    let Ok(parsed) = EcdsaSignature::from_slice(sig) else {
        return false;
    };
    let Ok(key) = VerifyingKey::from_sec1_bytes(public.as_slice()) else {
        return false;
    };
    key.verify_prehash(hash.as_slice(), &parsed).is_ok()
}

/// A secret paired with its derived public key.
#[derive(Clone)]
pub struct KeyPair {
    secret: Secret,
    public: Public,
}

impl KeyPair {
    /// Generate a fresh random key pair.
    pub fn generate<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        let key = SigningKey::random(rng);
        let public = serialize_uncompressed(key.verifying_key());
        Self {
            secret: Secret::from_bytes(key.to_bytes().into()),
            public,
        }
    }

    /// Build from an existing secret, validating it.
    pub fn from_secret(secret: Secret) -> Result<Self, CryptoError> {
        let public = to_public(&secret)?;
        Ok(Self { secret, public })
    }

    pub fn secret(&self) -> &Secret {
        &self.secret
    }

    pub fn public(&self) -> &Public {
        &self.public
    }

    /// The account address controlled by this key pair.
    pub fn address(&self) -> Address {
        public_to_address(&self.public)
    }

    /// Sign a message hash with this key pair's secret.
    pub fn sign(&self, hash: &Hash256) -> Result<Signature, CryptoError> {
        sign(&self.secret, hash)
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public)
            .field("address", &self.address())
            .finish()
    }
}
