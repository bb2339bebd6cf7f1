//! Curve-layer error types

use thiserror::Error;

/// Errors from secp256k1 key and signature operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Secret scalar is zero or not below the group order
    #[error("invalid secret key scalar")]
    InvalidSecretKey,

    /// Public key bytes do not parse as a curve point
    #[error("invalid public key point")]
    InvalidPublicKey,

    /// Recovery id out of range, malformed compact bytes, or an
    /// unrecoverable signature
    #[error("invalid signature")]
    InvalidSignature,
}
