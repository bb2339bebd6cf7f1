//! Keystore error types

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during keystore operations
#[derive(Debug, Error)]
pub enum KeystoreError {
    /// KDF or PRF the reader does not implement
    #[error("unsupported kdf: {0}")]
    UnsupportedKdf(String),

    /// Cipher the reader does not implement
    #[error("unsupported cipher: {0}")]
    UnsupportedCipher(String),

    /// Wrong passphrase or tampered ciphertext; the two are
    /// indistinguishable by design
    #[error("MAC mismatch")]
    MacMismatch,

    /// Key file id is not a canonical UUID
    #[error("malformed UUID: {0}")]
    MalformedUuid(String),

    /// Key file structure does not match the secret storage schema
    #[error("malformed key file: {0}")]
    MalformedKeyFile(String),

    /// No key tracked under the given id
    #[error("no key with id {0}")]
    KeyNotFound(Uuid),

    /// Key derivation failed
    #[error("key derivation failed: {0}")]
    KdfError(String),

    /// Encryption/decryption failed
    #[error("cipher operation failed: {0}")]
    CipherError(String),

    /// Invalid hex encoding
    #[error("invalid hex encoding: {0}")]
    HexError(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for keystore operations
pub type KeystoreResult<T> = Result<T, KeystoreError>;
