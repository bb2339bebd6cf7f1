//! Cryptographic identity and key storage for Ember
//!
//! This crate provides:
//! - secp256k1 recoverable ECDSA in the Ethereum convention: 65-byte
//!   `r || s || v` signatures, low-S normalized, `v` in {0, 1}
//! - Address derivation from public keys and the CREATE contract rule
//! - A passphrase-encrypted on-disk key store (Web3 Secret Storage,
//!   PBKDF2 + AES-128-CBC variant) with an in-memory decrypted cache

pub mod address;
pub mod error;
pub mod keystore;
pub mod secp256k1;
pub mod secret;
pub mod signature;
pub mod types;

// Curve layer exports
pub use secp256k1::{
    decompress, recover, sign, to_public, to_public_compressed, verify, verify_compressed, KeyPair,
};

// Address derivation exports
pub use address::{contract_address, public_to_address, secret_to_address};

// Key material exports
pub use secret::{Secret, SecretBytes};
pub use signature::{Signature, SECP256K1_HALF_N, SECP256K1_N};
pub use types::{Hash128, Hash256, Public, PublicCompressed};

// Keystore exports
pub use keystore::{CryptoJson, KeystoreError, SecretStore};

// Error exports
pub use error::CryptoError;
