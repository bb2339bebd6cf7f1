//! Passphrase-encrypted key storage (Web3 Secret Storage, PBKDF2 +
//! AES-128-CBC variant).
//!
//! On-disk layout: one `<uuid>.json` per key, containing
//! `{"crypto": ..., "id": "<uuid>", "version": 3}`. The `crypto` object is
//! produced by [`codec`]: PBKDF2-HMAC-SHA256 key derivation, a
//! keccak-based MAC over the derived-key tail and the ciphertext, and
//! AES-128-CBC encryption of the secret.
//!
//! # Security Properties
//!
//! - Secrets are encrypted at rest under a user passphrase
//! - The MAC is checked before anything is decrypted; wrong passphrase and
//!   tampered ciphertext are indistinguishable
//! - Decrypted plaintext lives only in the store's cache and is zeroized
//!   on eviction and on drop
//!
//! # Example
//!
//! ```rust,ignore
//! use ember_crypto::keystore::SecretStore;
//!
//! let mut store = SecretStore::open("./keys")?;
//! let id = store.import_secret(secret.as_bytes(), "my-passphrase")?;
//!
//! // Later, possibly after a restart: the passphrase provider is only
//! // invoked when the entry is not cached.
//! let secret = store.secret(&id, || Ok(prompt_passphrase()?))?;
//! ```

mod cipher;
mod codec;
mod error;
mod kdf;
mod mac;
mod store;

pub use cipher::{CipherParams, IV_LENGTH};
pub use codec::{decrypt, encrypt, encrypt_with, CryptoJson};
pub use error::{KeystoreError, KeystoreResult};
pub use kdf::{KdfParams, KDF_DKLEN, KDF_ITERATIONS, SALT_LENGTH};
pub use mac::compute_mac;
pub use store::{SecretStore, KEY_FILE_VERSION, KEY_FILE_VERSION_LEGACY};
