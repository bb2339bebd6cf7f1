//! AES-128-CBC encryption and the derived-key-to-AES-key schedule.

use alloy_primitives::{keccak256, B128};
use cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::error::{KeystoreError, KeystoreResult};

/// IV length for AES-128-CBC.
pub const IV_LENGTH: usize = 16;

/// AES-128 key length.
pub const AES_KEY_LENGTH: usize = 16;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

/// `cipherparams` of an `"aes-128-cbc"` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CipherParams {
    /// Initialization vector as hex.
    pub iv: String,
}

impl CipherParams {
    pub fn new(iv: &[u8; IV_LENGTH]) -> Self {
        Self {
            iv: hex::encode(iv),
        }
    }

    /// Decode the IV.
    pub fn iv(&self) -> KeystoreResult<[u8; IV_LENGTH]> {
        let bytes = hex::decode(&self.iv)
            .map_err(|e| KeystoreError::HexError(format!("invalid IV hex: {}", e)))?;
        bytes.as_slice().try_into().map_err(|_| {
            KeystoreError::CipherError(format!(
                "IV must be {} bytes, got {}",
                IV_LENGTH,
                bytes.len()
            ))
        })
    }
}

/// AES key for a derived key.
///
/// The right-aligned 16 bytes of the derived key are keccak-hashed and the
/// right-aligned 16 bytes of that hash become the key. Interop rule
/// carried over from the key files this store reads; do not swap in the
/// first-half-of-the-derived-key convention used by later formats.
pub fn aes_key(derived_key: &[u8]) -> Zeroizing<[u8; AES_KEY_LENGTH]> {
    let tail = &derived_key[derived_key.len().saturating_sub(AES_KEY_LENGTH)..];
    let aligned = B128::left_padding_from(tail);
    let hash = keccak256(aligned);

    let mut key = Zeroizing::new([0u8; AES_KEY_LENGTH]);
    key.copy_from_slice(&hash[32 - AES_KEY_LENGTH..]);
    key
}

/// Encrypt `plaintext` with AES-128-CBC and PKCS#7 padding.
pub fn encrypt_plaintext(
    plaintext: &[u8],
    key: &[u8; AES_KEY_LENGTH],
    iv: &[u8; IV_LENGTH],
) -> Vec<u8> {
    Aes128CbcEnc::new(key.into(), iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext)
}

/// Decrypt AES-128-CBC + PKCS#7 `ciphertext`.
pub fn decrypt_ciphertext(
    ciphertext: &[u8],
    key: &[u8; AES_KEY_LENGTH],
    iv: &[u8; IV_LENGTH],
) -> KeystoreResult<Zeroizing<Vec<u8>>> {
    Aes128CbcDec::new(key.into(), iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| KeystoreError::CipherError("invalid padding".to_string()))
}

/// Generate a random IV.
pub fn generate_iv() -> [u8; IV_LENGTH] {
    let mut iv = [0u8; IV_LENGTH];
    rand::thread_rng().fill_bytes(&mut iv);
    iv
}
