//! Encrypt and decrypt a secret under a passphrase, in the secret storage
//! `crypto` JSON shape.

use secrecy::SecretBox;
use serde::{Deserialize, Serialize};

use super::cipher::{self, CipherParams, IV_LENGTH};
use super::error::{KeystoreError, KeystoreResult};
use super::kdf::{self, KdfParams, SALT_LENGTH};
use super::mac::{compute_mac, constant_time_eq};
use crate::secret::SecretBytes;

/// The `crypto` object of a key file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CryptoJson {
    /// Cipher identifier; this store writes `"aes-128-cbc"`.
    pub cipher: String,
    /// Ciphertext as hex.
    pub ciphertext: String,
    /// Cipher parameters (the IV).
    pub cipherparams: CipherParams,
    /// KDF identifier; this store writes `"pbkdf2"`.
    pub kdf: String,
    /// KDF parameters.
    pub kdfparams: KdfParams,
    /// `keccak256(last16(derived_key) || ciphertext)` as hex.
    pub mac: String,
}

/// Encrypt `secret` under `passphrase` with a fresh random salt and IV.
pub fn encrypt(secret: &[u8], passphrase: &str) -> KeystoreResult<CryptoJson> {
    encrypt_with(
        secret,
        passphrase,
        &kdf::generate_salt(),
        &cipher::generate_iv(),
    )
}

/// Encrypt with caller-fixed salt and IV.
///
/// Deterministic for a given input; the salt and IV must be freshly random
/// outside of tests.
pub fn encrypt_with(
    secret: &[u8],
    passphrase: &str,
    salt: &[u8; SALT_LENGTH],
    iv: &[u8; IV_LENGTH],
) -> KeystoreResult<CryptoJson> {
    let kdfparams = KdfParams::new(salt);
    let derived_key = kdfparams.derive_key(passphrase)?;

    let aes_key = cipher::aes_key(&derived_key);
    let ciphertext = cipher::encrypt_plaintext(secret, &aes_key, iv);
    let mac = compute_mac(&derived_key, &ciphertext);

    Ok(CryptoJson {
        cipher: "aes-128-cbc".to_string(),
        ciphertext: hex::encode(&ciphertext),
        cipherparams: CipherParams::new(iv),
        kdf: "pbkdf2".to_string(),
        kdfparams,
        mac: hex::encode(mac),
    })
}

/// Decrypt a `crypto` object with `passphrase`.
///
/// Gate order: KDF support, then MAC, then cipher support. A MAC mismatch
/// does not reveal whether the passphrase was wrong or the ciphertext
/// tampered with, and nothing is decrypted before the MAC verifies.
pub fn decrypt(crypto: &CryptoJson, passphrase: &str) -> KeystoreResult<SecretBytes> {
    if crypto.kdf != "pbkdf2" {
        return Err(KeystoreError::UnsupportedKdf(crypto.kdf.clone()));
    }
    let derived_key = crypto.kdfparams.derive_key(passphrase)?;

    let ciphertext = hex::decode(&crypto.ciphertext)
        .map_err(|e| KeystoreError::HexError(format!("invalid ciphertext hex: {}", e)))?;
    let expected_mac = hex::decode(&crypto.mac)
        .map_err(|e| KeystoreError::HexError(format!("invalid mac hex: {}", e)))?;
    let mac = compute_mac(&derived_key, &ciphertext);
    if !constant_time_eq(mac.as_slice(), &expected_mac) {
        return Err(KeystoreError::MacMismatch);
    }

    if crypto.cipher != "aes-128-cbc" {
        return Err(KeystoreError::UnsupportedCipher(crypto.cipher.clone()));
    }
    let iv = crypto.cipherparams.iv()?;
    let aes_key = cipher::aes_key(&derived_key);
    let plaintext = cipher::decrypt_ciphertext(&ciphertext, &aes_key, &iv)?;

    Ok(SecretBox::new(Box::new(plaintext.to_vec())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    const SALT: [u8; SALT_LENGTH] = [0xAB; SALT_LENGTH];
    const IV: [u8; IV_LENGTH] = [0x1C; IV_LENGTH];

    /// Fast parameters for tests that exercise the decrypt path
    /// repeatedly; the stored `c` is honored by the reader.
    fn fast_crypto(secret: &[u8], passphrase: &str) -> CryptoJson {
        let mut crypto = encrypt_with(secret, passphrase, &SALT, &IV).unwrap();
        let kdfparams = KdfParams {
            c: 4096,
            ..crypto.kdfparams.clone()
        };
        let derived = kdfparams.derive_key(passphrase).unwrap();
        let aes_key = cipher::aes_key(&derived);
        let ciphertext = cipher::encrypt_plaintext(secret, &aes_key, &IV);
        crypto.mac = hex::encode(compute_mac(&derived, &ciphertext));
        crypto.ciphertext = hex::encode(&ciphertext);
        crypto.kdfparams = kdfparams;
        crypto
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let secret = [0xDEu8; 32];
        let crypto = encrypt(&secret, "testpassword").unwrap();

        assert_eq!(crypto.cipher, "aes-128-cbc");
        assert_eq!(crypto.kdf, "pbkdf2");
        assert_eq!(crypto.kdfparams.prf, "hmac-sha256");
        assert_eq!(crypto.kdfparams.dklen, 16);
        assert_eq!(crypto.mac.len(), 64);
        assert_eq!(crypto.cipherparams.iv.len(), 32);

        let decrypted = decrypt(&crypto, "testpassword").unwrap();
        assert_eq!(decrypted.expose_secret().as_slice(), &secret);
    }

    #[test]
    fn test_encrypt_is_reproducible_with_fixed_salt_and_iv() {
        let mut secret = [0u8; 32];
        secret[..4].copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);

        let a = encrypt_with(&secret, "testpassword", &SALT, &IV).unwrap();
        let b = encrypt_with(&secret, "testpassword", &SALT, &IV).unwrap();
        assert_eq!(a, b);

        let decrypted = decrypt(&a, "testpassword").unwrap();
        assert_eq!(decrypted.expose_secret().as_slice(), &secret);
    }

    #[test]
    fn test_wrong_passphrase_is_mac_mismatch() {
        let crypto = fast_crypto(&[0x77u8; 32], "correct");
        assert!(matches!(
            decrypt(&crypto, "wrong"),
            Err(KeystoreError::MacMismatch)
        ));
    }

    #[test]
    fn test_bit_flip_in_ciphertext_is_mac_mismatch() {
        let crypto = fast_crypto(&[0x77u8; 32], "testpassword");

        let mut bytes = hex::decode(&crypto.ciphertext).unwrap();
        bytes[0] ^= 0x01;
        let tampered = CryptoJson {
            ciphertext: hex::encode(bytes),
            ..crypto
        };

        assert!(matches!(
            decrypt(&tampered, "testpassword"),
            Err(KeystoreError::MacMismatch)
        ));
    }

    #[test]
    fn test_unknown_kdf_rejected() {
        let crypto = CryptoJson {
            kdf: "scrypt".to_string(),
            ..fast_crypto(&[0x01u8; 32], "testpassword")
        };
        assert!(matches!(
            decrypt(&crypto, "testpassword"),
            Err(KeystoreError::UnsupportedKdf(_))
        ));
    }

    #[test]
    fn test_unknown_cipher_rejected() {
        let crypto = CryptoJson {
            cipher: "aes-256-gcm".to_string(),
            ..fast_crypto(&[0x01u8; 32], "testpassword")
        };
        // MAC still matches; the cipher gate fires after it.
        assert!(matches!(
            decrypt(&crypto, "testpassword"),
            Err(KeystoreError::UnsupportedCipher(_))
        ));
    }

    #[test]
    fn test_arbitrary_length_secrets() {
        for len in [1, 16, 31, 32, 64] {
            let secret = vec![0x5Au8; len];
            let crypto = fast_crypto(&secret, "testpassword");
            let decrypted = decrypt(&crypto, "testpassword").unwrap();
            assert_eq!(decrypted.expose_secret().as_slice(), secret.as_slice());
        }
    }

    #[test]
    fn test_crypto_json_field_names() {
        let crypto = fast_crypto(&[0x10u8; 32], "testpassword");
        let json = serde_json::to_value(&crypto).unwrap();

        assert!(json.get("cipher").is_some());
        assert!(json.get("ciphertext").is_some());
        assert!(json["cipherparams"].get("iv").is_some());
        assert_eq!(json["kdf"], "pbkdf2");
        assert_eq!(json["kdfparams"]["prf"], "hmac-sha256");
        assert_eq!(json["kdfparams"]["dklen"], 16);
        assert!(json.get("mac").is_some());

        let parsed: CryptoJson = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, crypto);
    }
}
