//! PBKDF2-HMAC-SHA256 key derivation for the keystore.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

use super::error::{KeystoreError, KeystoreResult};

/// Iteration count written by the encryptor.
pub const KDF_ITERATIONS: u32 = 262_144;

/// Derived key length in bytes written by the encryptor.
///
/// 16 bytes, matching the pre-standard key files this store interoperates
/// with. The AES key is not the derived key itself; it goes through an
/// extra keccak step (see [`super::cipher::aes_key`]).
pub const KDF_DKLEN: u32 = 16;

/// Salt length in bytes.
pub const SALT_LENGTH: usize = 32;

/// `kdfparams` of a `"kdf": "pbkdf2"` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KdfParams {
    /// Pseudo-random function; only `"hmac-sha256"` is supported.
    pub prf: String,
    /// Iteration count.
    pub c: u32,
    /// Salt as hex.
    pub salt: String,
    /// Derived key length in bytes.
    pub dklen: u32,
}

impl KdfParams {
    /// Standard write-side parameters over the given salt.
    pub fn new(salt: &[u8]) -> Self {
        Self {
            prf: "hmac-sha256".to_string(),
            c: KDF_ITERATIONS,
            salt: hex::encode(salt),
            dklen: KDF_DKLEN,
        }
    }

    /// Derive the key these parameters describe.
    ///
    /// Honors the stored `c`, `salt` and `dklen`, so files written with
    /// other settings still decrypt.
    pub fn derive_key(&self, passphrase: &str) -> KeystoreResult<Zeroizing<Vec<u8>>> {
        if self.prf != "hmac-sha256" {
            return Err(KeystoreError::UnsupportedKdf(format!(
                "pbkdf2/{}",
                self.prf
            )));
        }
        if self.c == 0 || self.dklen == 0 {
            return Err(KeystoreError::KdfError(
                "iteration count and dklen must be positive".to_string(),
            ));
        }
        let salt = hex::decode(&self.salt)
            .map_err(|e| KeystoreError::HexError(format!("invalid salt hex: {}", e)))?;

        let mut output = Zeroizing::new(vec![0u8; self.dklen as usize]);
        pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), &salt, self.c, output.as_mut_slice());
        Ok(output)
    }
}

/// Generate a random salt.
pub fn generate_salt() -> [u8; SALT_LENGTH] {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(c: u32) -> KdfParams {
        KdfParams {
            prf: "hmac-sha256".to_string(),
            c,
            salt: hex::encode([0xAA; SALT_LENGTH]),
            dklen: KDF_DKLEN,
        }
    }

    #[test]
    fn test_derive_key_deterministic() {
        let kdf = params(4096);

        let a = kdf.derive_key("passphrase").unwrap();
        let b = kdf.derive_key("passphrase").unwrap();
        assert_eq!(a.len(), KDF_DKLEN as usize);
        assert_eq!(*a, *b);

        let c = kdf.derive_key("other").unwrap();
        assert_ne!(*a, *c);
    }

    #[test]
    fn test_unknown_prf_rejected() {
        let mut kdf = params(4096);
        kdf.prf = "hmac-sha512".to_string();
        assert!(matches!(
            kdf.derive_key("passphrase"),
            Err(KeystoreError::UnsupportedKdf(_))
        ));
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let kdf = params(0);
        assert!(matches!(
            kdf.derive_key("passphrase"),
            Err(KeystoreError::KdfError(_))
        ));
    }

    #[test]
    fn test_bad_salt_hex_rejected() {
        let mut kdf = params(4096);
        kdf.salt = "zz".to_string();
        assert!(matches!(
            kdf.derive_key("passphrase"),
            Err(KeystoreError::HexError(_))
        ));
    }

    #[test]
    fn test_params_serialization() {
        let kdf = KdfParams::new(&generate_salt());
        let json = serde_json::to_string(&kdf).unwrap();
        let parsed: KdfParams = serde_json::from_str(&json).unwrap();
        assert_eq!(kdf, parsed);
    }

    #[test]
    fn test_generate_salt() {
        let a = generate_salt();
        let b = generate_salt();
        assert_ne!(a, b);
    }
}
