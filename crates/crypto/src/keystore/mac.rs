//! Keystore MAC: keccak over the derived-key tail and the ciphertext.

use alloy_primitives::{keccak256, B256};

/// How many trailing bytes of the derived key feed the MAC.
pub const MAC_KEY_LENGTH: usize = 16;

/// Compute the MAC: `keccak256(last16(derived_key) || ciphertext)`.
///
/// The tail is the last 16 bytes of the derived key as stored — with the
/// standard `dklen` of 16 that is the whole derived key. This is the
/// pre-standard rule the files in the wild use, not the
/// second-half-of-a-32-byte-key convention of later formats; the two do
/// not verify each other's files.
pub fn compute_mac(derived_key: &[u8], ciphertext: &[u8]) -> B256 {
    let tail = &derived_key[derived_key.len().saturating_sub(MAC_KEY_LENGTH)..];
    let mut input = Vec::with_capacity(tail.len() + ciphertext.len());
    input.extend_from_slice(tail);
    input.extend_from_slice(ciphertext);
    keccak256(&input)
}

/// Constant-time comparison to prevent timing attacks.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
