//! Fixed-width byte types shared across the crate.
//!
//! All containers are `alloy_primitives::FixedBytes` instantiations, which
//! carry hex parsing and formatting, ordering, and left-zero-padded
//! construction (`left_padding_from`) for right-aligned values.

use alloy_primitives::FixedBytes;

pub use alloy_primitives::{Address, B128, B256, U256};

/// 32-byte value: message digests, keccak output.
pub type Hash256 = B256;

/// 16-byte value: AES key and IV width.
pub type Hash128 = B128;

/// Uncompressed secp256k1 public key: X || Y, without the 0x04 SEC1 prefix.
pub type Public = FixedBytes<64>;

/// Compressed secp256k1 public key: 0x02/0x03 prefix + X.
pub type PublicCompressed = FixedBytes<33>;
