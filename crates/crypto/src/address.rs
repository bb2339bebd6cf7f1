//! Address derivation: externally-owned accounts and CREATE contracts.

use alloy_primitives::{keccak256, Address, U256};
use alloy_rlp::{Encodable, RlpEncodable};

use crate::error::CryptoError;
use crate::secp256k1::to_public;
use crate::secret::Secret;
use crate::types::Public;

/// Account address for a public key: the rightmost 20 bytes of keccak256
/// over the 64-byte X || Y form (no SEC1 prefix byte).
pub fn public_to_address(public: &Public) -> Address {
    let hash = keccak256(public);
    Address::from_slice(&hash[12..])
}

/// Account address controlled by `secret`.
pub fn secret_to_address(secret: &Secret) -> Result<Address, CryptoError> {
    Ok(public_to_address(&to_public(secret)?))
}

/// CREATE input: the RLP list `[sender, nonce]`. The nonce encodes as a
/// minimal big-endian integer; zero becomes the empty byte string.
#[derive(RlpEncodable)]
struct ContractAddressInput {
    sender: Address,
    nonce: U256,
}

/// Contract address deployed by `sender` at `nonce` (the CREATE rule):
/// the rightmost 20 bytes of keccak256 over `rlp([sender, nonce])`.
pub fn contract_address(sender: &Address, nonce: U256) -> Address {
    let input = ContractAddressInput {
        sender: *sender,
        nonce,
    };
    let mut encoded = Vec::new();
    input.encode(&mut encoded);
    let hash = keccak256(&encoded);
    Address::from_slice(&hash[12..])
}
