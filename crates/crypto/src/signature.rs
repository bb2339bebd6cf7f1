//! Recoverable ECDSA signature layout and validity rules.

use alloy_primitives::{B256, U256};
use serde::{Deserialize, Serialize};

/// secp256k1 group order `n`.
pub const SECP256K1_N: U256 = U256::from_limbs([
    0xbfd25e8cd0364141,
    0xbaaedce6af48a03b,
    0xfffffffffffffffe,
    0xffffffffffffffff,
]);

/// `n / 2`, the low-S boundary.
pub const SECP256K1_HALF_N: U256 = U256::from_limbs([
    0xdfe92f46681b20a0,
    0x5d576e7357a4501d,
    0xffffffffffffffff,
    0x7fffffffffffffff,
]);

/// Recoverable ECDSA signature: `r` (bytes 0..32) || `s` (bytes 32..64) ||
/// `v` (byte 64).
///
/// The flat 65-byte form is canonical; `r`, `s` and `v` are views into it.
/// `v` is the raw recovery id, 0 or 1 for signatures produced by
/// [`crate::secp256k1::sign`]. EIP-155 chain-id folding is a higher-layer
/// concern.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; 65]);

impl Signature {
    /// Wrap a 65-byte compact signature.
    pub fn from_bytes(bytes: [u8; 65]) -> Self {
        Self(bytes)
    }

    /// Assemble from the 64-byte `r || s` body and a recovery id.
    pub fn from_parts(rs: &[u8; 64], v: u8) -> Self {
        let mut bytes = [0u8; 65];
        bytes[..64].copy_from_slice(rs);
        bytes[64] = v;
        Self(bytes)
    }

    /// The full 65-byte form.
    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }

    /// The `r || s` body, without the recovery id.
    pub fn rs(&self) -> &[u8] {
        &self.0[..64]
    }

    /// The `r` component.
    pub fn r(&self) -> B256 {
        B256::from_slice(&self.0[..32])
    }

    /// The `s` component.
    pub fn s(&self) -> B256 {
        B256::from_slice(&self.0[32..64])
    }

    /// The recovery id.
    pub fn v(&self) -> u8 {
        self.0[64]
    }

    /// Whether the signature is in canonical range: `v <= 1` and both `r`
    /// and `s` in `(0, n)`.
    pub fn is_valid(&self) -> bool {
        let r = U256::from_be_slice(&self.0[..32]);
        let s = U256::from_be_slice(&self.0[32..64]);
        self.v() <= 1
            && r > U256::ZERO
            && r < SECP256K1_N
            && s > U256::ZERO
            && s < SECP256K1_N
    }

    /// Whether `s` is in the lower half of the scalar range.
    pub fn is_low_s(&self) -> bool {
        U256::from_be_slice(&self.0[32..64]) <= SECP256K1_HALF_N
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({})", hex::encode(&self.0[..8]))
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeTuple;

        if serializer.is_human_readable() {
            serializer.serialize_str(&hex::encode(self.0))
        } else {
            let mut tuple = serializer.serialize_tuple(65)?;
            for byte in self.0 {
                tuple.serialize_element(&byte)?;
            }
            tuple.end()
        }
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{SeqAccess, Visitor};

        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
            if bytes.len() != 65 {
                return Err(serde::de::Error::custom("invalid signature length"));
            }
            let mut arr = [0u8; 65];
            arr.copy_from_slice(&bytes);
            Ok(Self(arr))
        } else {
            struct ArrayVisitor;

            impl<'de> Visitor<'de> for ArrayVisitor {
                type Value = [u8; 65];

                fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                    formatter.write_str("65 bytes")
                }

                fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
                where
                    A: SeqAccess<'de>,
                {
                    let mut arr = [0u8; 65];
                    for (i, byte) in arr.iter_mut().enumerate() {
                        *byte = seq
                            .next_element()?
                            .ok_or_else(|| serde::de::Error::invalid_length(i, &self))?;
                    }
                    Ok(arr)
                }
            }

            let arr = deserializer.deserialize_tuple(65, ArrayVisitor)?;
            Ok(Self(arr))
        }
    }
}
