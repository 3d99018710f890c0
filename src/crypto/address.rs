//! Ethereum address derivation and rendering.

use std::fmt;

use tiny_keccak::{Hasher, Keccak};

/// Literal marker at the start of every rendered address.
pub const MARKER: &str = "0x";

/// Number of hex digits in an address, not counting the marker.
pub const HEX_LEN: usize = 40;

/// An Ethereum address (20 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

/// Computes Keccak-256 over the concatenation of `parts`.
pub(crate) fn keccak256(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    for part in parts {
        hasher.update(part);
    }
    let mut hash = [0u8; 32];
    hasher.finalize(&mut hash);
    hash
}

impl Address {
    #[inline]
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Derives the address of an uncompressed secp256k1 public key.
    ///
    /// The `0x04` tag is dropped, the remaining 64 bytes are hashed with
    /// Keccak-256 and the last 20 bytes of the digest form the address.
    #[inline]
    pub fn from_uncompressed(public_key: &[u8; 65]) -> Self {
        let hash = keccak256(&[&public_key[1..]]);

        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash[12..]);
        Self(bytes)
    }

    /// Lowercase hex without the marker.
    #[inline]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Lowercase hex with the marker.
    pub fn to_hex_prefixed(&self) -> String {
        format!("{}{}", MARKER, self.to_hex())
    }

    /// EIP-55 mixed-case checksum encoding, marker included.
    ///
    /// This is the form patterns are matched against.
    pub fn to_checksum(&self) -> String {
        let hex_addr = self.to_hex();
        let hash = keccak256(&[hex_addr.as_bytes()]);

        let mut checksum = String::with_capacity(MARKER.len() + HEX_LEN);
        checksum.push_str(MARKER);

        for (i, c) in hex_addr.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                hash[i / 2] >> 4
            } else {
                hash[i / 2] & 0x0f
            };

            if c.is_ascii_alphabetic() && nibble >= 8 {
                checksum.push(c.to_ascii_uppercase());
            } else {
                checksum.push(c);
            }
        }

        checksum
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}
