//! secp256k1 keypair generation.

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};
use secp256k1::{All, PublicKey, Secp256k1, SecretKey};

use super::{Address, EntropyError, KeyError};

/// A secp256k1 keypair together with its derived Ethereum address.
#[derive(Debug, Clone)]
pub struct Keypair {
    /// The private key bytes (32 bytes)
    secret_key: [u8; 32],
    /// Uncompressed public key, `0x04 || X || Y`
    public_key: [u8; 65],
    /// The derived Ethereum address
    address: Address,
}

impl Keypair {
    /// Builds a keypair from an existing secret key.
    ///
    /// The public key and address are a pure function of `secret_bytes`.
    pub fn from_secret_key(secret_bytes: [u8; 32]) -> Result<Self, KeyError> {
        let secp = Secp256k1::new();
        let secret_key = SecretKey::from_slice(&secret_bytes).map_err(|_| KeyError)?;
        Ok(Self::from_parts(&secp, &secret_key))
    }

    fn from_parts(secp: &Secp256k1<All>, secret_key: &SecretKey) -> Self {
        let public_key = PublicKey::from_secret_key(secp, secret_key).serialize_uncompressed();

        Self {
            secret_key: secret_key.secret_bytes(),
            public_key,
            address: Address::from_uncompressed(&public_key),
        }
    }

    /// Returns the private key as a hex string (without 0x prefix).
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key)
    }

    /// Returns the private key bytes.
    pub fn private_key_bytes(&self) -> &[u8; 32] {
        &self.secret_key
    }

    /// Returns `X || Y` as hex, without the `0x04` tag.
    pub fn public_key_hex(&self) -> String {
        hex::encode(&self.public_key[1..])
    }

    pub fn public_key_bytes(&self) -> &[u8; 65] {
        &self.public_key
    }

    #[inline]
    pub fn address(&self) -> &Address {
        &self.address
    }
}

/// Produces fresh keypairs from a privately seeded CSPRNG.
///
/// Every generator is seeded from the operating system independently, so
/// workers never share generator state.
pub struct KeyGenerator<R = StdRng> {
    rng: R,
    secp: Secp256k1<All>,
}

impl KeyGenerator {
    pub fn new() -> Result<Self, EntropyError> {
        Ok(Self::with_rng(StdRng::from_rng(OsRng)?))
    }
}

impl<R: RngCore> KeyGenerator<R> {
    /// Draws secret keys from `rng`, which must be cryptographically secure.
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            secp: Secp256k1::new(),
        }
    }

    /// Generates one random keypair.
    ///
    /// Candidates that are not valid scalars (zero or not below the curve
    /// order) are redrawn.
    #[inline]
    pub fn generate(&mut self) -> Result<Keypair, EntropyError> {
        let mut bytes = [0u8; 32];
        loop {
            self.rng.try_fill_bytes(&mut bytes)?;
            if let Ok(secret_key) = SecretKey::from_slice(&bytes) {
                return Ok(Keypair::from_parts(&self.secp, &secret_key));
            }
        }
    }
}
